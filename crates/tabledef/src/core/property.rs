//! Table-level properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attributes::{AttrValue, Attributes};
use super::types::PropertyKind;

/// Storage or distribution property attached to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableProperty {
    pub kind: PropertyKind,
    #[serde(default)]
    pub attributes: Attributes,
}

impl TableProperty {
    pub fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            attributes: Attributes::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// `Format` property, e.g. `ORC`.
    pub fn format(format: impl Into<String>) -> Self {
        Self::new(PropertyKind::Format).attr("format", format.into())
    }

    /// `Bucket` property over `by` with `count` buckets.
    pub fn bucket(by: Vec<&str>, count: i64) -> Self {
        Self::new(PropertyKind::Bucket)
            .attr("by", by)
            .attr("count", count)
    }

    pub fn sortkey(keys: Vec<&str>) -> Self {
        Self::new(PropertyKind::Sortkey).attr("keys", keys)
    }

    pub fn distribution_key(key: impl Into<String>) -> Self {
        Self::new(PropertyKind::DistributionKey).attr("key", key.into())
    }

    pub fn distribution_style(style: impl Into<String>) -> Self {
        Self::new(PropertyKind::DistributionStyle).attr("style", style.into())
    }
}

/// External table settings (location plus free-form string configs).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTableProperties {
    pub location: String,
    #[serde(default)]
    pub configs: BTreeMap<String, String>,
}

impl ExternalTableProperties {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            configs: BTreeMap::new(),
        }
    }

    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configs.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_property() {
        let p: TableProperty =
            serde_yaml::from_str("kind: bucket\nattributes:\n  by: [id]\n  count: 8").unwrap();
        assert_eq!(p, TableProperty::bucket(vec!["id"], 8));
    }
}
