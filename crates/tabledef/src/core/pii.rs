//! PII descriptors attached to column declarations.

use serde::{Deserialize, Serialize};

use super::types::LifecycleEvent;
use crate::dialect::template;

/// Per-column PII handling.
///
/// The default descriptor means "no special handling". Transform templates
/// reference the column through the `{quoted_name}` placeholder, e.g.
/// `SHA256({quoted_name})`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PiiPolicy {
    /// Category label shown in documentation ("email", "phone", ...).
    #[serde(default)]
    pub name: Option<String>,

    /// Lifecycle event at which the value is nulled.
    #[serde(default)]
    pub drop_on: Option<LifecycleEvent>,

    /// Rewrite applied on insert instead of dropping.
    #[serde(default)]
    pub transform_on_insert: Option<String>,

    /// Rewrite applied when a partition is anonymised.
    #[serde(default)]
    pub transform_on_delete: Option<String>,
}

impl PiiPolicy {
    /// Null the value whenever it is inserted.
    pub fn drop_on_insert() -> Self {
        Self {
            drop_on: Some(LifecycleEvent::Insert),
            ..Default::default()
        }
    }

    /// Null the value when its partition is anonymised.
    pub fn drop_on_delete() -> Self {
        Self {
            drop_on: Some(LifecycleEvent::Delete),
            ..Default::default()
        }
    }

    /// Rewrite the value on insert.
    pub fn transform_on_insert(template: impl Into<String>) -> Self {
        Self {
            transform_on_insert: Some(template.into()),
            ..Default::default()
        }
    }

    /// Rewrite the value when its partition is anonymised.
    pub fn transform_on_delete(template: impl Into<String>) -> Self {
        Self {
            transform_on_delete: Some(template.into()),
            ..Default::default()
        }
    }

    /// Attach a category label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn drops_on(&self, event: LifecycleEvent) -> bool {
        self.drop_on == Some(event)
    }

    /// Whether anonymising a partition changes this column.
    pub fn has_delete_rule(&self) -> bool {
        self.drops_on(LifecycleEvent::Delete) || self.transform_on_delete.is_some()
    }

    /// Render the insert transform for a quoted column name.
    pub fn render_insert_transform(&self, quoted_name: &str) -> Option<String> {
        self.transform_on_insert
            .as_deref()
            .map(|t| render_transform(t, quoted_name))
    }

    /// Render the delete transform for a quoted column name.
    pub fn render_delete_transform(&self, quoted_name: &str) -> Option<String> {
        self.transform_on_delete
            .as_deref()
            .map(|t| render_transform(t, quoted_name))
    }
}

fn render_transform(template: &str, quoted_name: &str) -> String {
    template::substitute_pairs(template, &[("quoted_name", quoted_name)])
}
