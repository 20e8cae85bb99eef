//! Table policies.
//!
//! A policy is a declarative rule bound to a table. Resolving it against a
//! bound table builds a transient copy of the table at the policy's earliest
//! retained partition and asks the table's dialect for the statement.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::traits::PartitionScope;
use crate::dialect::BoundTable;
use crate::error::{Result, SchemaError};

/// Policy lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    PartitionRetention,
    PartitionAnonymisation,
    ManualAnonymisation,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::PartitionRetention => f.write_str("PartitionRetention"),
            PolicyKind::PartitionAnonymisation => f.write_str("PartitionAnonymisation"),
            PolicyKind::ManualAnonymisation => f.write_str("ManualAnonymisation"),
        }
    }
}

/// Declarative rule attached to a table shape.
///
/// `earliest_partition` maps partition names to the value expression of the
/// oldest partition the rule keeps, e.g. `ds: "'{{ macros.ds_add(ds, -30) }}'"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TablePolicy {
    /// Drop partitions older than `ds_ago` days.
    PartitionRetention {
        ds_ago: u32,
        #[serde(default)]
        earliest_partition: Option<BTreeMap<String, String>>,
    },
    /// Rewrite PII columns of partitions older than `ds_ago` days.
    PartitionAnonymisation {
        ds_ago: u32,
        #[serde(default)]
        earliest_partition: Option<BTreeMap<String, String>>,
    },
    /// Anonymisation handled outside the generated SQL.
    ManualAnonymisation,
}

impl TablePolicy {
    pub fn retention(ds_ago: u32, earliest_partition: BTreeMap<String, String>) -> Self {
        TablePolicy::PartitionRetention {
            ds_ago,
            earliest_partition: Some(earliest_partition),
        }
    }

    pub fn anonymisation(ds_ago: u32, earliest_partition: BTreeMap<String, String>) -> Self {
        TablePolicy::PartitionAnonymisation {
            ds_ago,
            earliest_partition: Some(earliest_partition),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            TablePolicy::PartitionRetention { .. } => PolicyKind::PartitionRetention,
            TablePolicy::PartitionAnonymisation { .. } => PolicyKind::PartitionAnonymisation,
            TablePolicy::ManualAnonymisation => PolicyKind::ManualAnonymisation,
        }
    }

    pub fn ds_ago(&self) -> Option<u32> {
        match self {
            TablePolicy::PartitionRetention { ds_ago, .. }
            | TablePolicy::PartitionAnonymisation { ds_ago, .. } => Some(*ds_ago),
            TablePolicy::ManualAnonymisation => None,
        }
    }

    /// Resolve the policy into a statement for `table`'s dialect.
    ///
    /// Returns `Ok(None)` when the policy produces no statement.
    pub fn resolve(&self, table: &BoundTable) -> Result<Option<String>> {
        match self {
            TablePolicy::PartitionRetention {
                earliest_partition, ..
            } => {
                let (earliest, scope) = self.earliest_table(table, earliest_partition)?;
                Ok(Some(earliest.delete_current_partition(&scope)))
            }
            TablePolicy::PartitionAnonymisation {
                earliest_partition, ..
            } => {
                let (earliest, scope) = self.earliest_table(table, earliest_partition)?;
                Ok(earliest.anonymise_partition(&scope))
            }
            TablePolicy::ManualAnonymisation => Ok(None),
        }
    }

    /// Transient table at the earliest partition, plus a scope ignoring
    /// partitions the policy does not name.
    fn earliest_table(
        &self,
        table: &BoundTable,
        earliest_partition: &Option<BTreeMap<String, String>>,
    ) -> Result<(BoundTable, PartitionScope)> {
        let earliest = earliest_partition
            .as_ref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SchemaError::PolicyIncomplete {
                policy: self.kind().to_string(),
                reason: "earliest_partition is not specified".into(),
            })?;

        let transient = table.with_partition_values(earliest)?;
        let ignored: BTreeSet<String> = transient
            .partition_names()
            .into_iter()
            .filter(|name| !earliest.contains_key(name))
            .collect();

        debug!(
            "Resolving {} for {} (ignoring partitions {:?})",
            self.kind(),
            table.full_table_name(false, true, ""),
            ignored
        );

        Ok((
            transient,
            PartitionScope {
                ignored,
                ..Default::default()
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_policies() {
        let p: TablePolicy = serde_yaml::from_str(
            "kind: partition_retention\nds_ago: 30\nearliest_partition:\n  ds: \"'2020-01-01'\"",
        )
        .unwrap();
        assert_eq!(p.kind(), PolicyKind::PartitionRetention);
        assert_eq!(p.ds_ago(), Some(30));

        let p: TablePolicy = serde_yaml::from_str("kind: manual_anonymisation").unwrap();
        assert_eq!(p, TablePolicy::ManualAnonymisation);
    }
}
