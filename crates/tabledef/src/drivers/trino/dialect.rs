//! Trino SQL dialect.
//!
//! Trino speaks Presto's vocabulary and statements, and adds external table
//! properties to the `WITH` clause of CREATE TABLE.

use crate::core::property::ExternalTableProperties;
use crate::core::traits::{escape_literal, CreateTableOptions, Dialect};
use crate::dialect::{BoundTable, Vocabulary};
use crate::drivers::presto::PrestoDialect;

/// Trino dialect implementation, delegating to [`PrestoDialect`].
#[derive(Debug, Clone, Default)]
pub struct TrinoDialect {
    presto: PrestoDialect,
}

impl TrinoDialect {
    /// Create a new Trino dialect instance.
    pub fn new() -> Self {
        Self::default()
    }
}

/// `external_location = '...'` followed by every config as `k = 'v'`.
pub fn external_property_entries(properties: &ExternalTableProperties) -> Vec<String> {
    let mut entries = vec![format!(
        "external_location = '{}'",
        escape_literal(&properties.location)
    )];
    entries.extend(
        properties
            .configs
            .iter()
            .map(|(k, v)| format!("{} = '{}'", k, escape_literal(v))),
    );
    entries
}

impl Dialect for TrinoDialect {
    fn name(&self) -> &str {
        "trino"
    }

    fn vocabulary(&self) -> &Vocabulary {
        self.presto.vocabulary()
    }

    fn build_create_table(&self, table: &BoundTable, opts: &CreateTableOptions) -> String {
        let extra = opts
            .external_properties
            .as_ref()
            .map(external_property_entries)
            .unwrap_or_default();
        self.presto.create_table_with(table, opts, &extra)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::column::ColumnDecl;
    use crate::core::prototype::TableShape;
    use crate::core::sequence::DeclarationSequence;
    use crate::core::table::TableInstance;
    use crate::core::traits::SelectOptions;
    use crate::core::types::SemanticType;

    fn events() -> BoundTable {
        let seq = DeclarationSequence::new();
        let shape = TableShape::builder("Events", &seq)
            .column(ColumnDecl::new("id", SemanticType::Bigint))
            .partition(ColumnDecl::new("ds", SemanticType::Varchar))
            .build()
            .unwrap();
        TableInstance::empty(Arc::new(shape), "lake")
            .unwrap()
            .bind(Arc::new(TrinoDialect::new()))
            .unwrap()
    }

    #[test]
    fn test_create_with_external_properties() {
        let opts = CreateTableOptions {
            external_properties: Some(
                ExternalTableProperties::new("s3://bucket/events")
                    .config("format", "PARQUET"),
            ),
            ..Default::default()
        };
        assert_eq!(
            events().create_table(&opts),
            r#"CREATE TABLE IF NOT EXISTS "lake"."events" (
  "id" BIGINT,
  "ds" VARCHAR
)
WITH (
  partitioned_by = ARRAY['ds'],
  external_location = 's3://bucket/events',
  format = 'PARQUET'
)"#
        );
    }

    #[test]
    fn test_statements_follow_presto() {
        let table = events();
        assert_eq!(table.dialect().name(), "trino");
        assert_eq!(
            table.select(&SelectOptions::default()),
            r#"SELECT "id", "ds" FROM "lake"."events""#
        );
        assert_eq!(
            table.vocabulary().sample_value_function,
            "ARBITRARY({c})"
        );
    }
}
