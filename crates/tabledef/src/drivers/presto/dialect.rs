//! Presto SQL dialect (Strategy pattern).
//!
//! Presto keeps partitions as ordinary trailing columns and moves table
//! options into a `WITH (...)` clause.

use crate::core::column::ColumnFilter;
use crate::core::traits::{escape_literal, CreateTableOptions, Dialect};
use crate::dialect::{BoundTable, Vocabulary};

use super::vocabulary::presto_vocabulary;

/// Presto dialect implementation.
#[derive(Debug, Clone)]
pub struct PrestoDialect {
    vocabulary: Vocabulary,
}

impl PrestoDialect {
    /// Create a new Presto dialect instance.
    pub fn new() -> Self {
        Self {
            vocabulary: presto_vocabulary(),
        }
    }

    /// CREATE TABLE with `extra` entries appended to the `WITH` clause.
    pub(crate) fn create_table_with(
        &self,
        table: &BoundTable,
        opts: &CreateTableOptions,
        extra: &[String],
    ) -> String {
        let columns = ordered_columns(table, &opts.filter)
            .into_iter()
            .map(|c| format!("  {}", self.column_definition(c)))
            .collect::<Vec<_>>()
            .join(",\n");
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            table.full_table_name(true, true, &opts.suffix),
            columns
        );

        if let Some(description) = table.description().filter(|d| !d.trim().is_empty()) {
            sql.push_str(&format!("\nCOMMENT '{}'", escape_literal(description)));
        }

        let mut with = Vec::new();
        let partitions = table.partition_names();
        if !partitions.is_empty() {
            let names = partitions
                .iter()
                .map(|p| format!("'{}'", escape_literal(p)))
                .collect::<Vec<_>>()
                .join(", ");
            with.push(format!("partitioned_by = ARRAY[{}]", names));
        }
        with.extend(table.properties().iter().map(|p| p.rendered().to_string()));
        with.extend(extra.iter().cloned());

        if !with.is_empty() {
            sql.push_str(&format!("\nWITH (\n  {}\n)", with.join(",\n  ")));
        }
        sql
    }
}

impl Default for PrestoDialect {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-partition columns first, then partitions, each in declaration order.
fn ordered_columns<'a>(
    table: &'a BoundTable,
    filter: &ColumnFilter,
) -> Vec<&'a crate::dialect::BoundColumn> {
    let (partitions, mut columns): (Vec<_>, Vec<_>) = table
        .columns(true, filter)
        .into_iter()
        .partition(|c| c.is_partition());
    columns.extend(partitions);
    columns
}

impl Dialect for PrestoDialect {
    fn name(&self) -> &str {
        "presto"
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn build_create_table(&self, table: &BoundTable, opts: &CreateTableOptions) -> String {
        self.create_table_with(table, opts, &[])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::column::ColumnDecl;
    use crate::core::property::TableProperty;
    use crate::core::prototype::TableShape;
    use crate::core::sequence::DeclarationSequence;
    use crate::core::table::TableInstance;
    use crate::core::traits::{DeleteOptions, PartitionScope, UpsertOptions, ViewOptions};
    use crate::core::types::SemanticType;
    use crate::error::SchemaError;

    fn bind(shape: TableShape, values: &[(&str, &str)]) -> BoundTable {
        TableInstance::new(Arc::new(shape), "analytics", values.iter().copied())
            .unwrap()
            .bind(Arc::new(PrestoDialect::new()))
            .unwrap()
    }

    fn page_view() -> TableShape {
        let seq = DeclarationSequence::new();
        TableShape::builder("PageView", &seq)
            .description("Page views. It's daily.")
            .partition(ColumnDecl::new("ds", SemanticType::Varchar))
            .column(ColumnDecl::new("id", SemanticType::Integer).comment("Primary key"))
            .column(ColumnDecl::new("url", SemanticType::Varchar).attr("length", 256))
            .property(TableProperty::format("ORC"))
            .property(TableProperty::bucket(vec!["id"], 8))
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_table() {
        let table = bind(page_view(), &[]);
        assert_eq!(
            table.create_table(&CreateTableOptions::default()),
            r#"CREATE TABLE IF NOT EXISTS "analytics"."page_view" (
  "id" INTEGER COMMENT 'Primary key',
  "url" VARCHAR(256),
  "ds" VARCHAR
)
COMMENT 'Page views. It''s daily.'
WITH (
  partitioned_by = ARRAY['ds'],
  format = 'ORC',
  bucketed_by = ARRAY['id'], bucket_count = 8
)"#
        );
    }

    #[test]
    fn test_create_table_without_options() {
        let seq = DeclarationSequence::new();
        let shape = TableShape::builder("Plain", &seq)
            .column(ColumnDecl::new("id", SemanticType::Bigint))
            .build()
            .unwrap();
        assert_eq!(
            bind(shape, &[]).create_table(&CreateTableOptions::default()),
            "CREATE TABLE IF NOT EXISTS \"analytics\".\"plain\" (\n  \"id\" BIGINT\n)"
        );
    }

    #[test]
    fn test_composite_types() {
        let seq = DeclarationSequence::new();
        let shape = TableShape::builder("Nested", &seq)
            .column(ColumnDecl::array(
                "tags",
                ColumnDecl::new("", SemanticType::Varchar),
            ))
            .column(ColumnDecl::map(
                "counts",
                ColumnDecl::new("", SemanticType::Varchar),
                ColumnDecl::new("", SemanticType::Bigint),
            ))
            .column(ColumnDecl::row(
                "point",
                vec![
                    ColumnDecl::new("x", SemanticType::Double),
                    ColumnDecl::new("y", SemanticType::Double),
                ],
            ))
            .build()
            .unwrap();
        let table = bind(shape, &[]);
        let types: Vec<&str> = table
            .all_columns()
            .iter()
            .map(|c| c.column_type())
            .collect();
        assert_eq!(
            types,
            vec![
                "ARRAY(VARCHAR)",
                "MAP(VARCHAR, BIGINT)",
                r#"ROW("x" DOUBLE, "y" DOUBLE)"#
            ]
        );
    }

    #[test]
    fn test_missing_decimal_attributes() {
        let seq = DeclarationSequence::new();
        let shape = TableShape::builder("Prices", &seq)
            .column(ColumnDecl::new("amount", SemanticType::Decimal).attr("precision", 10))
            .build()
            .unwrap();
        let err = TableInstance::empty(Arc::new(shape), "s")
            .unwrap()
            .bind(Arc::new(PrestoDialect::new()))
            .unwrap_err();
        match err {
            SchemaError::AttributesMissing {
                declaration,
                missing,
                ..
            } => {
                assert_eq!(declaration, "amount");
                assert_eq!(missing, vec!["scale".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_security_invoker_view() {
        let table = bind(page_view(), &[("ds", "'2020-01-01'")]);
        assert_eq!(
            table.create_current_partition_view(&ViewOptions {
                security_invoker: true,
                ..Default::default()
            }),
            r#"CREATE OR REPLACE VIEW "analytics"."page_view_latest" SECURITY INVOKER AS SELECT "ds", "id", "url" FROM "analytics"."page_view" WHERE "ds" = '2020-01-01'"#
        );
        assert_eq!(
            table.drop_current_partition_view("_latest"),
            r#"DROP VIEW IF EXISTS "analytics"."page_view_latest""#
        );
    }

    #[test]
    fn test_upsert_select() {
        let table = bind(page_view(), &[("ds", "'2020-01-02'")]);
        let sql = table.upsert_select(&UpsertOptions {
            update_select: "SELECT * FROM incoming;".to_string(),
            primary_keys: vec!["id".to_string()],
            ..Default::default()
        });
        assert_eq!(
            sql,
            concat!(
                r#"WITH incremental_update AS (SELECT * FROM incoming) "#,
                r#"SELECT "id", "url" FROM incremental_update "#,
                r#"UNION ALL SELECT "id", "url" FROM "#,
                r#"(SELECT "id", "url" FROM "analytics"."page_view" WHERE "ds" = '2020-01-02') AS d "#,
                r#"WHERE NOT EXISTS (SELECT 1 FROM incremental_update AS u WHERE u."id" = d."id")"#
            )
        );
    }

    #[test]
    fn test_upsert_keys_outside_filter() {
        let table = bind(page_view(), &[("ds", "'2020-01-02'")]);
        let sql = table.upsert_select(&UpsertOptions {
            update_select: "SELECT url FROM incoming".to_string(),
            primary_keys: vec!["id".to_string()],
            filter: Some(ColumnFilter::only(["url"])),
            ..Default::default()
        });
        assert!(sql.starts_with(
            r#"WITH incremental_update AS (SELECT url FROM incoming) SELECT "url" FROM incremental_update"#
        ));
        assert!(sql.ends_with(r#"WHERE NOT EXISTS (SELECT 1 FROM incremental_update AS u WHERE u."id" = d."id")"#));
    }

    #[test]
    fn test_delete_statements() {
        let table = bind(page_view(), &[("ds", "'2020-01-01'")]);
        let scope = PartitionScope {
            condition: Some("\"id\" > 10".to_string()),
            ..Default::default()
        };
        assert_eq!(
            table.delete_current_partition(&scope),
            r#"DELETE FROM "analytics"."page_view" WHERE "ds" = '2020-01-01' AND "id" > 10"#
        );

        let mut opts = DeleteOptions {
            condition: Some("\"id\" = {id}".to_string()),
            ..Default::default()
        };
        opts.params.insert("id".to_string(), "7".to_string());
        assert_eq!(
            table.delete_from(&opts),
            r#"DELETE FROM "analytics"."page_view" WHERE "id" = 7"#
        );
    }

    #[test]
    fn test_insert_overwrite_unsupported() {
        let table = bind(page_view(), &[]);
        assert!(matches!(
            table.insert_overwrite("SELECT 1", ""),
            Err(SchemaError::UnsupportedStatement { .. })
        ));
    }
}
