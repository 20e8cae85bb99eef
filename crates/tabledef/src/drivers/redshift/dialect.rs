//! Redshift SQL dialect (Strategy pattern).
//!
//! Redshift statements are terminated with `;`. Bulk movement goes through
//! S3 (`COPY` into a staging table, `UNLOAD` out of a select); those
//! statements keep Jinja placeholders for bucket paths and credentials so
//! the scheduler rendering them can fill in secrets.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::warn;

use crate::core::column::ColumnFilter;
use crate::core::traits::{
    render_source, DeleteOptions, Dialect, InsertSource, PartitionScope, SelectOptions,
    StagingOptions,
};
use crate::dialect::{BoundColumn, BoundTable, Vocabulary};
use crate::drivers::ensure_bound_to;
use crate::error::Result;

use super::vocabulary::{is_known_encoding, redshift_vocabulary};

/// S3 authentication block shared by COPY and UNLOAD.
const CREDENTIALS: &str = "{% if access_key and secret_key %}
WITH CREDENTIALS 'aws_access_key_id={{ access_key }};aws_secret_access_key={{ secret_key }}'
{% else %}
IAM_ROLE '{{ iam_role }}'
{% endif %}";

/// Options for `CREATE EXTERNAL TABLE` (Redshift Spectrum).
#[derive(Debug, Clone, Default)]
pub struct ExternalTableOptions {
    /// S3 location of the data.
    pub location: String,
    /// `STORED AS` file format (PARQUET, TEXTFILE, ...).
    pub file_format: String,
    /// Row format clause.
    pub tblformat: Option<String>,
    pub tblproperties: Vec<String>,
    pub filter: ColumnFilter,
    pub suffix: String,
}

/// Redshift dialect implementation.
#[derive(Debug, Clone)]
pub struct RedshiftDialect {
    vocabulary: Vocabulary,
}

impl RedshiftDialect {
    /// Create a new Redshift dialect instance.
    pub fn new() -> Self {
        Self {
            vocabulary: redshift_vocabulary(),
        }
    }

    fn properties_block(table: &BoundTable) -> String {
        table
            .properties()
            .iter()
            .map(|p| format!("\n{}", p.rendered()))
            .collect()
    }

    fn select_values(table: &BoundTable, source: &InsertSource, filter: &ColumnFilter) -> String {
        format!(
            "SELECT {} FROM {}",
            table.column_values(true, filter).join(", "),
            render_source(source, " AS vw")
        )
    }

    /// `CREATE TABLE ... AS SELECT`, keeping the table properties.
    pub fn create_table_as(
        &self,
        table: &BoundTable,
        source: &InsertSource,
        filter: &ColumnFilter,
        suffix: &str,
    ) -> Result<String> {
        ensure_bound_to(self, table, "CREATE TABLE AS")?;
        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {}{} AS {};",
            table.full_table_name(true, true, suffix),
            Self::properties_block(table),
            Self::select_values(table, source, filter)
        ))
    }

    /// Spectrum table over files in S3.
    pub fn create_external_table(
        &self,
        table: &BoundTable,
        opts: &ExternalTableOptions,
    ) -> Result<String> {
        ensure_bound_to(self, table, "CREATE EXTERNAL TABLE")?;
        let definition = |c: &BoundColumn| format!("  {} {}", c.quoted_name(), c.column_type());

        let columns = table
            .columns(false, &opts.filter)
            .into_iter()
            .map(definition)
            .collect::<Vec<_>>()
            .join(",\n");
        let mut sql = format!(
            "CREATE EXTERNAL TABLE {} (\n{}\n)",
            table.full_table_name(true, true, &opts.suffix),
            columns
        );

        let partitions = table.partitions();
        if !partitions.is_empty() {
            let definitions = partitions
                .into_iter()
                .map(definition)
                .collect::<Vec<_>>()
                .join(",\n");
            sql.push_str(&format!("\nPARTITIONED BY (\n{}\n)", definitions));
        }
        if let Some(tblformat) = opts.tblformat.as_deref().filter(|f| !f.is_empty()) {
            sql.push('\n');
            sql.push_str(tblformat);
        }
        sql.push_str(&format!(
            "\nSTORED AS {}\nLOCATION '{}'",
            opts.file_format, opts.location
        ));
        if !opts.tblproperties.is_empty() {
            sql.push_str(&format!(
                "\nTABLE PROPERTIES ({})",
                opts.tblproperties.join(",")
            ));
        }
        Ok(sql)
    }

    /// Register the scoped partition of an external table.
    pub fn add_external_partition(
        &self,
        table: &BoundTable,
        location: &str,
        scope: &PartitionScope,
    ) -> Result<String> {
        ensure_bound_to(self, table, "ADD PARTITION")?;
        Ok(format!(
            "ALTER TABLE {} ADD IF NOT EXISTS PARTITION ({}) LOCATION '{}'",
            table.full_table_name(true, true, &scope.suffix),
            table.scoped_condition(scope, ", "),
            location
        ))
    }

    pub fn drop_external_partition(
        &self,
        table: &BoundTable,
        scope: &PartitionScope,
    ) -> Result<String> {
        ensure_bound_to(self, table, "DROP PARTITION")?;
        Ok(format!(
            "ALTER TABLE {} DROP IF EXISTS PARTITION ({})",
            table.full_table_name(true, true, &scope.suffix),
            table.scoped_condition(scope, ", ")
        ))
    }

    /// UPDATE the scoped partition with every manually set column.
    ///
    /// `Ok(None)` when no regular column was set manually.
    pub fn update_manually_set_columns(
        &self,
        table: &BoundTable,
        scope: &PartitionScope,
    ) -> Result<Option<String>> {
        ensure_bound_to(self, table, "UPDATE")?;
        let assignments = table
            .columns(false, &ColumnFilter::ManuallySet)
            .into_iter()
            .map(|c| {
                format!(
                    "{} = {}",
                    c.quoted_name(),
                    c.decl().value.as_deref().unwrap_or("NULL")
                )
            })
            .collect::<Vec<_>>();
        if assignments.is_empty() {
            return Ok(None);
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            table.full_table_name(true, true, &scope.suffix),
            assignments.join(", ")
        );
        let condition = table.scoped_condition(scope, " AND ");
        if !condition.is_empty() {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        Ok(Some(sql))
    }

    /// COPY files from S3 into the staging table.
    pub fn copy_to_staging(&self, table: &BoundTable, opts: &StagingOptions) -> Result<String> {
        ensure_bound_to(self, table, "COPY")?;
        let columns = table
            .columns(opts.include_partitions, &opts.filter)
            .into_iter()
            .map(|c| c.quoted_name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "COPY {} ({})\nFROM '{{{{ path_prefix }}}}://{{{{ path }}}}'\n{}\n{{{{ copy_options }}}};",
            table.full_staging_table_name(true, true, &opts.suffix),
            columns,
            CREDENTIALS
        ))
    }

    /// UNLOAD the table's selected columns to S3.
    pub fn unload_table(&self, table: &BoundTable, filter: &ColumnFilter) -> Result<String> {
        ensure_bound_to(self, table, "UNLOAD")?;
        Ok(self.unload_via_select(&table.select(&SelectOptions {
            filter: filter.clone(),
            ..Default::default()
        })))
    }

    /// UNLOAD an arbitrary select; its single quotes are backslash-escaped.
    pub fn unload_via_select(&self, select: &str) -> String {
        let select = select.trim().trim_end_matches(';').replace('\'', "\\'");
        format!(
            "UNLOAD ('{}')\nTO 's3://{{{{ s3_bucket }}}}/{{{{ s3_key }}}}'\n{}\n{{{{ unload_options }}}};",
            select, CREDENTIALS
        )
    }

    /// Delete rows about to be replaced from the staging table (or `using`),
    /// matched on `primary_keys`.
    pub fn delete_upsert(
        &self,
        table: &BoundTable,
        primary_keys: &[&str],
        using: Option<&str>,
        params: &BTreeMap<String, String>,
        suffix: &str,
    ) -> Result<String> {
        ensure_bound_to(self, table, "DELETE USING")?;
        let target = table.full_table_name(true, true, suffix);
        let using = match using {
            Some(using) => using.to_string(),
            None => table.full_staging_table_name(true, true, suffix),
        };
        let condition = primary_keys
            .iter()
            .map(|pk| {
                let quoted = self.vocabulary.quote_column(pk);
                format!("u.{} = {}.{}", quoted, target, quoted)
            })
            .collect::<Vec<_>>()
            .join(" AND ");

        Ok(self.build_delete_from(
            table,
            &DeleteOptions {
                condition: Some(condition),
                params: params.clone(),
                using: Some(using),
                suffix: suffix.to_string(),
            },
        ))
    }

    pub fn create_materialized_view(
        &self,
        table: &BoundTable,
        source: &InsertSource,
        filter: &ColumnFilter,
        suffix: &str,
    ) -> Result<String> {
        ensure_bound_to(self, table, "CREATE MATERIALIZED VIEW")?;
        Ok(format!(
            "CREATE MATERIALIZED VIEW {}{} AS {};",
            table.full_table_name(true, true, suffix),
            Self::properties_block(table),
            Self::select_values(table, source, filter)
        ))
    }

    pub fn drop_materialized_view(&self, table: &BoundTable, suffix: &str) -> Result<String> {
        ensure_bound_to(self, table, "DROP MATERIALIZED VIEW")?;
        Ok(format!(
            "DROP MATERIALIZED VIEW {};",
            table.full_table_name(true, true, suffix)
        ))
    }

    pub fn refresh_materialized_view(&self, table: &BoundTable, suffix: &str) -> Result<String> {
        ensure_bound_to(self, table, "REFRESH MATERIALIZED VIEW")?;
        Ok(format!(
            "REFRESH MATERIALIZED VIEW {};",
            table.full_table_name(true, true, suffix)
        ))
    }

    /// JSONPaths document for `COPY ... FORMAT AS JSON`, built from the
    /// `jsonpath` attribute of every column that has one.
    pub fn jsonpaths(&self, table: &BoundTable) -> Result<String> {
        ensure_bound_to(self, table, "JSONPATHS")?;
        let paths = table
            .all_columns()
            .iter()
            .filter_map(|c| c.attribute("jsonpath").map(|p| p.to_string()))
            .collect::<Vec<_>>();
        Ok(serde_json::to_string(&json!({ "jsonpaths": paths }))?)
    }
}

impl Default for RedshiftDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for RedshiftDialect {
    fn name(&self) -> &str {
        "redshift"
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn terminator(&self) -> &str {
        ";"
    }

    fn column_definition(&self, column: &BoundColumn) -> String {
        let mut definition = format!("{} {}", column.quoted_name(), column.column_type());
        if let Some(default) = column.decl().default_value.as_deref() {
            definition.push_str(&format!(" DEFAULT {}", default));
        }
        if let Some(encode) = column.attribute("encode") {
            let encode = encode.to_string().to_uppercase();
            if !is_known_encoding(&encode) {
                warn!(
                    "Column {} uses unknown Redshift encoding {}",
                    column.name(),
                    encode
                );
            }
            definition.push_str(&format!(" ENCODE {}", encode));
        }
        definition
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
    use crate::core::traits::{CreateTableOptions, InsertOptions};
    use crate::core::types::SemanticType;
    use crate::error::SchemaError;

    fn orders() -> TableShape {
        let seq = DeclarationSequence::new();
        TableShape::builder("Orders", &seq)
            .column(
                ColumnDecl::new("id", SemanticType::Bigint)
                    .attr("encode", "zstd")
                    .attr("jsonpath", "$.id"),
            )
            .column(
                ColumnDecl::new("amount", SemanticType::Decimal)
                    .attr("precision", 12)
                    .attr("scale", 2)
                    .attr("encode", "delta"),
            )
            .column(
                ColumnDecl::new("status", SemanticType::Varchar)
                    .attr("length", 16)
                    .attr("encode", "lzo")
                    .attr("jsonpath", "$.status")
                    .default_value("'new'"),
            )
            .partition(ColumnDecl::new("ds", SemanticType::Date).attr("encode", "raw"))
            .property(TableProperty::sortkey(vec!["ds", "id"]))
            .property(TableProperty::distribution_key("id"))
            .property(TableProperty::distribution_style("KEY"))
            .build()
            .unwrap()
    }

    fn bind(values: &[(&str, &str)]) -> BoundTable {
        TableInstance::new(Arc::new(orders()), "sales", values.iter().copied())
            .unwrap()
            .bind(Arc::new(RedshiftDialect::new()))
            .unwrap()
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            bind(&[]).create_table(&CreateTableOptions::default()),
            r#"CREATE TABLE IF NOT EXISTS "sales"."orders" (
  "id" BIGINT ENCODE ZSTD,
  "amount" NUMERIC(12,2) ENCODE DELTA,
  "status" VARCHAR(16) DEFAULT 'new' ENCODE LZO,
  "ds" DATE ENCODE RAW
)
SORTKEY("ds", "id")
DISTKEY("id")
DISTSTYLE KEY;"#
        );
    }

    #[test]
    fn test_encode_required() {
        let seq = DeclarationSequence::new();
        let shape = TableShape::builder("Raw", &seq)
            .column(ColumnDecl::new("id", SemanticType::Integer))
            .build()
            .unwrap();
        let err = TableInstance::empty(Arc::new(shape), "s")
            .unwrap()
            .bind(Arc::new(RedshiftDialect::new()))
            .unwrap_err();
        assert!(
            matches!(err, SchemaError::AttributesMissing { ref missing, .. } if missing == &vec!["encode".to_string()])
        );
    }

    #[test]
    fn test_terminated_statements() {
        let table = bind(&[("ds", "'2020-01-01'")]);
        assert_eq!(table.drop_table(""), r#"DROP TABLE IF EXISTS "sales"."orders";"#);
        assert_eq!(table.truncate_table(""), r#"TRUNCATE TABLE "sales"."orders";"#);
        assert_eq!(
            table.drop_staging_table(""),
            r#"DROP TABLE IF EXISTS "sales"."stg_2020-01-01_orders";"#
        );
        assert_eq!(
            table.insert_into_via_select("SELECT * FROM src;", &InsertOptions::default()),
            r#"INSERT INTO "sales"."orders" ("id", "amount", "status", "ds") SELECT "id", "amount", "status", '2020-01-01' AS "ds" FROM (SELECT * FROM src) AS vw;"#
        );
    }

    #[test]
    fn test_staging_table() {
        let table = bind(&[("ds", "'2020-01-01'")]);
        assert_eq!(
            table.create_staging_table(&StagingOptions::default()),
            r#"CREATE TABLE IF NOT EXISTS "sales"."stg_2020-01-01_orders" (
  "id" BIGINT ENCODE ZSTD,
  "amount" NUMERIC(12,2) ENCODE DELTA,
  "status" VARCHAR(16) DEFAULT 'new' ENCODE LZO
);"#
        );
    }

    #[test]
    fn test_select_ordered_by_sortkey() {
        let table = bind(&[]);
        assert_eq!(
            table.select(&SelectOptions {
                use_star: true,
                order_by_sortkey: true,
                limit: Some(5),
                ..Default::default()
            }),
            r#"SELECT * FROM "sales"."orders" ORDER BY "ds", "id" LIMIT 5"#
        );
    }

    #[test]
    fn test_copy_and_unload() {
        let dialect = RedshiftDialect::new();
        let table = bind(&[("ds", "'2020-01-01'")]);
        let copy = dialect
            .copy_to_staging(&table, &StagingOptions::default())
            .unwrap();
        assert!(copy.starts_with(
            r#"COPY "sales"."stg_2020-01-01_orders" ("id", "amount", "status")
FROM '{{ path_prefix }}://{{ path }}'
{% if access_key and secret_key %}"#
        ));
        assert!(copy.ends_with("{{ copy_options }};"));

        let unload = dialect.unload_via_select("SELECT * FROM t WHERE s = 'x';");
        assert!(unload.starts_with(
            r#"UNLOAD ('SELECT * FROM t WHERE s = \'x\'')
TO 's3://{{ s3_bucket }}/{{ s3_key }}'"#
        ));
        assert!(unload.contains("IAM_ROLE '{{ iam_role }}'"));
    }

    #[test]
    fn test_delete_upsert() {
        let dialect = RedshiftDialect::new();
        let table = bind(&[("ds", "'2020-01-01'")]);
        assert_eq!(
            dialect
                .delete_upsert(&table, &["id"], None, &BTreeMap::new(), "")
                .unwrap(),
            r#"DELETE FROM "sales"."orders" USING "sales"."stg_2020-01-01_orders" AS u WHERE u."id" = "sales"."orders"."id";"#
        );
    }

    #[test]
    fn test_update_manually_set_columns() {
        let dialect = RedshiftDialect::new();
        let mut table = bind(&[("ds", "'2020-01-01'")]);
        assert_eq!(
            dialect
                .update_manually_set_columns(&table, &PartitionScope::default())
                .unwrap(),
            None
        );
        table.set_value("status", "'closed'").unwrap();
        assert_eq!(
            dialect
                .update_manually_set_columns(&table, &PartitionScope::default())
                .unwrap()
                .as_deref(),
            Some(r#"UPDATE "sales"."orders" SET "status" = 'closed' WHERE "ds" = '2020-01-01'"#)
        );
    }

    #[test]
    fn test_external_table_and_partitions() {
        let dialect = RedshiftDialect::new();
        let table = bind(&[("ds", "'2020-01-01'")]);
        let sql = dialect
            .create_external_table(
                &table,
                &ExternalTableOptions {
                    location: "s3://lake/orders".to_string(),
                    file_format: "PARQUET".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            sql,
            r#"CREATE EXTERNAL TABLE "sales"."orders" (
  "id" BIGINT,
  "amount" NUMERIC(12,2),
  "status" VARCHAR(16)
)
PARTITIONED BY (
  "ds" DATE
)
STORED AS PARQUET
LOCATION 's3://lake/orders'"#
        );
        assert_eq!(
            dialect
                .add_external_partition(&table, "s3://lake/orders/ds=2020-01-01", &PartitionScope::default())
                .unwrap(),
            r#"ALTER TABLE "sales"."orders" ADD IF NOT EXISTS PARTITION ("ds" = '2020-01-01') LOCATION 's3://lake/orders/ds=2020-01-01'"#
        );
        assert_eq!(
            dialect
                .drop_external_partition(&table, &PartitionScope::default())
                .unwrap(),
            r#"ALTER TABLE "sales"."orders" DROP IF EXISTS PARTITION ("ds" = '2020-01-01')"#
        );
    }

    #[test]
    fn test_create_table_as_and_materialized_view() {
        let dialect = RedshiftDialect::new();
        let table = bind(&[]);
        let source = InsertSource::Table("sales.raw_orders".to_string());
        assert_eq!(
            dialect
                .create_table_as(&table, &source, &ColumnFilter::All, "")
                .unwrap(),
            r#"CREATE TABLE IF NOT EXISTS "sales"."orders"
SORTKEY("ds", "id")
DISTKEY("id")
DISTSTYLE KEY AS SELECT "id", "amount", "status", "ds" FROM sales.raw_orders;"#
        );
        assert!(dialect
            .create_materialized_view(&table, &source, &ColumnFilter::All, "_mv")
            .unwrap()
            .starts_with(r#"CREATE MATERIALIZED VIEW "sales"."orders_mv""#));
        assert_eq!(
            dialect.refresh_materialized_view(&table, "_mv").unwrap(),
            r#"REFRESH MATERIALIZED VIEW "sales"."orders_mv";"#
        );
        assert_eq!(
            dialect.drop_materialized_view(&table, "_mv").unwrap(),
            r#"DROP MATERIALIZED VIEW "sales"."orders_mv";"#
        );
    }

    #[test]
    fn test_jsonpaths() {
        let table = bind(&[]);
        assert_eq!(
            RedshiftDialect::new().jsonpaths(&table).unwrap(),
            r#"{"jsonpaths":["$.id","$.status"]}"#
        );
    }

    #[test]
    fn test_jsonpaths_requires_redshift_binding() {
        let seq = DeclarationSequence::new();
        let shape = TableShape::builder("Events", &seq)
            .column(ColumnDecl::new("id", SemanticType::Bigint).attr("jsonpath", "$.id"))
            .build()
            .unwrap();
        let table = TableInstance::empty(Arc::new(shape), "sales")
            .unwrap()
            .bind(Arc::new(crate::drivers::PrestoDialect::new()))
            .unwrap();
        let err = RedshiftDialect::new().jsonpaths(&table).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnsupportedStatement { ref statement, ref dialect }
                if statement == "JSONPATHS" && dialect == "presto"
        ));
    }
}
