//! The dialect strategy.
//!
//! A [`Dialect`] pairs an engine's [`Vocabulary`] with the literal SQL
//! wording of its statements. Every statement is built from the accessors
//! of a [`BoundTable`] (columns, partitions, names), so engines only differ
//! in template text and quoting.
//!
//! # Design Patterns
//!
//! - **Strategy**: engines are interchangeable behind `Arc<dyn Dialect>`
//! - **Template Method**: default methods render ANSI-style statements and
//!   engines override only the statements whose wording differs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::column::ColumnFilter;
use super::property::ExternalTableProperties;
use super::types::PropertyKind;
use crate::dialect::{BoundColumn, BoundTable, Vocabulary};
use crate::error::{Result, SchemaError};

/// Partition-scoped statement parameters.
#[derive(Debug, Clone, Default)]
pub struct PartitionScope {
    /// Extra condition appended to the partition condition.
    pub condition: Option<String>,
    /// Partition values overriding the table's current values.
    pub params: BTreeMap<String, String>,
    /// Partitions left out of the condition.
    pub ignored: BTreeSet<String>,
    /// Table name suffix.
    pub suffix: String,
}

/// Options for CREATE TABLE.
#[derive(Debug, Clone, Default)]
pub struct CreateTableOptions {
    pub filter: ColumnFilter,
    pub suffix: String,
    /// Create an external table (Hive).
    pub external: bool,
    /// Storage location of an external table.
    pub location: Option<String>,
    /// Row format clause emitted before properties (Hive).
    pub tblformat: Option<String>,
    /// Raw `TBLPROPERTIES` entries (Hive).
    pub tblproperties: Vec<String>,
    /// External table properties (Trino).
    pub external_properties: Option<ExternalTableProperties>,
}

/// Options for staging table DDL.
#[derive(Debug, Clone, Default)]
pub struct StagingOptions {
    pub filter: ColumnFilter,
    pub include_partitions: bool,
    pub suffix: String,
}

/// Options for SELECT.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub filter: ColumnFilter,
    pub suffix: String,
    /// Row filter predicate.
    pub condition: Option<String>,
    /// Per-column value transforms; `{c}` is the quoted column name.
    pub transforms: BTreeMap<String, String>,
    pub limit: Option<u64>,
    /// Order by the table's sort key, when it has one.
    pub order_by_sortkey: bool,
    /// Select `*` instead of the column list.
    pub use_star: bool,
}

/// Options for INSERT INTO.
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    pub filter: ColumnFilter,
    pub suffix: String,
}

/// Row source of an INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertSource {
    /// A named table, used as-is.
    Table(String),
    /// A select expression, embedded as a subquery.
    Select(String),
}

/// Options for DELETE FROM.
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub condition: Option<String>,
    /// Values substituted into `{name}` placeholders of the condition.
    pub params: BTreeMap<String, String>,
    /// Join table, aliased as `u`.
    pub using: Option<String>,
    pub suffix: String,
}

/// Options for the upsert select.
#[derive(Debug, Clone, Default)]
pub struct UpsertOptions {
    /// Select producing the incremental rows.
    pub update_select: String,
    pub primary_keys: Vec<String>,
    /// Columns to select; defaults to every non-partition column.
    pub filter: Option<ColumnFilter>,
    pub scope: PartitionScope,
    pub transforms: BTreeMap<String, String>,
}

/// Options for the current-partition view.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub suffix: String,
    pub scope: PartitionScope,
    pub transforms: BTreeMap<String, String>,
    pub security_invoker: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            suffix: "_latest".to_string(),
            scope: PartitionScope::default(),
            transforms: BTreeMap::new(),
            security_invoker: false,
        }
    }
}

/// Strip whitespace and trailing semicolons from an embedded statement.
pub fn strip_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Escape a string literal body by doubling single quotes.
pub fn escape_literal(text: &str) -> String {
    text.trim().replace('\'', "''")
}

/// SQL wording strategy for one warehouse engine.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Engine identifier (e.g. "presto", "redshift").
    fn name(&self) -> &str;

    /// Type and property lookup tables.
    fn vocabulary(&self) -> &Vocabulary;

    /// Text appended to statements the engine terminates explicitly.
    fn terminator(&self) -> &str {
        ""
    }

    /// One column of a CREATE TABLE body.
    fn column_definition(&self, column: &BoundColumn) -> String {
        match column.comment() {
            Some(comment) => format!(
                "{} {} COMMENT '{}'",
                column.quoted_name(),
                column.column_type(),
                escape_literal(comment)
            ),
            None => format!("{} {}", column.quoted_name(), column.column_type()),
        }
    }

    /// Select-list entry for a column, honouring transforms.
    fn select_item(&self, column: &BoundColumn, transforms: &BTreeMap<String, String>) -> String {
        match transforms.get(column.name()) {
            Some(transform) => format!(
                "{} AS {}",
                crate::dialect::template::substitute_pairs(transform, &[("c", column.quoted_name())]),
                column.quoted_name()
            ),
            None => column.quoted_name().to_string(),
        }
    }

    fn build_create_table(&self, table: &BoundTable, opts: &CreateTableOptions) -> String {
        let columns = table
            .columns(true, &opts.filter)
            .into_iter()
            .map(|c| format!("  {}", self.column_definition(c)))
            .collect::<Vec<_>>()
            .join(",\n");
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            table.full_table_name(true, true, &opts.suffix),
            columns
        );
        for property in table.properties() {
            sql.push('\n');
            sql.push_str(property.rendered());
        }
        sql.push_str(self.terminator());
        sql
    }

    fn build_drop_table(&self, table: &BoundTable, suffix: &str) -> String {
        format!(
            "DROP TABLE IF EXISTS {}{}",
            table.full_table_name(true, true, suffix),
            self.terminator()
        )
    }

    fn build_truncate_table(&self, table: &BoundTable, suffix: &str) -> String {
        format!(
            "TRUNCATE TABLE {}{}",
            table.full_table_name(true, true, suffix),
            self.terminator()
        )
    }

    fn build_create_staging_table(&self, table: &BoundTable, opts: &StagingOptions) -> String {
        let columns = table
            .columns(opts.include_partitions, &opts.filter)
            .into_iter()
            .map(|c| format!("  {}", self.column_definition(c)))
            .collect::<Vec<_>>()
            .join(",\n");
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n){}",
            table.full_staging_table_name(true, true, &opts.suffix),
            columns,
            self.terminator()
        )
    }

    fn build_drop_staging_table(&self, table: &BoundTable, suffix: &str) -> String {
        format!(
            "DROP TABLE IF EXISTS {}{}",
            table.full_staging_table_name(true, true, suffix),
            self.terminator()
        )
    }

    fn build_select(&self, table: &BoundTable, opts: &SelectOptions) -> String {
        let items = if opts.use_star {
            "*".to_string()
        } else {
            table
                .columns(true, &opts.filter)
                .into_iter()
                .map(|c| self.select_item(c, &opts.transforms))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!(
            "SELECT {} FROM {}",
            items,
            table.full_table_name(true, true, &opts.suffix)
        );
        if let Some(condition) = opts.condition.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        if opts.order_by_sortkey {
            if let Some(sortkey) = table.property(PropertyKind::Sortkey) {
                let keys = sortkey
                    .property()
                    .attributes
                    .get("keys")
                    .map(|k| k.as_list())
                    .unwrap_or_default()
                    .iter()
                    .map(|k| self.vocabulary().quote_column(k))
                    .collect::<Vec<_>>();
                if !keys.is_empty() {
                    sql.push_str(&format!(" ORDER BY {}", keys.join(", ")));
                }
            }
        }
        if let Some(limit) = opts.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }

    fn build_insert_into(
        &self,
        table: &BoundTable,
        source: &InsertSource,
        opts: &InsertOptions,
    ) -> String {
        let columns = table.column_names(true, &opts.filter);
        let quoted = columns
            .iter()
            .map(|c| self.vocabulary().quote_column(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}{}",
            table.full_table_name(true, true, &opts.suffix),
            quoted,
            table.column_values(true, &opts.filter).join(", "),
            render_source(source, " AS vw"),
            self.terminator()
        )
    }

    /// INSERT OVERWRITE; most engines cannot express it.
    fn build_insert_overwrite(&self, _table: &BoundTable, _select: &str, _suffix: &str) -> Result<String> {
        Err(SchemaError::unsupported_statement("INSERT OVERWRITE", self.name()))
    }

    fn build_delete_from(&self, table: &BoundTable, opts: &DeleteOptions) -> String {
        let mut sql = format!(
            "DELETE FROM {}",
            table.full_table_name(true, true, &opts.suffix)
        );
        if let Some(using) = &opts.using {
            sql.push_str(&format!(" USING {} AS u", using));
        }
        if let Some(condition) = opts.condition.as_deref().filter(|c| !c.is_empty()) {
            let condition = crate::dialect::template::substitute(condition, &opts.params);
            sql.push_str(&format!(" WHERE {}", condition));
        }
        sql.push_str(self.terminator());
        sql
    }

    fn build_delete_current_partition(&self, table: &BoundTable, scope: &PartitionScope) -> String {
        let condition = table.current_partition_condition(
            scope.condition.as_deref(),
            &scope.ignored,
            " AND ",
        );
        self.build_delete_from(
            table,
            &DeleteOptions {
                condition: Some(condition),
                params: table.current_partition_params(&scope.params),
                using: None,
                suffix: scope.suffix.clone(),
            },
        )
    }

    /// Union of incremental rows with the current partition's rows that
    /// have no incremental counterpart on the primary keys.
    fn build_upsert_select(&self, table: &BoundTable, opts: &UpsertOptions) -> String {
        let filter = opts
            .filter
            .clone()
            .unwrap_or_else(|| ColumnFilter::except(table.partition_names()));
        let values = table.column_values(true, &filter).join(", ");
        let existing = table.select_current_partition(
            &SelectOptions {
                filter: filter.clone(),
                transforms: opts.transforms.clone(),
                ..Default::default()
            },
            &opts.scope,
        );

        let mut sql = format!(
            "WITH incremental_update AS ({}) SELECT {} FROM incremental_update UNION ALL SELECT {} FROM ({}) AS d",
            strip_statement(&opts.update_select),
            values,
            values,
            existing
        );

        let keys = table
            .all_columns()
            .iter()
            .filter(|c| opts.primary_keys.iter().any(|pk| pk == c.name()))
            .map(|c| format!("u.{q} = d.{q}", q = c.quoted_name()))
            .collect::<Vec<_>>();
        if !keys.is_empty() {
            sql.push_str(&format!(
                " WHERE NOT EXISTS (SELECT 1 FROM incremental_update AS u WHERE {})",
                keys.join(" AND ")
            ));
        }
        sql
    }

    fn build_create_current_partition_view(&self, table: &BoundTable, opts: &ViewOptions) -> String {
        let select = table.select_current_partition(
            &SelectOptions {
                transforms: opts.transforms.clone(),
                ..Default::default()
            },
            &opts.scope,
        );
        format!(
            "CREATE OR REPLACE VIEW {}{} AS {}{}",
            table.full_table_name(true, true, &opts.suffix),
            if opts.security_invoker {
                " SECURITY INVOKER"
            } else {
                ""
            },
            select,
            self.terminator()
        )
    }

    fn build_drop_current_partition_view(&self, table: &BoundTable, suffix: &str) -> String {
        format!(
            "DROP VIEW IF EXISTS {}{}",
            table.full_table_name(true, true, suffix),
            self.terminator()
        )
    }

    /// Rewrite the scoped partition with delete-time PII values.
    ///
    /// `None` when no column carries a delete-time rule.
    fn build_anonymise_partition(&self, table: &BoundTable, scope: &PartitionScope) -> Option<String> {
        let assignments = table
            .columns(false, &ColumnFilter::All)
            .into_iter()
            .filter(|c| c.decl().pii.has_delete_rule())
            .map(|c| format!("{} = {}", c.quoted_name(), c.delete_load_value()))
            .collect::<Vec<_>>();
        if assignments.is_empty() {
            return None;
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
        sql.push_str(self.terminator());
        Some(sql)
    }
}

/// Render an insert source; subqueries get `alias` appended.
pub fn render_source(source: &InsertSource, alias: &str) -> String {
    match source {
        InsertSource::Table(name) => name.trim().to_string(),
        InsertSource::Select(select) => format!("({}){}", strip_statement(select), alias),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_statement() {
        assert_eq!(strip_statement("  SELECT 1;  \n"), "SELECT 1");
        assert_eq!(strip_statement("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_render_source() {
        assert_eq!(render_source(&InsertSource::Table("s.t".into()), " AS vw"), "s.t");
        assert_eq!(
            render_source(&InsertSource::Select("SELECT 1;".into()), " vw"),
            "(SELECT 1) vw"
        );
    }

    #[test]
    fn test_view_options_default_suffix() {
        assert_eq!(ViewOptions::default().suffix, "_latest");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal(" it's "), "it''s");
    }
}
