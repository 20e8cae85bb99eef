//! Hive SQL dialect (Strategy pattern).
//!
//! Hive declares partitions apart from the regular columns, addresses them
//! with `PARTITION (...)` clauses and drops data with `ALTER TABLE`.

use tracing::warn;

use crate::core::column::ColumnFilter;
use crate::core::traits::{
    render_source, strip_statement, CreateTableOptions, Dialect, InsertOptions, InsertSource,
    PartitionScope, SelectOptions, ViewOptions,
};
use crate::dialect::{BoundColumn, BoundTable, Vocabulary};
use crate::drivers::ensure_bound_to;
use crate::error::Result;

use super::vocabulary::hive_vocabulary;

/// Hive dialect implementation.
#[derive(Debug, Clone)]
pub struct HiveDialect {
    vocabulary: Vocabulary,
}

impl HiveDialect {
    /// Create a new Hive dialect instance.
    pub fn new() -> Self {
        Self {
            vocabulary: hive_vocabulary(),
        }
    }

    /// `MSCK REPAIR TABLE`, recovering partitions written outside Hive.
    pub fn msck_repair_table(&self, table: &BoundTable, suffix: &str) -> Result<String> {
        ensure_bound_to(self, table, "MSCK REPAIR TABLE")?;
        Ok(format!(
            "MSCK REPAIR TABLE {}",
            table.full_table_name(true, true, suffix)
        ))
    }

    /// Register the scoped partition, optionally at an explicit location.
    pub fn add_current_partition(
        &self,
        table: &BoundTable,
        location: Option<&str>,
        scope: &PartitionScope,
    ) -> Result<String> {
        ensure_bound_to(self, table, "ADD PARTITION")?;
        let mut sql = format!(
            "ALTER TABLE {} ADD IF NOT EXISTS PARTITION ({})",
            table.full_table_name(true, true, &scope.suffix),
            table.scoped_condition(scope, ", ")
        );
        if let Some(location) = location {
            sql.push_str(&format!(" LOCATION '{}'", location));
        }
        Ok(sql)
    }

    fn insert_overwrite(&self, table: &BoundTable, select: &str, suffix: &str) -> String {
        let mut sql = format!(
            "INSERT OVERWRITE TABLE {}",
            table.full_table_name(true, true, suffix)
        );
        if let Some(clause) = partition_clause(table) {
            sql.push(' ');
            sql.push_str(&clause);
        }
        sql.push(' ');
        sql.push_str(strip_statement(select));
        sql
    }
}

impl Default for HiveDialect {
    fn default() -> Self {
        Self::new()
    }
}

/// Hive comments cannot contain single quotes; they become backticks.
fn hive_comment(text: &str) -> String {
    text.trim().replace('\'', "`")
}

/// `PARTITION (p = value, q)`: static partitions carry their value, dynamic
/// ones are named only.
fn partition_clause(table: &BoundTable) -> Option<String> {
    let partitions = table.partitions();
    if partitions.is_empty() {
        return None;
    }
    let entries = partitions
        .into_iter()
        .map(|p| match p.decl().current_value() {
            Some(value) => format!("{} = {}", p.quoted_name(), value),
            None => p.quoted_name().to_string(),
        })
        .collect::<Vec<_>>();
    Some(format!("PARTITION ({})", entries.join(", ")))
}

/// Columns a Hive insert lists: everything but static partitions.
fn without_static_partitions(filter: &ColumnFilter) -> ColumnFilter {
    filter
        .clone()
        .and(ColumnFilter::custom(|c| !c.is_partition || c.current_value().is_none()))
}

impl Dialect for HiveDialect {
    fn name(&self) -> &str {
        "hive"
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn column_definition(&self, column: &BoundColumn) -> String {
        match column.comment() {
            Some(comment) => format!(
                "{} {} COMMENT '{}'",
                column.quoted_name(),
                column.column_type(),
                hive_comment(comment)
            ),
            None => format!("{} {}", column.quoted_name(), column.column_type()),
        }
    }

    fn build_create_table(&self, table: &BoundTable, opts: &CreateTableOptions) -> String {
        let columns = table
            .columns(false, &opts.filter)
            .into_iter()
            .map(|c| format!("  {}", self.column_definition(c)))
            .collect::<Vec<_>>()
            .join(",\n");
        let mut sql = format!(
            "CREATE {}TABLE IF NOT EXISTS {} (\n{}\n)",
            if opts.external { "EXTERNAL " } else { "" },
            table.full_table_name(true, true, &opts.suffix),
            columns
        );

        if let Some(description) = table.description().filter(|d| !d.trim().is_empty()) {
            sql.push_str(&format!("\nCOMMENT '{}'", hive_comment(description)));
        }

        let partitions = table.partitions();
        if !partitions.is_empty() {
            let definitions = partitions
                .into_iter()
                .map(|p| format!("  {}", self.column_definition(p)))
                .collect::<Vec<_>>()
                .join(",\n");
            sql.push_str(&format!("\nPARTITIONED BY (\n{}\n)", definitions));
        }

        if let Some(tblformat) = opts.tblformat.as_deref().filter(|f| !f.is_empty()) {
            sql.push('\n');
            sql.push_str(tblformat);
        }
        for property in table.properties() {
            sql.push('\n');
            sql.push_str(property.rendered());
        }
        if opts.external {
            if let Some(location) = &opts.location {
                sql.push_str(&format!("\nLOCATION '{}'", location));
            }
        }
        if !opts.tblproperties.is_empty() {
            sql.push_str(&format!("\nTBLPROPERTIES({})", opts.tblproperties.join(",")));
        }
        sql
    }

    fn build_drop_table(&self, table: &BoundTable, suffix: &str) -> String {
        format!(
            "DROP TABLE IF EXISTS {} PURGE",
            table.full_table_name(true, true, suffix)
        )
    }

    fn build_insert_into(
        &self,
        table: &BoundTable,
        source: &InsertSource,
        opts: &InsertOptions,
    ) -> String {
        let filter = without_static_partitions(&opts.filter);
        let columns = table
            .columns(true, &filter)
            .into_iter()
            .map(|c| c.quoted_name().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "INSERT INTO {}",
            table.full_table_name(true, true, &opts.suffix)
        );
        if let Some(clause) = partition_clause(table) {
            sql.push(' ');
            sql.push_str(&clause);
        }
        sql.push_str(&format!(
            " ({}) SELECT {} FROM {}",
            columns,
            table.column_values(true, &filter).join(", "),
            render_source(source, " vw")
        ));
        sql
    }

    fn build_insert_overwrite(&self, table: &BoundTable, select: &str, suffix: &str) -> Result<String> {
        Ok(self.insert_overwrite(table, select, suffix))
    }

    fn build_delete_current_partition(&self, table: &BoundTable, scope: &PartitionScope) -> String {
        format!(
            "ALTER TABLE {} DROP IF EXISTS PARTITION ({}) PURGE",
            table.full_table_name(true, true, &scope.suffix),
            table.scoped_condition(scope, ", ")
        )
    }

    fn build_create_current_partition_view(&self, table: &BoundTable, opts: &ViewOptions) -> String {
        if opts.security_invoker {
            warn!(
                "Hive views have no SECURITY INVOKER; ignoring it for {}",
                table.full_table_name(false, true, &opts.suffix)
            );
        }
        let select = table.select_current_partition(
            &SelectOptions {
                transforms: opts.transforms.clone(),
                ..Default::default()
            },
            &opts.scope,
        );
        format!(
            "CREATE OR REPLACE VIEW {} AS {}",
            table.full_table_name(true, true, &opts.suffix),
            select
        )
    }

    /// Hive cannot update rows, so the partition is overwritten with itself.
    fn build_anonymise_partition(&self, table: &BoundTable, scope: &PartitionScope) -> Option<String> {
        let columns = table.columns(false, &ColumnFilter::All);
        if !columns.iter().any(|c| c.decl().pii.has_delete_rule()) {
            return None;
        }

        let mut items = columns
            .into_iter()
            .map(|c| {
                if c.decl().pii.has_delete_rule() {
                    c.setter(&c.delete_load_value())
                } else {
                    c.quoted_name().to_string()
                }
            })
            .collect::<Vec<_>>();
        items.extend(
            table
                .partitions()
                .into_iter()
                .filter(|p| p.decl().current_value().is_none())
                .map(|p| p.quoted_name().to_string()),
        );

        let mut select = format!(
            "SELECT {} FROM {}",
            items.join(", "),
            table.full_table_name(true, true, &scope.suffix)
        );
        let condition = table.scoped_condition(scope, " AND ");
        if !condition.is_empty() {
            select.push_str(&format!(" WHERE {}", condition));
        }
        Some(self.insert_overwrite(table, &select, &scope.suffix))
    }
}
