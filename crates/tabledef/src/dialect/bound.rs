//! Tables bound to a dialect.
//!
//! A [`BoundTable`] is a [`TableInstance`] whose columns and properties have
//! all been bound to one engine. It owns the naming and partition
//! bookkeeping every statement is built from, and forwards statement
//! generation to its [`Dialect`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use super::binder::{bind_column, bind_property, BoundColumn, BoundProperty};
use super::template;
use super::vocabulary::Vocabulary;
use crate::core::column::{ColumnDecl, ColumnFilter};
use crate::core::naming::cleanup_partition_value;
use crate::core::policy::{PolicyKind, TablePolicy};
use crate::core::prototype::TableShape;
use crate::core::table::TableInstance;
use crate::core::traits::{
    CreateTableOptions, DeleteOptions, Dialect, InsertOptions, InsertSource, PartitionScope,
    SelectOptions, StagingOptions, UpsertOptions, ViewOptions,
};
use crate::core::types::PropertyKind;
use crate::error::{Result, SchemaError};

/// A table instance bound to a dialect.
#[derive(Debug, Clone)]
pub struct BoundTable {
    shape: Arc<TableShape>,
    schema: String,
    dialect: Arc<dyn Dialect>,
    columns: Vec<BoundColumn>,
    properties: Vec<BoundProperty>,
    policies: BTreeMap<PolicyKind, TablePolicy>,
}

impl BoundTable {
    /// Bind every column and property of `table`. Fails on the first
    /// declaration the engine cannot render.
    pub fn bind(table: TableInstance, dialect: Arc<dyn Dialect>) -> Result<Self> {
        let (shape, schema, columns, properties, policies) = table.into_parts();
        let vocabulary = dialect.vocabulary();

        let columns = columns
            .iter()
            .map(|c| bind_column(c, vocabulary, dialect.name()))
            .collect::<Result<Vec<_>>>()?;
        let properties = properties
            .iter()
            .map(|p| bind_property(p, vocabulary, dialect.name()))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Bound {}.{} to {} ({} columns, {} properties)",
            schema,
            shape.table_name(),
            dialect.name(),
            columns.len(),
            properties.len()
        );

        Ok(Self {
            shape,
            schema,
            dialect,
            columns,
            properties,
            policies,
        })
    }

    /// Bind the same table, with its current values, to another dialect.
    pub fn rebind(&self, dialect: Arc<dyn Dialect>) -> Result<Self> {
        Self::bind(self.to_instance(), dialect)
    }

    /// Unbound copy of this table, keeping assigned values.
    pub fn to_instance(&self) -> TableInstance {
        TableInstance::from_parts(
            self.shape.clone(),
            self.schema.clone(),
            self.columns.iter().map(|c| c.decl().clone()).collect(),
            self.properties.iter().map(|p| p.property().clone()).collect(),
            self.policies.clone(),
        )
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.dialect.vocabulary()
    }

    pub fn shape(&self) -> &Arc<TableShape> {
        &self.shape
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn description(&self) -> Option<&str> {
        self.shape.description()
    }

    // ===== Naming =====

    pub fn table_name(&self) -> String {
        self.shape.table_name()
    }

    pub fn table_name_with_prefix(&self) -> String {
        format!("{}{}", self.shape.prefix(), self.table_name())
    }

    fn quote_table(&self, name: &str, quoted: bool) -> String {
        if quoted {
            self.vocabulary().quote_table(name)
        } else {
            name.to_string()
        }
    }

    /// `schema.table`, optionally prefixed, suffixed and quoted per segment.
    pub fn full_table_name(&self, quoted: bool, with_prefix: bool, suffix: &str) -> String {
        let base = if with_prefix {
            self.table_name_with_prefix()
        } else {
            self.table_name()
        };
        format!(
            "{}.{}",
            self.quote_table(&self.schema, quoted),
            self.quote_table(&format!("{}{}", base, suffix), quoted)
        )
    }

    /// `stg_<partition values>_<table>`, or `stg_<table>` without values.
    pub fn staging_table_name(&self) -> String {
        let named = self
            .partitions()
            .into_iter()
            .filter_map(|p| p.decl().current_value())
            .map(|v| cleanup_partition_value(v, false, false))
            .collect::<Vec<_>>()
            .join("_");
        if named.is_empty() {
            format!("stg_{}", self.table_name())
        } else {
            format!("stg_{}_{}", named, self.table_name())
        }
    }

    pub fn staging_table_name_with_prefix(&self) -> String {
        format!("{}{}", self.shape.prefix(), self.staging_table_name())
    }

    pub fn full_staging_table_name(&self, quoted: bool, with_prefix: bool, suffix: &str) -> String {
        let base = if with_prefix {
            self.staging_table_name_with_prefix()
        } else {
            self.staging_table_name()
        };
        format!(
            "{}.{}",
            self.quote_table(&self.schema, quoted),
            self.quote_table(&format!("{}{}", base, suffix), quoted)
        )
    }

    /// Storage path segments, e.g. `ds=2020-01-01/country=nl`.
    pub fn partition_definition(&self) -> String {
        self.partitions()
            .into_iter()
            .filter_map(|p| {
                p.decl()
                    .value
                    .as_deref()
                    .map(|v| format!("{}={}", p.name(), cleanup_partition_value(v, false, true)))
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    // ===== Columns =====

    /// Columns in declaration order.
    pub fn columns(&self, include_partitions: bool, filter: &ColumnFilter) -> Vec<&BoundColumn> {
        self.columns
            .iter()
            .filter(|c| filter.matches(c.decl()))
            .filter(|c| include_partitions || !c.is_partition())
            .collect()
    }

    pub fn all_columns(&self) -> &[BoundColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&BoundColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn partitions(&self) -> Vec<&BoundColumn> {
        self.columns.iter().filter(|c| c.is_partition()).collect()
    }

    pub fn column_names(&self, include_partitions: bool, filter: &ColumnFilter) -> Vec<String> {
        self.columns(include_partitions, filter)
            .into_iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn partition_names(&self) -> Vec<String> {
        self.partitions()
            .into_iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Load expressions of the selected columns.
    pub fn column_values(&self, include_partitions: bool, filter: &ColumnFilter) -> Vec<String> {
        self.columns(include_partitions, filter)
            .into_iter()
            .map(BoundColumn::default_load_value)
            .collect()
    }

    /// Explicitly assign a column value.
    pub fn set_value(&mut self, column: &str, value: impl Into<String>) -> Result<()> {
        let table = self.shape.name();
        let bound = self
            .columns
            .iter_mut()
            .find(|c| c.name() == column)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        bound.decl_mut().set_value(value);
        Ok(())
    }

    /// Append a column and bind it to this table's dialect.
    pub fn add_column(&mut self, column: ColumnDecl) -> Result<()> {
        if column.name.is_empty() {
            return Err(SchemaError::ColumnNameRequired(Some(self.shape.name().to_string())));
        }
        if self.column(&column.name).is_some() {
            return Err(SchemaError::ColumnNameNotUnique(column.name));
        }
        let bound = bind_column(&column, self.dialect.vocabulary(), self.dialect.name())?;
        self.columns.push(bound);
        Ok(())
    }

    /// Fresh table of the same shape and schema at the given partition
    /// values, bound to the same dialect.
    pub fn with_partition_values(&self, values: &BTreeMap<String, String>) -> Result<Self> {
        let instance = TableInstance::new(
            self.shape.clone(),
            self.schema.clone(),
            values.iter().map(|(k, v)| (k.clone(), v.clone())),
        )?;
        Self::bind(instance, self.dialect.clone())
    }

    // ===== Properties and policies =====

    pub fn properties(&self) -> &[BoundProperty] {
        &self.properties
    }

    /// First property of `kind`.
    pub fn property(&self, kind: PropertyKind) -> Option<&BoundProperty> {
        self.properties.iter().find(|p| p.property().kind == kind)
    }

    pub fn policies(&self) -> &BTreeMap<PolicyKind, TablePolicy> {
        &self.policies
    }

    pub fn lookup_policy(&self, kind: PolicyKind) -> Option<&TablePolicy> {
        self.policies.get(&kind)
    }

    /// Resolve the policy of `kind`; `Ok(None)` if the table has none.
    pub fn resolve_policy(&self, kind: PolicyKind) -> Result<Option<String>> {
        match self.lookup_policy(kind) {
            Some(policy) => policy.resolve(self),
            None => Ok(None),
        }
    }

    // ===== Partition bookkeeping =====

    /// Current partition values overridden by `params`.
    pub fn current_partition_params(
        &self,
        params: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut current: BTreeMap<String, String> = self
            .partitions()
            .into_iter()
            .filter_map(|p| p.decl().value.clone().map(|v| (p.name().to_string(), v)))
            .collect();
        current.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        current
    }

    /// `"p" = {p}` for every partition not ignored, joined by `sep`, with
    /// `condition` appended.
    pub fn current_partition_condition(
        &self,
        condition: Option<&str>,
        ignored: &BTreeSet<String>,
        sep: &str,
    ) -> String {
        let mut conditions: Vec<String> = self
            .partitions()
            .into_iter()
            .filter(|p| !ignored.contains(p.name()))
            .map(|p| format!("{} = {{{}}}", p.quoted_name(), p.name()))
            .collect();
        if let Some(extra) = condition.filter(|c| !c.is_empty()) {
            conditions.push(extra.to_string());
        }
        conditions.join(sep)
    }

    /// Partition condition of `scope` with its parameters substituted.
    pub fn scoped_condition(&self, scope: &PartitionScope, sep: &str) -> String {
        let condition =
            self.current_partition_condition(scope.condition.as_deref(), &scope.ignored, sep);
        template::substitute(&condition, &self.current_partition_params(&scope.params))
    }

    // ===== Statements =====

    pub fn create_table(&self, opts: &CreateTableOptions) -> String {
        self.dialect.build_create_table(self, opts)
    }

    pub fn drop_table(&self, suffix: &str) -> String {
        self.dialect.build_drop_table(self, suffix)
    }

    pub fn truncate_table(&self, suffix: &str) -> String {
        self.dialect.build_truncate_table(self, suffix)
    }

    pub fn create_staging_table(&self, opts: &StagingOptions) -> String {
        self.dialect.build_create_staging_table(self, opts)
    }

    pub fn drop_staging_table(&self, suffix: &str) -> String {
        self.dialect.build_drop_staging_table(self, suffix)
    }

    pub fn select(&self, opts: &SelectOptions) -> String {
        self.dialect.build_select(self, opts)
    }

    /// SELECT restricted to the current partition.
    pub fn select_current_partition(&self, opts: &SelectOptions, scope: &PartitionScope) -> String {
        let mut conditions = Vec::new();
        let scoped = self.scoped_condition(scope, " AND ");
        if !scoped.is_empty() {
            conditions.push(scoped);
        }
        if let Some(extra) = opts.condition.as_deref().filter(|c| !c.is_empty()) {
            conditions.push(extra.to_string());
        }
        let opts = SelectOptions {
            condition: Some(conditions.join(" AND ")),
            ..opts.clone()
        };
        self.dialect.build_select(self, &opts)
    }

    /// Sample one value per column of the current partition.
    pub fn sample_column_value(&self, opts: &SelectOptions, scope: &PartitionScope) -> String {
        let function = &self.vocabulary().sample_value_function;
        let transforms = self
            .column_names(true, &ColumnFilter::All)
            .into_iter()
            .map(|name| (name, function.clone()))
            .collect();
        self.select_current_partition(
            &SelectOptions {
                transforms,
                ..opts.clone()
            },
            scope,
        )
    }

    /// INSERT from a select expression embedded as a subquery.
    pub fn insert_into_via_select(&self, select: &str, opts: &InsertOptions) -> String {
        self.dialect
            .build_insert_into(self, &InsertSource::Select(select.to_string()), opts)
    }

    /// INSERT from a named source table.
    pub fn insert_into_from_table(&self, source_table: &str, opts: &InsertOptions) -> String {
        self.dialect
            .build_insert_into(self, &InsertSource::Table(source_table.to_string()), opts)
    }

    pub fn insert_overwrite(&self, select: &str, suffix: &str) -> Result<String> {
        self.dialect.build_insert_overwrite(self, select, suffix)
    }

    pub fn delete_from(&self, opts: &DeleteOptions) -> String {
        self.dialect.build_delete_from(self, opts)
    }

    pub fn delete_current_partition(&self, scope: &PartitionScope) -> String {
        self.dialect.build_delete_current_partition(self, scope)
    }

    pub fn upsert_select(&self, opts: &UpsertOptions) -> String {
        self.dialect.build_upsert_select(self, opts)
    }

    pub fn create_current_partition_view(&self, opts: &ViewOptions) -> String {
        self.dialect.build_create_current_partition_view(self, opts)
    }

    pub fn drop_current_partition_view(&self, suffix: &str) -> String {
        self.dialect.build_drop_current_partition_view(self, suffix)
    }

    pub fn anonymise_partition(&self, scope: &PartitionScope) -> Option<String> {
        self.dialect.build_anonymise_partition(self, scope)
    }

    /// Markdown documentation under a heading of `header` (e.g. `###`).
    pub fn to_markdown(&self, header: &str) -> String {
        crate::docs::table_markdown(self, header)
    }
}
