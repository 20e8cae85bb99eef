//! Prototypes and table shapes.
//!
//! A [`TableShape`] is what a schema author declares: a named collection of
//! columns, properties and policies assembled through [`TableShapeBuilder`].
//! Building a shape with at least one column validates it into an immutable
//! [`Prototype`] that every [`TableInstance`](super::table::TableInstance)
//! clones from.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::column::{ColumnDecl, ColumnKind};
use super::naming;
use super::policy::{PolicyKind, TablePolicy};
use super::property::TableProperty;
use super::sequence::DeclarationSequence;
use crate::error::{Result, SchemaError};

/// Validated, immutable blueprint of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    columns: Vec<ColumnDecl>,
    properties: Vec<TableProperty>,
    policies: BTreeMap<PolicyKind, TablePolicy>,
}

impl Prototype {
    /// Validate and build a prototype.
    ///
    /// Columns are ordered by their ordering key; unstamped columns keep their
    /// relative position after the stamped ones.
    pub fn new(
        mut columns: Vec<ColumnDecl>,
        properties: Vec<TableProperty>,
        policies: BTreeMap<PolicyKind, TablePolicy>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(SchemaError::ColumnRequired);
        }

        let mut known = HashSet::new();
        for column in &columns {
            if column.name.is_empty() {
                return Err(SchemaError::ColumnNameRequired(None));
            }
            if !known.insert(column.name.as_str()) {
                return Err(SchemaError::ColumnNameNotUnique(column.name.clone()));
            }
            validate_nested(column)?;
        }

        columns.sort_by_key(|c| c.ordering_key.unwrap_or(u64::MAX));

        Ok(Self {
            columns,
            properties,
            policies,
        })
    }

    pub fn columns(&self) -> &[ColumnDecl] {
        &self.columns
    }

    pub fn properties(&self) -> &[TableProperty] {
        &self.properties
    }

    pub fn policies(&self) -> &BTreeMap<PolicyKind, TablePolicy> {
        &self.policies
    }
}

/// Row fields are addressed by name, so they need unique, non-empty names.
fn validate_nested(column: &ColumnDecl) -> Result<()> {
    if let ColumnKind::Row { fields } = &column.kind {
        let mut known = HashSet::new();
        for field in fields {
            if field.name.is_empty() {
                return Err(SchemaError::ColumnNameRequired(Some(format!(
                    "field of row {}",
                    column.name
                ))));
            }
            if !known.insert(field.name.as_str()) {
                return Err(SchemaError::ColumnNameNotUnique(format!(
                    "{}.{}",
                    column.name, field.name
                )));
            }
        }
    }
    for nested in column.kind.nested() {
        validate_nested(nested)?;
    }
    Ok(())
}

/// A declared table shape.
#[derive(Debug, Clone)]
pub struct TableShape {
    name: String,
    description: Option<String>,
    prefix: String,
    columns: Vec<ColumnDecl>,
    properties: Vec<TableProperty>,
    policies: BTreeMap<PolicyKind, TablePolicy>,
    prototype: Option<Arc<Prototype>>,
}

impl TableShape {
    /// Start declaring a shape named after its type, e.g. `PageView`.
    pub fn builder(name: impl Into<String>, sequence: &DeclarationSequence) -> TableShapeBuilder {
        TableShapeBuilder::new(name, sequence.clone())
    }

    /// Declared type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table name derived from the type name.
    pub fn table_name(&self) -> String {
        naming::table_name(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prototype, absent for abstract shapes.
    pub fn prototype(&self) -> Option<&Arc<Prototype>> {
        self.prototype.as_ref()
    }

    /// Prototype, or `PrototypeRequired` for abstract shapes.
    pub fn require_prototype(&self) -> Result<&Arc<Prototype>> {
        self.prototype
            .as_ref()
            .ok_or_else(|| SchemaError::PrototypeRequired(self.name.clone()))
    }

    pub fn is_abstract(&self) -> bool {
        self.prototype.is_none()
    }

    /// Declared columns in declaration order, including abstract shapes' columns.
    pub fn declared_columns(&self) -> &[ColumnDecl] {
        &self.columns
    }
}

/// Builder assembling a [`TableShape`] in declaration order.
#[derive(Debug)]
pub struct TableShapeBuilder {
    sequence: DeclarationSequence,
    name: String,
    description: Option<String>,
    prefix: Option<String>,
    is_abstract: bool,
    inherited_columns: Vec<ColumnDecl>,
    columns: Vec<ColumnDecl>,
    properties: Vec<TableProperty>,
    policies: BTreeMap<PolicyKind, TablePolicy>,
}

impl TableShapeBuilder {
    fn new(name: impl Into<String>, sequence: DeclarationSequence) -> Self {
        Self {
            sequence,
            name: name.into(),
            description: None,
            prefix: None,
            is_abstract: false,
            inherited_columns: Vec::new(),
            columns: Vec::new(),
            properties: Vec::new(),
            policies: BTreeMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Prefix prepended to the table name in full names.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Mark the shape as a base that is never instantiated.
    pub fn abstract_shape(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Inherit columns, properties, policies and prefix from `base`.
    ///
    /// Columns redeclared on this builder replace the inherited ones.
    pub fn extends(mut self, base: &TableShape) -> Self {
        self.inherited_columns
            .extend(base.columns.iter().cloned());
        self.properties.extend(base.properties.iter().cloned());
        for (kind, policy) in &base.policies {
            self.policies.entry(*kind).or_insert_with(|| policy.clone());
        }
        if self.prefix.is_none() && !base.prefix.is_empty() {
            self.prefix = Some(base.prefix.clone());
        }
        self
    }

    /// Declare a column. Unstamped columns receive the next ordering key.
    pub fn column(mut self, column: ColumnDecl) -> Self {
        self.columns.push(self.sequence.stamp(column));
        self
    }

    /// Declare a partition column.
    pub fn partition(self, column: ColumnDecl) -> Self {
        self.column(column.as_partition())
    }

    pub fn property(mut self, property: TableProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Attach a policy; a later policy of the same kind replaces an earlier one.
    pub fn policy(mut self, policy: TablePolicy) -> Self {
        self.policies.insert(policy.kind(), policy);
        self
    }

    /// Finish the shape, validating its prototype unless it has no columns
    /// or is abstract.
    pub fn build(self) -> Result<TableShape> {
        let own: HashSet<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let mut columns: Vec<ColumnDecl> = self
            .inherited_columns
            .iter()
            .filter(|c| !own.contains(c.name.as_str()))
            .cloned()
            .collect();
        columns.extend(self.columns);
        columns.sort_by_key(|c| c.ordering_key.unwrap_or(u64::MAX));

        let prototype = if columns.is_empty() || self.is_abstract {
            None
        } else {
            Some(Arc::new(Prototype::new(
                columns.clone(),
                self.properties.clone(),
                self.policies.clone(),
            )?))
        };

        debug!(
            "Declared table shape {} ({} columns, {} properties, {} policies{})",
            self.name,
            columns.len(),
            self.properties.len(),
            self.policies.len(),
            if prototype.is_none() { ", abstract" } else { "" }
        );

        Ok(TableShape {
            name: self.name,
            description: self.description,
            prefix: self.prefix.unwrap_or_default(),
            columns,
            properties: self.properties,
            policies: self.policies,
            prototype,
        })
    }
}
