//! Table instances: per-use copies of a prototype bound to a schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use super::column::ColumnDecl;
use super::policy::{PolicyKind, TablePolicy};
use super::property::TableProperty;
use super::prototype::TableShape;
use super::traits::Dialect;
use crate::dialect::BoundTable;
use crate::error::{Result, SchemaError};

/// A schema-bound usage of a table shape.
///
/// Each instance owns clones of the prototype's columns, so assigning values
/// never touches the shared prototype.
#[derive(Debug, Clone)]
pub struct TableInstance {
    shape: Arc<TableShape>,
    schema: String,
    columns: Vec<ColumnDecl>,
    properties: Vec<TableProperty>,
    policies: BTreeMap<PolicyKind, TablePolicy>,
}

impl TableInstance {
    /// Instantiate `shape` in `schema`.
    ///
    /// `values` seed column values without marking them as manually set;
    /// names that match no column are ignored with a warning.
    pub fn new<I, K, V>(shape: Arc<TableShape>, schema: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let prototype = shape.require_prototype()?.clone();
        let mut columns = prototype.columns().to_vec();

        for (name, value) in values {
            let name = name.into();
            match columns.iter_mut().find(|c| c.name == name) {
                Some(column) => column.value = Some(value.into()),
                None => warn!(
                    "Ignoring initial value for unknown column {} of {}",
                    name,
                    shape.name()
                ),
            }
        }

        Ok(Self {
            schema: schema.into(),
            columns,
            properties: prototype.properties().to_vec(),
            policies: prototype.policies().clone(),
            shape,
        })
    }

    /// Instantiate without initial values.
    pub fn empty(shape: Arc<TableShape>, schema: impl Into<String>) -> Result<Self> {
        Self::new(shape, schema, std::iter::empty::<(String, String)>())
    }

    pub fn shape(&self) -> &Arc<TableShape> {
        &self.shape
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table_name(&self) -> String {
        self.shape.table_name()
    }

    pub fn columns(&self) -> &[ColumnDecl] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDecl> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn properties(&self) -> &[TableProperty] {
        &self.properties
    }

    pub fn policies(&self) -> &BTreeMap<PolicyKind, TablePolicy> {
        &self.policies
    }

    /// Explicitly assign a column value.
    pub fn set_value(&mut self, column: &str, value: impl Into<String>) -> Result<()> {
        let table = self.shape.name();
        let decl = self
            .columns
            .iter_mut()
            .find(|c| c.name == column)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        decl.set_value(value);
        Ok(())
    }

    /// Bind every column and property to `dialect`.
    pub fn bind(self, dialect: Arc<dyn Dialect>) -> Result<BoundTable> {
        BoundTable::bind(self, dialect)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Arc<TableShape>,
        String,
        Vec<ColumnDecl>,
        Vec<TableProperty>,
        BTreeMap<PolicyKind, TablePolicy>,
    ) {
        (
            self.shape,
            self.schema,
            self.columns,
            self.properties,
            self.policies,
        )
    }

    pub(crate) fn from_parts(
        shape: Arc<TableShape>,
        schema: String,
        columns: Vec<ColumnDecl>,
        properties: Vec<TableProperty>,
        policies: BTreeMap<PolicyKind, TablePolicy>,
    ) -> Self {
        Self {
            shape,
            schema,
            columns,
            properties,
            policies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequence::DeclarationSequence;
    use crate::core::types::SemanticType;

    fn shape() -> Arc<TableShape> {
        let seq = DeclarationSequence::new();
        Arc::new(
            TableShape::builder("MyTable", &seq)
                .column(ColumnDecl::new("id", SemanticType::Integer))
                .partition(ColumnDecl::new("ds", SemanticType::Varchar))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_initial_values_are_not_manual() {
        let table = TableInstance::new(shape(), "schema", [("ds", "'2020-01-01'")]).unwrap();
        let ds = table.column("ds").unwrap();
        assert_eq!(ds.value.as_deref(), Some("'2020-01-01'"));
        assert!(!ds.manually_set);
    }

    #[test]
    fn test_unknown_initial_value_is_ignored() {
        let table = TableInstance::new(shape(), "schema", [("nope", "1")]).unwrap();
        assert!(table.columns().iter().all(|c| c.value.is_none()));
    }

    #[test]
    fn test_instances_do_not_share_columns() {
        let shape = shape();
        let mut a = TableInstance::empty(shape.clone(), "s").unwrap();
        let b = TableInstance::empty(shape.clone(), "s").unwrap();
        a.set_value("id", "42").unwrap();
        assert!(a.column("id").unwrap().manually_set);
        assert!(!b.column("id").unwrap().manually_set);
        assert!(shape.require_prototype().unwrap().columns()[0].value.is_none());
    }

    #[test]
    fn test_set_value_unknown_column() {
        let mut table = TableInstance::empty(shape(), "s").unwrap();
        let err = table.set_value("missing", "1").unwrap_err();
        assert_eq!(err.to_string(), "Table MyTable has no column named missing");
    }

    #[test]
    fn test_abstract_shape_cannot_be_instantiated() {
        let seq = DeclarationSequence::new();
        let shape = Arc::new(TableShape::builder("Base", &seq).build().unwrap());
        assert!(matches!(
            TableInstance::empty(shape, "s"),
            Err(SchemaError::PrototypeRequired(_))
        ));
    }
}
