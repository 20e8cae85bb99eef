//! Declaration file type definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::attributes::Attributes;
use crate::core::pii::PiiPolicy;
use crate::core::policy::TablePolicy;
use crate::core::property::TableProperty;
use crate::core::types::SemanticType;

/// Root of a declaration file: one schema module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaModule {
    /// Module name, also used as the schema of its tables.
    /// Defaults to the file stem when loaded from disk.
    #[serde(default)]
    pub name: Option<String>,

    /// Free-form module documentation.
    #[serde(default)]
    pub description: Option<String>,

    /// Named PII categories, referenced by columns.
    #[serde(default)]
    pub pii: BTreeMap<String, PiiPolicy>,

    /// Table shapes, in declaration order.
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

/// A declared table shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// Type name, e.g. `PageView`; the table name is derived from it.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Prefix prepended to the table name in full names.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Abstract shapes serve as bases and are never instantiated.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    /// Base shape declared earlier in the same module.
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub columns: Vec<ColumnConfig>,

    #[serde(default)]
    pub properties: Vec<TableProperty>,

    #[serde(default)]
    pub policies: Vec<TablePolicy>,
}

/// A declared column, or the nested declaration of a composite column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    /// Column name. Array elements and map keys/values may leave it empty.
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub semantic_type: SemanticType,

    #[serde(default)]
    pub attributes: Attributes,

    #[serde(default)]
    pub comment: Option<String>,

    /// DDL default expression.
    #[serde(default)]
    pub default_value: Option<String>,

    #[serde(default)]
    pub partition: bool,

    /// Initial value (load expression or partition value).
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub pii: Option<PiiRef>,

    /// Element of an `array` column.
    #[serde(default)]
    pub element: Option<Box<ColumnConfig>>,

    /// Key of a `map` column.
    #[serde(default)]
    pub key_type: Option<Box<ColumnConfig>>,

    /// Value of a `map` column.
    #[serde(default)]
    pub value_type: Option<Box<ColumnConfig>>,

    /// Fields of a `row` column.
    #[serde(default)]
    pub fields: Vec<ColumnConfig>,
}

impl ColumnConfig {
    /// Scalar column declaration.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            attributes: Attributes::new(),
            comment: None,
            default_value: None,
            partition: false,
            value: None,
            pii: None,
            element: None,
            key_type: None,
            value_type: None,
            fields: Vec::new(),
        }
    }
}

/// PII handling of a column: a module category name or an inline policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PiiRef {
    Named(String),
    Inline(PiiPolicy),
}
