//! Dialect vocabularies: per-engine lookup tables (data, not logic).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::{DeclarationClass, PropertyKind, SemanticType};
use crate::error::Result;

/// How an engine quotes identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// `"name"`
    #[default]
    DoubleQuote,
    /// `` `name` ``
    Backtick,
}

impl QuoteStyle {
    /// Quote `name`, doubling any embedded quote character.
    pub fn quote(&self, name: &str) -> String {
        let q = match self {
            QuoteStyle::DoubleQuote => '"',
            QuoteStyle::Backtick => '`',
        };
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }
}

fn default_column_setter() -> String {
    "{value} AS {name}".to_string()
}

fn default_row_field_template() -> String {
    "{quoted_name} {type}".to_string()
}

fn default_sample_value_function() -> String {
    "MAX({c})".to_string()
}

/// Lookup tables mapping declaration classes to template strings.
///
/// Type and property templates are rendered by
/// [`template::render`](super::template::render). Composite templates can
/// reference `{element}`, `{key_type}`, `{value_type}` and `{fields}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vocabulary {
    #[serde(default)]
    pub type_templates: BTreeMap<SemanticType, String>,

    #[serde(default)]
    pub property_templates: BTreeMap<PropertyKind, String>,

    #[serde(default)]
    pub required_column_attributes: BTreeMap<SemanticType, Vec<String>>,

    #[serde(default)]
    pub required_property_attributes: BTreeMap<PropertyKind, Vec<String>>,

    #[serde(default)]
    pub table_quote: QuoteStyle,

    #[serde(default)]
    pub column_quote: QuoteStyle,

    /// How a load expression is aliased; `{value}` and `{name}` placeholders.
    #[serde(default = "default_column_setter")]
    pub column_setter: String,

    /// Rendering of one row field inside `{fields}`.
    #[serde(default = "default_row_field_template")]
    pub row_field_template: String,

    /// Aggregate used to sample a column; `{c}` is the quoted column.
    #[serde(default = "default_sample_value_function")]
    pub sample_value_function: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            type_templates: BTreeMap::new(),
            property_templates: BTreeMap::new(),
            required_column_attributes: BTreeMap::new(),
            required_property_attributes: BTreeMap::new(),
            table_quote: QuoteStyle::DoubleQuote,
            column_quote: QuoteStyle::DoubleQuote,
            column_setter: default_column_setter(),
            row_field_template: default_row_field_template(),
            sample_value_function: default_sample_value_function(),
        }
    }
}

impl Vocabulary {
    /// Load a vocabulary from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a vocabulary from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Template for a declaration class, if the engine can render it.
    pub fn template(&self, class: DeclarationClass) -> Option<&str> {
        match class {
            DeclarationClass::Column(t) => self.type_templates.get(&t),
            DeclarationClass::Property(p) => self.property_templates.get(&p),
        }
        .map(String::as_str)
    }

    /// Attributes a declaration class requires (empty by default).
    pub fn required_attributes(&self, class: DeclarationClass) -> &[String] {
        match class {
            DeclarationClass::Column(t) => self.required_column_attributes.get(&t),
            DeclarationClass::Property(p) => self.required_property_attributes.get(&p),
        }
        .map(Vec::as_slice)
        .unwrap_or(&[])
    }

    pub fn quote_table(&self, name: &str) -> String {
        self.table_quote.quote(name)
    }

    pub fn quote_column(&self, name: &str) -> String {
        self.column_quote.quote(name)
    }

    // Builder helpers used by the built-in engines.

    pub fn with_type(mut self, t: SemanticType, template: &str) -> Self {
        self.type_templates.insert(t, template.to_string());
        self
    }

    pub fn without_type(mut self, t: SemanticType) -> Self {
        self.type_templates.remove(&t);
        self.required_column_attributes.remove(&t);
        self
    }

    pub fn with_property(mut self, p: PropertyKind, template: &str) -> Self {
        self.property_templates.insert(p, template.to_string());
        self
    }

    pub fn requires(mut self, class: impl Into<DeclarationClass>, attrs: &[&str]) -> Self {
        let attrs = attrs.iter().map(|a| a.to_string()).collect();
        match class.into() {
            DeclarationClass::Column(t) => {
                self.required_column_attributes.insert(t, attrs);
            }
            DeclarationClass::Property(p) => {
                self.required_property_attributes.insert(p, attrs);
            }
        }
        self
    }
}
