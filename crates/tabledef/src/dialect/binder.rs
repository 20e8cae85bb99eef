//! Binding declarations to a dialect vocabulary.
//!
//! Binding is a pure function from a declaration and a vocabulary to a
//! separate, fully-resolved bound value. The declaration is never mutated.
//!
//! 1. Look up the class template; missing means `UnsupportedDialect`.
//! 2. Check the class's required attributes; any missing means
//!    `AttributesMissing` naming exactly those attributes.
//! 3. Copy the required attributes into the bound value's resolved fields.
//! 4. Bind nested declarations (composites) before the parent.
//! 5. Render the type from the declaration's attributes and nested types.

use std::collections::BTreeMap;

use super::template::{self, TemplateContext, TemplateValue};
use super::vocabulary::Vocabulary;
use crate::core::attributes::AttrValue;
use crate::core::column::{ColumnDecl, ColumnKind};
use crate::core::property::TableProperty;
use crate::core::types::{DeclarationClass, LifecycleEvent};
use crate::error::{Result, SchemaError};

/// A column declaration validated and rendered for one dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    decl: ColumnDecl,
    column_type: String,
    quoted_name: String,
    setter: String,
    resolved: BTreeMap<String, AttrValue>,
    nested: Vec<BoundColumn>,
}

impl BoundColumn {
    pub fn decl(&self) -> &ColumnDecl {
        &self.decl
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Rendered engine type, e.g. `DECIMAL(18,2)`.
    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    pub fn quoted_name(&self) -> &str {
        &self.quoted_name
    }

    pub fn is_partition(&self) -> bool {
        self.decl.is_partition
    }

    pub fn comment(&self) -> Option<&str> {
        self.decl.comment.as_deref()
    }

    /// Required attribute copied during binding.
    pub fn resolved(&self, attribute: &str) -> Option<&AttrValue> {
        self.resolved.get(attribute)
    }

    /// Any declared attribute.
    pub fn attribute(&self, attribute: &str) -> Option<&AttrValue> {
        self.decl.attributes.get(attribute)
    }

    /// Bound nested declarations (array element, map key/value, row fields).
    pub fn nested(&self) -> &[BoundColumn] {
        &self.nested
    }

    pub(crate) fn decl_mut(&mut self) -> &mut ColumnDecl {
        &mut self.decl
    }

    /// Render the dialect's column setter for `value`.
    pub fn setter(&self, value: &str) -> String {
        template::substitute_pairs(
            &self.setter,
            &[("value", value), ("name", self.quoted_name.as_str())],
        )
    }

    /// Expression loading this column on insert.
    ///
    /// Partitions load their value (or pass through when unset). Otherwise a
    /// manual value wins over every PII rule, dropping wins over
    /// transforming, and columns without insert rules pass through.
    pub fn default_load_value(&self) -> String {
        let decl = &self.decl;
        if decl.is_partition {
            return match decl.current_value() {
                Some(value) => self.setter(value),
                None => self.quoted_name.clone(),
            };
        }

        if decl.manually_set {
            let value = decl.current_value().unwrap_or(&self.quoted_name);
            return self.setter(value);
        }

        let drops_on_insert = decl.pii.drops_on(LifecycleEvent::Insert);
        if !drops_on_insert && decl.pii.transform_on_insert.is_none() {
            return self.quoted_name.clone();
        }

        if drops_on_insert {
            return self.setter("NULL");
        }

        match decl.pii.render_insert_transform(&self.quoted_name) {
            Some(transformed) => self.setter(&transformed),
            None => self.quoted_name.clone(),
        }
    }

    /// Bare expression the column takes when its partition is anonymised.
    pub fn delete_load_value(&self) -> String {
        let pii = &self.decl.pii;
        if pii.drops_on(LifecycleEvent::Delete) {
            return "NULL".to_string();
        }
        pii.render_delete_transform(&self.quoted_name)
            .unwrap_or_else(|| self.quoted_name.clone())
    }
}

/// A table property validated and rendered for one dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundProperty {
    property: TableProperty,
    rendered: String,
    resolved: BTreeMap<String, AttrValue>,
}

impl BoundProperty {
    pub fn property(&self) -> &TableProperty {
        &self.property
    }

    /// Rendered clause, e.g. `format = 'ORC'`.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn resolved(&self, attribute: &str) -> Option<&AttrValue> {
        self.resolved.get(attribute)
    }
}

/// Label used in binding errors.
fn declaration_label(decl: &ColumnDecl, parent: Option<&str>) -> String {
    match (parent, decl.name.is_empty()) {
        (Some(parent), true) => format!("{}.<{}>", parent, decl.semantic_type()),
        (Some(parent), false) => format!("{}.{}", parent, decl.name),
        (None, _) => decl.name.clone(),
    }
}

/// Steps 1-3, shared by columns and properties.
fn resolve_attributes(
    label: &str,
    class: DeclarationClass,
    attributes: &BTreeMap<String, AttrValue>,
    vocabulary: &Vocabulary,
    dialect: &str,
) -> Result<(String, BTreeMap<String, AttrValue>)> {
    let template = vocabulary
        .template(class)
        .ok_or_else(|| SchemaError::unsupported_dialect(label, class.to_string(), dialect))?;

    let required = vocabulary.required_attributes(class);
    let missing: Vec<String> = required
        .iter()
        .filter(|attr| !attributes.contains_key(attr.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::attributes_missing(label, dialect, missing));
    }

    let resolved = required
        .iter()
        .filter_map(|attr| attributes.get(attr).map(|v| (attr.clone(), v.clone())))
        .collect();

    Ok((template.to_string(), resolved))
}

fn attribute_context(attributes: &BTreeMap<String, AttrValue>) -> TemplateContext {
    attributes
        .iter()
        .map(|(k, v)| {
            let value = match v {
                AttrValue::List(items) => TemplateValue::List(items.clone()),
                other => TemplateValue::Text(other.to_string()),
            };
            (k.clone(), value)
        })
        .collect()
}

/// Bind a column declaration to `vocabulary`.
pub fn bind_column(decl: &ColumnDecl, vocabulary: &Vocabulary, dialect: &str) -> Result<BoundColumn> {
    bind_column_in(decl, None, vocabulary, dialect)
}

fn bind_column_in(
    decl: &ColumnDecl,
    parent: Option<&str>,
    vocabulary: &Vocabulary,
    dialect: &str,
) -> Result<BoundColumn> {
    let label = declaration_label(decl, parent);
    let class = DeclarationClass::Column(decl.semantic_type());
    let (type_template, resolved) =
        resolve_attributes(&label, class, &decl.attributes, vocabulary, dialect)?;

    let nested = decl
        .kind
        .nested()
        .into_iter()
        .map(|n| bind_column_in(n, Some(&label), vocabulary, dialect))
        .collect::<Result<Vec<_>>>()?;

    let quoted_name = vocabulary.quote_column(&decl.name);
    let mut context = attribute_context(&decl.attributes);
    context.insert("name".into(), decl.name.as_str().into());
    context.insert("quoted_name".into(), quoted_name.as_str().into());
    match &decl.kind {
        ColumnKind::Scalar(_) => {}
        ColumnKind::Array { .. } => {
            context.insert("element".into(), nested[0].column_type.as_str().into());
        }
        ColumnKind::Map { .. } => {
            context.insert("key_type".into(), nested[0].column_type.as_str().into());
            context.insert("value_type".into(), nested[1].column_type.as_str().into());
        }
        ColumnKind::Row { .. } => {
            let fields = nested
                .iter()
                .map(|field| {
                    template::substitute_pairs(
                        &vocabulary.row_field_template,
                        &[
                            ("quoted_name", field.quoted_name.as_str()),
                            ("type", field.column_type.as_str()),
                        ],
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            context.insert("fields".into(), fields.into());
        }
    }

    Ok(BoundColumn {
        column_type: template::render(&type_template, &context),
        quoted_name,
        setter: vocabulary.column_setter.clone(),
        resolved,
        nested,
        decl: decl.clone(),
    })
}

/// Bind a table property to `vocabulary`.
pub fn bind_property(
    property: &TableProperty,
    vocabulary: &Vocabulary,
    dialect: &str,
) -> Result<BoundProperty> {
    let label = property.kind.to_string();
    let class = DeclarationClass::Property(property.kind);
    let (template, resolved) =
        resolve_attributes(&label, class, &property.attributes, vocabulary, dialect)?;

    Ok(BoundProperty {
        rendered: template::render(&template, &attribute_context(&property.attributes)),
        resolved,
        property: property.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pii::PiiPolicy;
    use crate::core::types::{PropertyKind, SemanticType};

    fn vocab() -> Vocabulary {
        Vocabulary::default()
            .with_type(SemanticType::Integer, "INTEGER")
            .with_type(SemanticType::Varchar, "VARCHAR[[({length})]]")
            .with_type(SemanticType::Decimal, "DECIMAL({precision},{scale})")
            .with_type(SemanticType::Array, "ARRAY({element})")
            .with_type(SemanticType::Map, "MAP({key_type}, {value_type})")
            .with_type(SemanticType::Row, "ROW({fields})")
            .requires(SemanticType::Decimal, &["precision", "scale"])
            .with_property(PropertyKind::Format, "format = '{format}'")
            .requires(PropertyKind::Format, &["format"])
    }

    #[test]
    fn test_bind_scalar() {
        let c = ColumnDecl::new("price", SemanticType::Decimal)
            .attr("precision", 18)
            .attr("scale", 2);
        let bound = bind_column(&c, &vocab(), "test").unwrap();
        assert_eq!(bound.column_type(), "DECIMAL(18,2)");
        assert_eq!(bound.quoted_name(), "\"price\"");
        assert_eq!(bound.resolved("scale"), Some(&AttrValue::Int(2)));
    }

    #[test]
    fn test_optional_attribute() {
        let c = ColumnDecl::new("s", SemanticType::Varchar);
        assert_eq!(bind_column(&c, &vocab(), "t").unwrap().column_type(), "VARCHAR");
        let c = c.attr("length", 10);
        let bound = bind_column(&c, &vocab(), "t").unwrap();
        assert_eq!(bound.column_type(), "VARCHAR(10)");
        assert!(bound.resolved("length").is_none());
    }

    #[test]
    fn test_missing_attributes_named_exactly() {
        let c = ColumnDecl::new("price", SemanticType::Decimal).attr("precision", 18);
        match bind_column(&c, &vocab(), "test").unwrap_err() {
            SchemaError::AttributesMissing {
                declaration,
                missing,
                ..
            } => {
                assert_eq!(declaration, "price");
                assert_eq!(missing, vec!["scale".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_class() {
        let c = ColumnDecl::new("d", SemanticType::Date);
        assert!(matches!(
            bind_column(&c, &vocab(), "test"),
            Err(SchemaError::UnsupportedDialect { .. })
        ));
    }

    #[test]
    fn test_composites_bind_recursively() {
        let row = ColumnDecl::row(
            "loc",
            vec![
                ColumnDecl::new("city", SemanticType::Varchar),
                ColumnDecl::array("tags", ColumnDecl::new("", SemanticType::Varchar)),
            ],
        );
        let bound = bind_column(&row, &vocab(), "t").unwrap();
        assert_eq!(bound.column_type(), "ROW(\"city\" VARCHAR, \"tags\" ARRAY(VARCHAR))");

        let map = ColumnDecl::map(
            "m",
            ColumnDecl::new("", SemanticType::Varchar),
            ColumnDecl::new("", SemanticType::Integer),
        );
        assert_eq!(
            bind_column(&map, &vocab(), "t").unwrap().column_type(),
            "MAP(VARCHAR, INTEGER)"
        );
    }

    #[test]
    fn test_nested_failure_propagates() {
        let arr = ColumnDecl::array("prices", ColumnDecl::new("", SemanticType::Decimal));
        match bind_column(&arr, &vocab(), "t").unwrap_err() {
            SchemaError::AttributesMissing {
                declaration,
                missing,
                ..
            } => {
                assert_eq!(declaration, "prices.<Decimal>");
                assert_eq!(missing, vec!["precision".to_string(), "scale".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_load_value_priority() {
        let v = vocab();
        let plain = bind_column(&ColumnDecl::new("id", SemanticType::Integer), &v, "t").unwrap();
        assert_eq!(plain.default_load_value(), "\"id\"");

        let dropped = ColumnDecl::new("id", SemanticType::Integer).pii(PiiPolicy::drop_on_insert());
        let bound = bind_column(&dropped, &v, "t").unwrap();
        assert_eq!(bound.default_load_value(), "NULL AS \"id\"");

        let hashed = ColumnDecl::new("email", SemanticType::Varchar)
            .pii(PiiPolicy::transform_on_insert("SHA256({quoted_name})"));
        let bound = bind_column(&hashed, &v, "t").unwrap();
        assert_eq!(bound.default_load_value(), "SHA256(\"email\") AS \"email\"");

        let mut manual = dropped.clone();
        manual.set_value("42");
        let bound = bind_column(&manual, &v, "t").unwrap();
        assert_eq!(bound.default_load_value(), "42 AS \"id\"");

        let mut both = ColumnDecl::new("id", SemanticType::Integer)
            .pii(PiiPolicy::drop_on_insert());
        both.pii.transform_on_insert = Some("HASH({quoted_name})".into());
        let bound = bind_column(&both, &v, "t").unwrap();
        assert_eq!(bound.default_load_value(), "NULL AS \"id\"");

        let mut empty_manual = ColumnDecl::new("id", SemanticType::Integer);
        empty_manual.set_value("");
        let bound = bind_column(&empty_manual, &v, "t").unwrap();
        assert_eq!(bound.default_load_value(), "\"id\" AS \"id\"");
    }

    #[test]
    fn test_partition_load_value() {
        let v = vocab();
        let ds = ColumnDecl::partition("ds", SemanticType::Varchar).pii(PiiPolicy::drop_on_insert());
        assert_eq!(bind_column(&ds, &v, "t").unwrap().default_load_value(), "\"ds\"");
        let ds = ds.value("'2020-01-01'");
        assert_eq!(
            bind_column(&ds, &v, "t").unwrap().default_load_value(),
            "'2020-01-01' AS \"ds\""
        );
    }

    #[test]
    fn test_delete_load_value() {
        let v = vocab();
        let c = ColumnDecl::new("email", SemanticType::Varchar).pii(PiiPolicy::drop_on_delete());
        assert_eq!(bind_column(&c, &v, "t").unwrap().delete_load_value(), "NULL");
        let c = ColumnDecl::new("email", SemanticType::Varchar)
            .pii(PiiPolicy::transform_on_delete("MD5({quoted_name})"));
        assert_eq!(
            bind_column(&c, &v, "t").unwrap().delete_load_value(),
            "MD5(\"email\")"
        );
    }

    #[test]
    fn test_bind_property() {
        let v = vocab();
        let p = TableProperty::format("ORC");
        assert_eq!(bind_property(&p, &v, "t").unwrap().rendered(), "format = 'ORC'");

        let err = bind_property(&TableProperty::new(PropertyKind::Format), &v, "t").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Format - following attributes are required by t: format"
        );

        let err = bind_property(&TableProperty::sortkey(vec!["id"]), &v, "t").unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedDialect { .. }));
    }
}
