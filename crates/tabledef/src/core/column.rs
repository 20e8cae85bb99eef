//! Column declarations.
//!
//! A [`ColumnDecl`] is the atomic schema unit. Composite kinds own their
//! nested declarations exclusively; nothing is shared between composites.

use std::fmt;
use std::sync::Arc;

use super::attributes::{AttrValue, Attributes};
use super::pii::PiiPolicy;
use super::types::{LifecycleEvent, SemanticType};

/// Semantic type of a column, with nested declarations for composites.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Scalar(SemanticType),
    Array {
        element: Box<ColumnDecl>,
    },
    Map {
        key: Box<ColumnDecl>,
        value: Box<ColumnDecl>,
    },
    Row {
        fields: Vec<ColumnDecl>,
    },
}

impl ColumnKind {
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            ColumnKind::Scalar(t) => *t,
            ColumnKind::Array { .. } => SemanticType::Array,
            ColumnKind::Map { .. } => SemanticType::Map,
            ColumnKind::Row { .. } => SemanticType::Row,
        }
    }

    /// Nested declarations in binding order.
    pub fn nested(&self) -> Vec<&ColumnDecl> {
        match self {
            ColumnKind::Scalar(_) => Vec::new(),
            ColumnKind::Array { element } => vec![element.as_ref()],
            ColumnKind::Map { key, value } => vec![key.as_ref(), value.as_ref()],
            ColumnKind::Row { fields } => fields.iter().collect(),
        }
    }
}

/// Abstract description of a single table field.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub name: String,
    pub kind: ColumnKind,
    pub attributes: Attributes,
    pub pii: PiiPolicy,
    pub is_partition: bool,
    /// Literal or SQL expression used when loading the column.
    pub value: Option<String>,
    /// True once a value was explicitly assigned.
    pub manually_set: bool,
    /// DDL default expression.
    pub default_value: Option<String>,
    pub comment: Option<String>,
    /// Declaration sequence number; `None` until stamped.
    pub ordering_key: Option<u64>,
}

impl ColumnDecl {
    /// Declare a scalar column.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self::with_kind(name, ColumnKind::Scalar(semantic_type))
    }

    pub fn with_kind(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Attributes::new(),
            pii: PiiPolicy::default(),
            is_partition: false,
            value: None,
            manually_set: false,
            default_value: None,
            comment: None,
            ordering_key: None,
        }
    }

    /// Declare an array column of `element`.
    pub fn array(name: impl Into<String>, element: ColumnDecl) -> Self {
        Self::with_kind(
            name,
            ColumnKind::Array {
                element: Box::new(element),
            },
        )
    }

    /// Declare a map column from `key` to `value`.
    pub fn map(name: impl Into<String>, key: ColumnDecl, value: ColumnDecl) -> Self {
        Self::with_kind(
            name,
            ColumnKind::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
        )
    }

    /// Declare a row (struct) column with ordered fields.
    pub fn row(name: impl Into<String>, fields: Vec<ColumnDecl>) -> Self {
        Self::with_kind(name, ColumnKind::Row { fields })
    }

    /// Declare a partition column.
    pub fn partition(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self::new(name, semantic_type).as_partition()
    }

    pub fn as_partition(mut self) -> Self {
        self.is_partition = true;
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn pii(mut self, pii: PiiPolicy) -> Self {
        self.pii = pii;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    /// Initial value that does not count as a manual assignment.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn ordering_key(mut self, key: u64) -> Self {
        self.ordering_key = Some(key);
        self
    }

    /// Assign a value explicitly.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
        self.manually_set = true;
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.kind.semantic_type()
    }

    /// Whether the documentation generator should list this column.
    ///
    /// Columns with `keep: false` or dropped on insert are hidden.
    pub fn is_documented(&self) -> bool {
        let keep = self
            .attributes
            .get("keep")
            .and_then(AttrValue::as_bool)
            .unwrap_or(true);
        keep && !self.pii.drops_on(LifecycleEvent::Insert)
    }

    /// Value if it is set and non-empty.
    pub fn current_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Predicate selecting a subset of a table's columns.
#[derive(Clone, Default)]
pub enum ColumnFilter {
    #[default]
    All,
    Only(Vec<String>),
    Except(Vec<String>),
    ManuallySet,
    Custom(Arc<dyn Fn(&ColumnDecl) -> bool + Send + Sync>),
}

impl ColumnFilter {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnFilter::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn except<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnFilter::Except(names.into_iter().map(Into::into).collect())
    }

    pub fn custom(f: impl Fn(&ColumnDecl) -> bool + Send + Sync + 'static) -> Self {
        ColumnFilter::Custom(Arc::new(f))
    }

    pub fn matches(&self, column: &ColumnDecl) -> bool {
        match self {
            ColumnFilter::All => true,
            ColumnFilter::Only(names) => names.iter().any(|n| *n == column.name),
            ColumnFilter::Except(names) => !names.iter().any(|n| *n == column.name),
            ColumnFilter::ManuallySet => column.manually_set,
            ColumnFilter::Custom(f) => f(column),
        }
    }

    /// Filter matching columns of both `self` and `other`.
    pub fn and(self, other: ColumnFilter) -> ColumnFilter {
        match (self, other) {
            (ColumnFilter::All, f) | (f, ColumnFilter::All) => f,
            (a, b) => ColumnFilter::custom(move |c| a.matches(c) && b.matches(c)),
        }
    }
}

impl fmt::Debug for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnFilter::All => f.write_str("All"),
            ColumnFilter::Only(names) => f.debug_tuple("Only").field(names).finish(),
            ColumnFilter::Except(names) => f.debug_tuple("Except").field(names).finish(),
            ColumnFilter::ManuallySet => f.write_str("ManuallySet"),
            ColumnFilter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_marks_manual() {
        let mut c = ColumnDecl::new("id", SemanticType::Integer).value("1");
        assert!(!c.manually_set);
        c.set_value("2");
        assert!(c.manually_set);
        assert_eq!(c.current_value(), Some("2"));
    }

    #[test]
    fn test_composite_nested_order() {
        let row = ColumnDecl::row(
            "location",
            vec![
                ColumnDecl::new("lat", SemanticType::Double),
                ColumnDecl::new("lon", SemanticType::Double),
            ],
        );
        let names: Vec<_> = row.kind.nested().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["lat", "lon"]);
        assert_eq!(row.semantic_type(), SemanticType::Row);

        let map = ColumnDecl::map(
            "tags",
            ColumnDecl::new("", SemanticType::Varchar),
            ColumnDecl::new("", SemanticType::Integer),
        );
        assert_eq!(map.kind.nested().len(), 2);
    }

    #[test]
    fn test_is_documented() {
        let c = ColumnDecl::new("a", SemanticType::Integer);
        assert!(c.is_documented());
        let c = ColumnDecl::new("a", SemanticType::Integer).attr("keep", false);
        assert!(!c.is_documented());
        let c = ColumnDecl::new("a", SemanticType::Integer).pii(PiiPolicy::drop_on_insert());
        assert!(!c.is_documented());
        let c = ColumnDecl::new("a", SemanticType::Integer).pii(PiiPolicy::drop_on_delete());
        assert!(c.is_documented());
    }

    #[test]
    fn test_filters() {
        let mut a = ColumnDecl::new("a", SemanticType::Integer);
        let b = ColumnDecl::new("b", SemanticType::Integer);
        assert!(ColumnFilter::only(["a"]).matches(&a));
        assert!(!ColumnFilter::only(["a"]).matches(&b));
        assert!(ColumnFilter::except(["a"]).matches(&b));
        assert!(!ColumnFilter::ManuallySet.matches(&a));
        a.set_value("1");
        assert!(ColumnFilter::ManuallySet.matches(&a));

        let combined = ColumnFilter::except(["b"]).and(ColumnFilter::ManuallySet);
        assert!(combined.matches(&a));
        assert!(!combined.matches(&b));
        assert_eq!(format!("{:?}", combined), "Custom(..)");
    }
}
