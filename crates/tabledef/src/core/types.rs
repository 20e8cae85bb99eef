//! Abstract type vocabulary shared by every dialect.
//!
//! Column declarations carry a [`SemanticType`] and table properties carry a
//! [`PropertyKind`]. Dialect vocabularies are keyed by these enums, so the
//! same declaration can be rendered by any engine that registers a template
//! for its class.
//!
//! ```text
//! Declaration  →  SemanticType  →  Dialect template
//!   Decimal    →    Decimal     →  DECIMAL({precision},{scale})   (Presto)
//!   Decimal    →    Decimal     →  NUMERIC({precision},{scale})   (Redshift)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Abstract column type, independent of any engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    // ===== Boolean =====
    Boolean,

    // ===== Integer Types =====
    Tinyint,
    Smallint,
    Integer,
    Bigint,

    // ===== Floating Point / Exact Numeric =====
    Real,
    Double,
    /// Exact decimal. Most engines require `precision` and `scale`.
    Decimal,

    // ===== String / Binary =====
    Varchar,
    Char,
    Varbinary,
    Json,

    // ===== Date/Time =====
    Date,
    Time,
    Timestamp,

    // ===== Composite =====
    /// Array of a nested element declaration.
    Array,
    /// Map from a nested key declaration to a nested value declaration.
    Map,
    /// Struct of ordered, named nested field declarations.
    Row,

    // ===== Network =====
    #[serde(alias = "ipaddress")]
    IpAddress,
}

impl SemanticType {
    /// All semantic types, in vocabulary order.
    pub const ALL: [SemanticType; 19] = [
        SemanticType::Boolean,
        SemanticType::Tinyint,
        SemanticType::Smallint,
        SemanticType::Integer,
        SemanticType::Bigint,
        SemanticType::Real,
        SemanticType::Double,
        SemanticType::Decimal,
        SemanticType::Varchar,
        SemanticType::Char,
        SemanticType::Varbinary,
        SemanticType::Json,
        SemanticType::Date,
        SemanticType::Time,
        SemanticType::Timestamp,
        SemanticType::Array,
        SemanticType::Map,
        SemanticType::Row,
        SemanticType::IpAddress,
    ];

    /// Whether this type owns nested column declarations.
    pub fn is_composite(&self) -> bool {
        matches!(self, SemanticType::Array | SemanticType::Map | SemanticType::Row)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Boolean => "Boolean",
            SemanticType::Tinyint => "Tinyint",
            SemanticType::Smallint => "Smallint",
            SemanticType::Integer => "Integer",
            SemanticType::Bigint => "Bigint",
            SemanticType::Real => "Real",
            SemanticType::Double => "Double",
            SemanticType::Decimal => "Decimal",
            SemanticType::Varchar => "Varchar",
            SemanticType::Char => "Char",
            SemanticType::Varbinary => "Varbinary",
            SemanticType::Json => "JSON",
            SemanticType::Date => "Date",
            SemanticType::Time => "Time",
            SemanticType::Timestamp => "Timestamp",
            SemanticType::Array => "Array",
            SemanticType::Map => "Map",
            SemanticType::Row => "Row",
            SemanticType::IpAddress => "IPAddress",
        };
        f.write_str(name)
    }
}

/// Kind of table-level property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Storage format (ORC, PARQUET, ...).
    Format,
    /// Bucketing columns and bucket count.
    Bucket,
    /// Sort key columns.
    Sortkey,
    /// Distribution key column.
    DistributionKey,
    /// Distribution style (EVEN, KEY, ALL, AUTO).
    DistributionStyle,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Format => "Format",
            PropertyKind::Bucket => "Bucket",
            PropertyKind::Sortkey => "Sortkey",
            PropertyKind::DistributionKey => "DistributionKey",
            PropertyKind::DistributionStyle => "DistributionStyle",
        };
        f.write_str(name)
    }
}

/// Key of the required-attribute lookup table.
///
/// Columns and properties share one required-attribute table per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationClass {
    Column(SemanticType),
    Property(PropertyKind),
}

impl fmt::Display for DeclarationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationClass::Column(t) => write!(f, "{}", t),
            DeclarationClass::Property(p) => write!(f, "{}", p),
        }
    }
}

impl From<SemanticType> for DeclarationClass {
    fn from(t: SemanticType) -> Self {
        DeclarationClass::Column(t)
    }
}

impl From<PropertyKind> for DeclarationClass {
    fn from(p: PropertyKind) -> Self {
        DeclarationClass::Property(p)
    }
}

/// Lifecycle event a PII rule is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Insert,
    Delete,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Insert => f.write_str("insert"),
            LifecycleEvent::Delete => f.write_str("delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_types() {
        let composite: Vec<_> = SemanticType::ALL
            .iter()
            .filter(|t| t.is_composite())
            .collect();
        assert_eq!(
            composite,
            vec![&SemanticType::Array, &SemanticType::Map, &SemanticType::Row]
        );
    }

    #[test]
    fn test_semantic_type_yaml_names() {
        let t: SemanticType = serde_yaml::from_str("ip_address").unwrap();
        assert_eq!(t, SemanticType::IpAddress);
        let t: SemanticType = serde_yaml::from_str("ipaddress").unwrap();
        assert_eq!(t, SemanticType::IpAddress);
        let t: SemanticType = serde_yaml::from_str("varchar").unwrap();
        assert_eq!(t, SemanticType::Varchar);
    }

    #[test]
    fn test_declaration_class_display() {
        assert_eq!(DeclarationClass::from(SemanticType::Json).to_string(), "JSON");
        assert_eq!(
            DeclarationClass::from(PropertyKind::DistributionKey).to_string(),
            "DistributionKey"
        );
    }
}
