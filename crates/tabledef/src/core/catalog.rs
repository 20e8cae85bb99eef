//! Dialect catalog for explicit dependency injection.
//!
//! The [`DialectCatalog`] is a registry of SQL dialects keyed by name.
//! Unlike a global singleton it is explicitly constructed and handed to
//! whatever binds tables, which keeps initialization deterministic and lets
//! tests register their own engines.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::traits::Dialect;
use crate::dialect::Vocabulary;
use crate::drivers::GenericDialect;
use crate::error::{Result, SchemaError};

/// Registry of SQL dialects.
///
/// # Example
///
/// ```rust,ignore
/// let mut catalog = DialectCatalog::with_builtins();
/// catalog.register_vocabulary("duckdb", Vocabulary::load("duckdb.yaml")?);
///
/// let dialect = catalog.require("duckdb")?;
/// ```
#[derive(Default)]
pub struct DialectCatalog {
    /// Registered dialects by name.
    dialects: HashMap<String, Arc<dyn Dialect>>,

    /// Alternative names resolving to a registered dialect.
    aliases: HashMap<String, String>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with the built-in engines registered.
    pub fn with_builtins() -> Self {
        use crate::drivers::{HiveDialect, PrestoDialect, RedshiftDialect, TrinoDialect};

        let mut catalog = Self::new();
        catalog.register(HiveDialect::new());
        catalog.register(PrestoDialect::new());
        catalog.register(TrinoDialect::new());
        catalog.register(RedshiftDialect::new());

        catalog.register_alias("prestodb", "presto");
        catalog.register_alias("prestosql", "trino");
        catalog.register_alias("athena", "presto");
        catalog.register_alias("spark", "hive");

        catalog
    }

    /// Register a dialect under its own name.
    pub fn register(&mut self, dialect: impl Dialect + 'static) {
        self.register_arc(Arc::new(dialect));
    }

    /// Register a dialect as an Arc (for sharing). Names are case-insensitive.
    pub fn register_arc(&mut self, dialect: Arc<dyn Dialect>) {
        debug!("Registering dialect {}", dialect.name());
        self.dialects.insert(dialect.name().to_lowercase(), dialect);
    }

    /// Register a vocabulary-only engine through [`GenericDialect`].
    pub fn register_vocabulary(&mut self, name: impl Into<String>, vocabulary: Vocabulary) {
        self.register(GenericDialect::new(name, vocabulary));
    }

    /// Make `alias` resolve to the dialect named `target`.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases
            .insert(alias.into().to_lowercase(), target.into().to_lowercase());
    }

    /// Get a dialect by name or alias (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        let name = name.to_lowercase();
        let name = self.aliases.get(&name).unwrap_or(&name);
        self.dialects.get(name).cloned()
    }

    /// Get a dialect by name, returning an error if not found.
    pub fn require(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.get(name).ok_or_else(|| {
            SchemaError::Config(format!(
                "Unknown dialect: '{}'. Supported dialects: {}",
                name,
                self.dialect_names().join(", ")
            ))
        })
    }

    /// Check if a dialect is registered.
    pub fn has_dialect(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All registered dialect names, sorted.
    pub fn dialect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SemanticType;

    #[test]
    fn test_builtins_registered() {
        let catalog = DialectCatalog::with_builtins();
        assert_eq!(
            catalog.dialect_names(),
            vec!["hive", "presto", "redshift", "trino"]
        );
        assert_eq!(catalog.require("presto").unwrap().name(), "presto");
    }

    #[test]
    fn test_aliases_and_case() {
        let catalog = DialectCatalog::with_builtins();
        assert_eq!(catalog.require("Athena").unwrap().name(), "presto");
        assert_eq!(catalog.require("PRESTOSQL").unwrap().name(), "trino");
        assert!(catalog.has_dialect("spark"));
    }

    #[test]
    fn test_unknown_dialect() {
        let catalog = DialectCatalog::with_builtins();
        let err = catalog.require("oracle").unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
        assert!(err.to_string().contains("hive, presto, redshift, trino"));
    }

    #[test]
    fn test_register_vocabulary() {
        let mut catalog = DialectCatalog::new();
        catalog.register_vocabulary(
            "duckdb",
            Vocabulary::default().with_type(SemanticType::Integer, "INTEGER"),
        );
        let dialect = catalog.require("duckdb").unwrap();
        assert_eq!(dialect.name(), "duckdb");
        assert_eq!(
            dialect.vocabulary().template(SemanticType::Integer.into()),
            Some("INTEGER")
        );
    }

    #[test]
    fn test_mixed_case_registration() {
        let mut catalog = DialectCatalog::new();
        catalog.register_vocabulary(
            "DuckDB",
            Vocabulary::default().with_type(SemanticType::Integer, "INTEGER"),
        );
        catalog.register_alias("Duck", "DUCKDB");

        assert_eq!(catalog.require("duckdb").unwrap().name(), "DuckDB");
        assert_eq!(catalog.require("DuckDB").unwrap().name(), "DuckDB");
        assert_eq!(catalog.require("duck").unwrap().name(), "DuckDB");
        assert_eq!(catalog.dialect_names(), vec!["duckdb"]);
    }
}
