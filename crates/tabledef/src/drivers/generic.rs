//! Vocabulary-only dialect.
//!
//! Engines whose statements follow the default wording only need a
//! vocabulary, which can be loaded from YAML:
//!
//! ```yaml
//! type_templates:
//!   integer: INTEGER
//!   varchar: "VARCHAR[[({length})]]"
//! table_quote: double_quote
//! ```

use std::path::Path;

use crate::core::traits::Dialect;
use crate::dialect::Vocabulary;
use crate::error::Result;

/// Dialect rendering every statement with the default wording.
#[derive(Debug, Clone)]
pub struct GenericDialect {
    name: String,
    vocabulary: Vocabulary,
}

impl GenericDialect {
    pub fn new(name: impl Into<String>, vocabulary: Vocabulary) -> Self {
        Self {
            name: name.into(),
            vocabulary,
        }
    }

    /// Load the vocabulary from a YAML file; the dialect is named after the
    /// file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "generic".to_string());
        Ok(Self::new(name, Vocabulary::load(path)?))
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &str {
        &self.name
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::core::column::ColumnDecl;
    use crate::core::prototype::TableShape;
    use crate::core::sequence::DeclarationSequence;
    use crate::core::table::TableInstance;
    use crate::core::traits::CreateTableOptions;
    use crate::core::types::SemanticType;

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duckdb.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "type_templates:\n  integer: INTEGER\n  varchar: \"TEXT[[({{length}})]]\"\n"
        )
        .unwrap();

        let dialect = GenericDialect::load(&path).unwrap();
        assert_eq!(dialect.name(), "duckdb");

        let seq = DeclarationSequence::new();
        let shape = TableShape::builder("Users", &seq)
            .column(ColumnDecl::new("id", SemanticType::Integer))
            .column(ColumnDecl::new("name", SemanticType::Varchar).attr("length", 40))
            .build()
            .unwrap();
        let table = TableInstance::empty(Arc::new(shape), "main")
            .unwrap()
            .bind(Arc::new(dialect))
            .unwrap();
        assert_eq!(
            table.create_table(&CreateTableOptions::default()),
            "CREATE TABLE IF NOT EXISTS \"main\".\"users\" (\n  \"id\" INTEGER,\n  \"name\" TEXT(40)\n)"
        );
    }

    #[test]
    fn test_load_missing_file() {
        assert!(GenericDialect::load("/nonexistent/vocab.yaml").is_err());
    }
}
