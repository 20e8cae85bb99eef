//! Error types for schema declaration, dialect binding and rendering.

use thiserror::Error;

/// Exit code for configuration and declaration-file errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for invalid table shapes (no columns, bad names, ...).
pub const EXIT_DECLARATION_ERROR: u8 = 2;
/// Exit code for dialect binding failures.
pub const EXIT_BINDING_ERROR: u8 = 3;
/// Exit code for statements an engine cannot express.
pub const EXIT_UNSUPPORTED_STATEMENT: u8 = 4;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for declaration and binding operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A table shape was instantiated without ever declaring a prototype.
    #[error("Prototype declaration is required for table shape {0}")]
    PrototypeRequired(String),

    /// A prototype was built with zero columns.
    #[error("Prototype requires at least one column")]
    ColumnRequired,

    /// A declared column lacks a name.
    #[error("Column name is required{}", context_suffix(.0))]
    ColumnNameRequired(Option<String>),

    /// Two declared columns share a name.
    #[error("Column name must be unique: {0}")]
    ColumnNameNotUnique(String),

    /// A column or property is missing attributes its dialect type requires.
    #[error("{declaration} - following attributes are required by {dialect}: {}", .missing.join(", "))]
    AttributesMissing {
        declaration: String,
        dialect: String,
        missing: Vec<String>,
    },

    /// A column or property class has no rendering in the target dialect.
    #[error("{declaration} ({class}) is not supported by dialect {dialect}")]
    UnsupportedDialect {
        declaration: String,
        class: String,
        dialect: String,
    },

    /// A value was assigned to a column the table does not have.
    #[error("Table {table} has no column named {column}")]
    UnknownColumn { table: String, column: String },

    /// A policy cannot be resolved with the data it was declared with.
    #[error("Policy {policy} cannot be resolved: {reason}")]
    PolicyIncomplete { policy: String, reason: String },

    /// The dialect has no way to express the requested statement.
    #[error("{statement} is not supported by dialect {dialect}")]
    UnsupportedStatement { statement: String, dialect: String },

    /// Declaration file or vocabulary configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!(" ({})", ctx),
        None => String::new(),
    }
}

impl SchemaError {
    /// Create an AttributesMissing error.
    pub fn attributes_missing(
        declaration: impl Into<String>,
        dialect: impl Into<String>,
        missing: Vec<String>,
    ) -> Self {
        SchemaError::AttributesMissing {
            declaration: declaration.into(),
            dialect: dialect.into(),
            missing,
        }
    }

    /// Create an UnsupportedDialect error.
    pub fn unsupported_dialect(
        declaration: impl Into<String>,
        class: impl Into<String>,
        dialect: impl Into<String>,
    ) -> Self {
        SchemaError::UnsupportedDialect {
            declaration: declaration.into(),
            class: class.into(),
            dialect: dialect.into(),
        }
    }

    /// Create an UnsupportedStatement error.
    pub fn unsupported_statement(statement: impl Into<String>, dialect: impl Into<String>) -> Self {
        SchemaError::UnsupportedStatement {
            statement: statement.into(),
            dialect: dialect.into(),
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            SchemaError::Config(_) | SchemaError::Yaml(_) | SchemaError::Json(_) => {
                EXIT_CONFIG_ERROR
            }
            SchemaError::PrototypeRequired(_)
            | SchemaError::ColumnRequired
            | SchemaError::ColumnNameRequired(_)
            | SchemaError::ColumnNameNotUnique(_)
            | SchemaError::UnknownColumn { .. }
            | SchemaError::PolicyIncomplete { .. } => EXIT_DECLARATION_ERROR,
            SchemaError::AttributesMissing { .. } | SchemaError::UnsupportedDialect { .. } => {
                EXIT_BINDING_ERROR
            }
            SchemaError::UnsupportedStatement { .. } => EXIT_UNSUPPORTED_STATEMENT,
            SchemaError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_missing_message_names_attributes() {
        let err = SchemaError::attributes_missing(
            "price",
            "presto",
            vec!["precision".to_string(), "scale".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "price - following attributes are required by presto: precision, scale"
        );
        assert_eq!(err.exit_code(), EXIT_BINDING_ERROR);
    }

    #[test]
    fn test_column_name_required_context() {
        assert_eq!(
            SchemaError::ColumnNameRequired(None).to_string(),
            "Column name is required"
        );
        assert_eq!(
            SchemaError::ColumnNameRequired(Some("row location".into())).to_string(),
            "Column name is required (row location)"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(SchemaError::ColumnRequired.exit_code(), EXIT_DECLARATION_ERROR);
        assert_eq!(
            SchemaError::Config("bad".into()).exit_code(),
            EXIT_CONFIG_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(SchemaError::from(io).exit_code(), EXIT_IO_ERROR);
        assert_eq!(
            SchemaError::unsupported_statement("INSERT OVERWRITE", "presto").exit_code(),
            EXIT_UNSUPPORTED_STATEMENT
        );
    }

    #[test]
    fn test_format_detailed() {
        let err = SchemaError::unsupported_dialect("tags", "Array", "redshift");
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: tags (Array) is not supported by dialect redshift"));
    }
}
