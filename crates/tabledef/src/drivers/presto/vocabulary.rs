//! Presto type and property vocabulary.

use crate::core::types::{PropertyKind, SemanticType};
use crate::dialect::{QuoteStyle, Vocabulary};

/// Vocabulary shared by Presto and Trino.
pub fn presto_vocabulary() -> Vocabulary {
    Vocabulary {
        table_quote: QuoteStyle::DoubleQuote,
        column_quote: QuoteStyle::DoubleQuote,
        column_setter: "{value} AS {name}".to_string(),
        row_field_template: "{quoted_name} {type}".to_string(),
        sample_value_function: "ARBITRARY({c})".to_string(),
        ..Vocabulary::default()
    }
    .with_type(SemanticType::Boolean, "BOOLEAN")
    .with_type(SemanticType::Tinyint, "TINYINT")
    .with_type(SemanticType::Smallint, "SMALLINT")
    .with_type(SemanticType::Integer, "INTEGER")
    .with_type(SemanticType::Bigint, "BIGINT")
    .with_type(SemanticType::Real, "REAL")
    .with_type(SemanticType::Double, "DOUBLE")
    .with_type(SemanticType::Decimal, "DECIMAL({precision},{scale})")
    .with_type(SemanticType::Varchar, "VARCHAR[[({length})]]")
    .with_type(SemanticType::Char, "CHAR({length})")
    .with_type(SemanticType::Varbinary, "VARBINARY({length})")
    .with_type(SemanticType::Json, "JSON")
    .with_type(SemanticType::Date, "DATE")
    .with_type(SemanticType::Time, "TIME")
    .with_type(SemanticType::Timestamp, "TIMESTAMP")
    .with_type(SemanticType::Array, "ARRAY({element})")
    .with_type(SemanticType::Map, "MAP({key_type}, {value_type})")
    .with_type(SemanticType::Row, "ROW({fields})")
    .with_type(SemanticType::IpAddress, "IPADDRESS")
    .with_property(PropertyKind::Format, "format = '{format}'")
    .with_property(
        PropertyKind::Bucket,
        "bucketed_by = ARRAY[{by:sq}], bucket_count = {count}",
    )
    .requires(SemanticType::Decimal, &["precision", "scale"])
    .requires(SemanticType::Char, &["length"])
    .requires(SemanticType::Varbinary, &["length"])
    .requires(PropertyKind::Format, &["format"])
    .requires(PropertyKind::Bucket, &["by", "count"])
}
