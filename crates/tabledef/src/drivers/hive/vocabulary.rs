//! Hive type and property vocabulary.

use crate::core::types::{PropertyKind, SemanticType};
use crate::dialect::{QuoteStyle, Vocabulary};

/// Hive has no TIME type; JSON and IP addresses are stored as strings.
pub fn hive_vocabulary() -> Vocabulary {
    Vocabulary {
        table_quote: QuoteStyle::Backtick,
        column_quote: QuoteStyle::Backtick,
        column_setter: "{value} {name}".to_string(),
        row_field_template: "{quoted_name} : {type}".to_string(),
        sample_value_function: "MAX({c})".to_string(),
        ..Vocabulary::default()
    }
    .with_type(SemanticType::Boolean, "BOOLEAN")
    .with_type(SemanticType::Tinyint, "TINYINT")
    .with_type(SemanticType::Smallint, "SMALLINT")
    .with_type(SemanticType::Integer, "INT")
    .with_type(SemanticType::Bigint, "BIGINT")
    .with_type(SemanticType::Real, "FLOAT")
    .with_type(SemanticType::Double, "DOUBLE")
    .with_type(SemanticType::Decimal, "DECIMAL({precision},{scale})")
    .with_type(SemanticType::Varchar, "STRING[[({length})]]")
    .with_type(SemanticType::Char, "CHAR({length})")
    .with_type(SemanticType::Varbinary, "BINARY({length})")
    .with_type(SemanticType::Json, "STRING")
    .with_type(SemanticType::Date, "DATE")
    .with_type(SemanticType::Timestamp, "TIMESTAMP")
    .with_type(SemanticType::Array, "ARRAY<{element}>")
    .with_type(SemanticType::Map, "MAP<{key_type}, {value_type}>")
    .with_type(SemanticType::Row, "STRUCT<{fields}>")
    .with_type(SemanticType::IpAddress, "STRING")
    .with_property(PropertyKind::Format, "STORED AS {format}")
    .with_property(
        PropertyKind::Bucket,
        "CLUSTERED BY ({by}) INTO {count} BUCKETS",
    )
    .requires(SemanticType::Decimal, &["precision", "scale"])
    .requires(SemanticType::Char, &["length"])
    .requires(SemanticType::Varbinary, &["length"])
    .requires(PropertyKind::Format, &["format"])
    .requires(PropertyKind::Bucket, &["by", "count"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_time_type() {
        let vocabulary = hive_vocabulary();
        assert!(vocabulary.template(SemanticType::Time.into()).is_none());
        assert_eq!(
            vocabulary.template(SemanticType::Json.into()),
            Some("STRING")
        );
        assert_eq!(vocabulary.quote_column("id"), "`id`");
    }
}
