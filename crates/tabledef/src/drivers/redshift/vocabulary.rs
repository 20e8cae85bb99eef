//! Redshift type and property vocabulary.
//!
//! Every column type except BOOLEAN requires an explicit `encode` attribute.

use crate::core::types::{PropertyKind, SemanticType};
use crate::dialect::{QuoteStyle, Vocabulary};

/// Column compression encodings Redshift accepts.
pub const COLUMN_ENCODINGS: [&str; 12] = [
    "BYTEDICT",
    "DELTA",
    "DELTA32K",
    "LZO",
    "MOSTLY8",
    "MOSTLY16",
    "MOSTLY32",
    "RAW",
    "RUNLENGTH",
    "TEXT255",
    "TEXT32K",
    "ZSTD",
];

pub fn redshift_vocabulary() -> Vocabulary {
    Vocabulary {
        table_quote: QuoteStyle::DoubleQuote,
        column_quote: QuoteStyle::DoubleQuote,
        column_setter: "{value} AS {name}".to_string(),
        sample_value_function: "MAX({c})".to_string(),
        ..Vocabulary::default()
    }
    .with_type(SemanticType::Boolean, "BOOLEAN")
    .with_type(SemanticType::Tinyint, "TINYINT")
    .with_type(SemanticType::Smallint, "SMALLINT")
    .with_type(SemanticType::Integer, "INTEGER")
    .with_type(SemanticType::Bigint, "BIGINT")
    .with_type(SemanticType::Real, "REAL")
    .with_type(SemanticType::Double, "FLOAT")
    .with_type(SemanticType::Decimal, "NUMERIC({precision},{scale})")
    .with_type(SemanticType::Varchar, "VARCHAR({length})")
    .with_type(SemanticType::Char, "CHAR({length})")
    .with_type(SemanticType::Date, "DATE")
    .with_type(SemanticType::Timestamp, "TIMESTAMP")
    .with_property(PropertyKind::Sortkey, "SORTKEY({keys:dq})")
    .with_property(PropertyKind::DistributionKey, "DISTKEY(\"{key}\")")
    .with_property(PropertyKind::DistributionStyle, "DISTSTYLE {style}")
    .requires(SemanticType::Tinyint, &["encode"])
    .requires(SemanticType::Smallint, &["encode"])
    .requires(SemanticType::Integer, &["encode"])
    .requires(SemanticType::Bigint, &["encode"])
    .requires(SemanticType::Real, &["encode"])
    .requires(SemanticType::Double, &["encode"])
    .requires(SemanticType::Decimal, &["precision", "scale", "encode"])
    .requires(SemanticType::Char, &["length", "encode"])
    .requires(SemanticType::Varchar, &["length", "encode"])
    .requires(SemanticType::Date, &["encode"])
    .requires(SemanticType::Timestamp, &["encode"])
    .requires(PropertyKind::Sortkey, &["keys"])
    .requires(PropertyKind::DistributionKey, &["key"])
    .requires(PropertyKind::DistributionStyle, &["style"])
}

/// Whether `encoding` is a known Redshift column encoding (any case).
pub fn is_known_encoding(encoding: &str) -> bool {
    COLUMN_ENCODINGS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(encoding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_required() {
        let vocabulary = redshift_vocabulary();
        assert!(vocabulary
            .required_attributes(SemanticType::Boolean.into())
            .is_empty());
        assert_eq!(
            vocabulary.required_attributes(SemanticType::Varchar.into()),
            &["length".to_string(), "encode".to_string()]
        );
        assert!(vocabulary.template(SemanticType::Array.into()).is_none());
    }

    #[test]
    fn test_known_encodings() {
        assert!(is_known_encoding("zstd"));
        assert!(is_known_encoding("MOSTLY16"));
        assert!(!is_known_encoding("az99"));
    }
}
