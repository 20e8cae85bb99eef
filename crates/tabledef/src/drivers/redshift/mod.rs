//! Redshift driver.
//!
//! - [`RedshiftDialect`]: SQL wording for Redshift, plus S3 COPY/UNLOAD,
//!   Spectrum tables, delete-upsert and materialized views
//! - [`redshift_vocabulary`]: type and property templates with `encode`
//!   requirements

mod dialect;
mod vocabulary;

pub use dialect::{ExternalTableOptions, RedshiftDialect};
pub use vocabulary::{is_known_encoding, redshift_vocabulary, COLUMN_ENCODINGS};
