//! Presto driver.
//!
//! - [`PrestoDialect`]: SQL wording for Presto
//! - [`presto_vocabulary`]: type and property templates, shared with Trino

mod dialect;
mod vocabulary;

pub use dialect::PrestoDialect;
pub use vocabulary::presto_vocabulary;
