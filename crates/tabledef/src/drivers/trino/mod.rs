//! Trino driver.
//!
//! - [`TrinoDialect`]: Presto wording plus external table properties

mod dialect;

pub use dialect::{external_property_entries, TrinoDialect};
