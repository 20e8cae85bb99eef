//! Hive driver.
//!
//! - [`HiveDialect`]: SQL wording for Hive, plus `MSCK REPAIR TABLE` and
//!   partition registration
//! - [`hive_vocabulary`]: type and property templates

mod dialect;
mod vocabulary;

pub use dialect::HiveDialect;
pub use vocabulary::hive_vocabulary;
