//! Warehouse engine implementations.
//!
//! This module provides engine-specific implementations of the
//! [`Dialect`] trait:
//!
//! - [`hive`]: Hive (backtick quoting, `PARTITIONED BY`, `ALTER TABLE`
//!   partition management)
//! - [`presto`]: Presto (`WITH (...)` table options)
//! - [`trino`]: Trino (Presto plus external table properties)
//! - [`redshift`]: Redshift (column encodings, S3 COPY/UNLOAD)
//! - [`generic`]: any engine described by a vocabulary alone
//!
//! # Architecture
//!
//! Each driver module pairs:
//! - a vocabulary function (type and property templates, data only)
//! - a `Dialect` implementation overriding only the statements whose
//!   wording differs from the trait defaults
//!
//! Statements that exist for a single engine are inherent methods on that
//! engine's dialect and take the bound table as an argument.
//!
//! # Adding New Engines
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/snowflake/`)
//! 2. Write its vocabulary and implement `Dialect`
//! 3. Register it in `DialectCatalog::with_builtins()`

pub mod generic;
pub mod hive;
pub mod presto;
pub mod redshift;
pub mod trino;

pub use generic::GenericDialect;
pub use hive::HiveDialect;
pub use presto::PrestoDialect;
pub use redshift::RedshiftDialect;
pub use trino::TrinoDialect;

use crate::core::traits::Dialect;
use crate::dialect::BoundTable;
use crate::error::{Result, SchemaError};

/// Engine-specific statements only render tables bound to that engine.
pub(crate) fn ensure_bound_to(
    dialect: &dyn Dialect,
    table: &BoundTable,
    statement: &str,
) -> Result<()> {
    if table.dialect().name() == dialect.name() {
        Ok(())
    } else {
        Err(SchemaError::unsupported_statement(
            statement,
            table.dialect().name(),
        ))
    }
}
