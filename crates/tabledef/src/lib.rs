//! # tabledef
//!
//! Declare warehouse table shapes once, render dialect-specific SQL.
//!
//! This library turns abstract table declarations into statements for
//! several warehouse engines:
//!
//! - **Table shapes** with ordered columns, partitions, properties and policies
//! - **Dialect binding** that validates every declaration against an engine's
//!   vocabulary before any SQL is produced
//! - **Statement builders** for DDL, DML, views and partition management
//! - **PII handling** on insert and on partition anonymisation
//! - **Markdown documentation** generated from the same declarations
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabledef::{CreateTableOptions, DialectCatalog, SchemaModule};
//!
//! fn main() -> tabledef::Result<()> {
//!     let module = SchemaModule::load("analytics.yaml")?;
//!     let presto = DialectCatalog::with_builtins().require("presto")?;
//!     for table in module.bind_all(presto)? {
//!         println!("{}", table.create_table(&CreateTableOptions::default()));
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod docs;
pub mod drivers;
pub mod error;

// Re-exports for convenient access
pub use crate::config::{ColumnConfig, PiiRef, SchemaModule, TableConfig};
pub use crate::core::{
    AttrValue, ColumnDecl, ColumnFilter, CreateTableOptions, DeclarationSequence, DeleteOptions,
    Dialect, DialectCatalog, InsertOptions, InsertSource, PartitionScope, PiiPolicy, PolicyKind,
    PropertyKind, SelectOptions, SemanticType, StagingOptions, TableInstance, TablePolicy,
    TableProperty, TableShape, UpsertOptions, ViewOptions,
};
pub use crate::dialect::{BoundColumn, BoundTable, Vocabulary};
pub use crate::docs::ModuleDocs;
pub use crate::drivers::{GenericDialect, HiveDialect, PrestoDialect, RedshiftDialect, TrinoDialect};
pub use crate::error::{Result, SchemaError};
