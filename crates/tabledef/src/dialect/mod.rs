//! Dialect binding.
//!
//! This module turns engine-independent declarations into engine-specific
//! SQL fragments:
//!
//! - [`vocabulary`]: per-engine lookup tables (type templates, property
//!   templates, required attributes, quoting)
//! - [`template`]: the two template passes
//! - [`binder`]: binding of single columns and properties
//! - [`bound`]: tables bound to a dialect, the entry point for statements
//!
//! # Usage
//!
//! ```rust,ignore
//! let catalog = DialectCatalog::with_builtins();
//! let table = TableInstance::empty(shape, "analytics")?
//!     .bind(catalog.require("presto")?)?;
//! println!("{}", table.select(&SelectOptions::default()));
//! ```

pub mod binder;
pub mod bound;
pub mod template;
pub mod vocabulary;

pub use binder::{bind_column, bind_property, BoundColumn, BoundProperty};
pub use bound::BoundTable;
pub use vocabulary::{QuoteStyle, Vocabulary};
