//! Core abstractions for engine-independent table declarations.
//!
//! - [`types`]: semantic column types and property kinds
//! - [`column`] / [`property`] / [`pii`]: declarations and their attributes
//! - [`prototype`]: table shapes and their validated blueprints
//! - [`table`]: schema-bound table instances
//! - [`policy`]: retention and anonymisation policies
//! - [`traits`]: the [`Dialect`] strategy and statement options
//! - [`catalog`]: dialect registry for dependency injection
//!
//! # Architecture
//!
//! Declarations never mention an engine. Engine knowledge lives in the
//! driver modules (`drivers/hive`, `drivers/presto`, ...) as a vocabulary
//! plus a `Dialect` implementation, and meets the declarations only when a
//! table instance is bound.
//!
//! # Design Patterns
//!
//! - **Builder**: `TableShapeBuilder` assigns declaration order and
//!   validates column names
//! - **Strategy**: `Dialect` provides interchangeable SQL wording
//! - **Template Method**: default trait methods define statement skeletons

pub mod attributes;
pub mod catalog;
pub mod column;
pub mod naming;
pub mod pii;
pub mod policy;
pub mod property;
pub mod prototype;
pub mod sequence;
pub mod table;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use attributes::{AttrValue, Attributes};
pub use catalog::DialectCatalog;
pub use column::{ColumnDecl, ColumnFilter, ColumnKind};
pub use pii::PiiPolicy;
pub use policy::{PolicyKind, TablePolicy};
pub use property::{ExternalTableProperties, TableProperty};
pub use prototype::{Prototype, TableShape, TableShapeBuilder};
pub use sequence::DeclarationSequence;
pub use table::TableInstance;
pub use traits::{
    CreateTableOptions, DeleteOptions, Dialect, InsertOptions, InsertSource, PartitionScope,
    SelectOptions, StagingOptions, UpsertOptions, ViewOptions,
};
pub use types::{DeclarationClass, LifecycleEvent, PropertyKind, SemanticType};
