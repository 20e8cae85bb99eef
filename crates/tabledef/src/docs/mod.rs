//! Documentation generation.
//!
//! Renders bound tables as Markdown: a heading per table, its description
//! and a column table listing names, rendered types, PII categories and
//! comments.

mod markdown;

pub use markdown::{document, table_markdown, ModuleDocs, DOCUMENT_HEADING};
