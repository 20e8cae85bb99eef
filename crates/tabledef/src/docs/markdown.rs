//! Markdown rendering of bound tables.

use crate::dialect::BoundTable;

/// Heading printed above a full document.
pub const DOCUMENT_HEADING: &str = "# Schema documentation";

const COLUMN_TABLE_HEADER: &str = "| Column name | Column Type | PII | Description |\n\
                                   | ----------- | ---- | --- | ----------- |";

/// Documentation of one table: heading, description and a column table.
///
/// Columns marked `keep: false` and columns dropped on insert never reach
/// readers of the table, so they are left out. Partition names are bold.
pub fn table_markdown(table: &BoundTable, header: &str) -> String {
    let mut out = format!(
        "{} {}\n{}\n\n{}",
        header,
        table.full_table_name(false, false, ""),
        table.description().map(str::trim).unwrap_or_default(),
        COLUMN_TABLE_HEADER
    );

    for column in table
        .all_columns()
        .iter()
        .filter(|c| c.decl().is_documented())
    {
        let name = if column.is_partition() {
            format!("**{}**", column.name())
        } else {
            column.name().to_string()
        };
        out.push_str(&format!(
            "\n| {} | `{}` | {} | {} |",
            name,
            column.column_type(),
            column.decl().pii.name.as_deref().unwrap_or_default(),
            column.comment().unwrap_or_default()
        ));
    }
    out
}

/// Tables of one schema module, documented together.
#[derive(Debug, Clone)]
pub struct ModuleDocs {
    pub name: String,
    pub description: Option<String>,
    pub tables: Vec<BoundTable>,
}

impl ModuleDocs {
    /// Section for this module; `level` 1 nests it under the document heading.
    pub fn to_markdown(&self, level: usize) -> String {
        let mut sections = vec![format!(
            "{} {}\n{}",
            "#".repeat(level + 1),
            self.name,
            self.description.as_deref().map(str::trim).unwrap_or_default()
        )];
        let header = "#".repeat(level + 2);
        sections.extend(self.tables.iter().map(|t| table_markdown(t, &header)));
        sections.join("\n")
    }
}

/// Full document over `modules`. Without a namespace heading (`ns`), module
/// sections start at the top level.
pub fn document(modules: &[ModuleDocs], ns: bool) -> String {
    let level = if ns { 0 } else { 1 };
    let mut sections = Vec::with_capacity(modules.len() + 1);
    if !ns {
        sections.push(DOCUMENT_HEADING.to_string());
    }
    sections.extend(modules.iter().map(|m| m.to_markdown(level)));
    sections.join("\n")
}
