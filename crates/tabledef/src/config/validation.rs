//! Declaration file validation.

use std::collections::HashSet;

use super::{ColumnConfig, PiiRef, SchemaModule};
use crate::core::types::SemanticType;
use crate::error::{Result, SchemaError};

/// Validate a schema module before it is turned into table shapes.
pub fn validate(module: &SchemaModule) -> Result<()> {
    let mut declared: HashSet<&str> = HashSet::new();

    for (i, table) in module.tables.iter().enumerate() {
        if table.name.trim().is_empty() {
            return Err(SchemaError::Config(format!("tables[{}].name is required", i)));
        }
        if declared.contains(table.name.as_str()) {
            return Err(SchemaError::Config(format!(
                "tables[{}]: table name must be unique, got '{}'",
                i, table.name
            )));
        }
        if let Some(base) = &table.extends {
            if !declared.contains(base.as_str()) {
                return Err(SchemaError::Config(format!(
                    "{}.extends: '{}' must name a table declared earlier in the module",
                    table.name, base
                )));
            }
        }

        let mut columns: HashSet<&str> = HashSet::new();
        for column in &table.columns {
            let path = format!("{}.{}", table.name, column.name);
            if column.name.trim().is_empty() {
                return Err(SchemaError::Config(format!(
                    "{}.columns: column name is required",
                    table.name
                )));
            }
            if !columns.insert(column.name.as_str()) {
                return Err(SchemaError::Config(format!(
                    "{}: column declared twice",
                    path
                )));
            }
            validate_column(module, column, &path)?;
        }

        declared.insert(table.name.as_str());
    }

    Ok(())
}

fn validate_column(module: &SchemaModule, column: &ColumnConfig, path: &str) -> Result<()> {
    if let Some(PiiRef::Named(name)) = &column.pii {
        if !module.pii.contains_key(name) {
            return Err(SchemaError::Config(format!(
                "{}.pii: unknown PII category '{}'",
                path, name
            )));
        }
    }

    let has_element = column.element.is_some();
    let has_map = column.key_type.is_some() || column.value_type.is_some();
    let has_fields = !column.fields.is_empty();

    match column.semantic_type {
        SemanticType::Array => {
            if !has_element {
                return Err(SchemaError::Config(format!(
                    "{}: array columns require 'element'",
                    path
                )));
            }
        }
        SemanticType::Map => {
            if column.key_type.is_none() || column.value_type.is_none() {
                return Err(SchemaError::Config(format!(
                    "{}: map columns require 'key_type' and 'value_type'",
                    path
                )));
            }
        }
        SemanticType::Row => {
            if !has_fields {
                return Err(SchemaError::Config(format!(
                    "{}: row columns require at least one field",
                    path
                )));
            }
        }
        other => {
            if has_element || has_map || has_fields {
                return Err(SchemaError::Config(format!(
                    "{}: nested declarations are only allowed on array, map and row columns, not {}",
                    path, other
                )));
            }
        }
    }

    let nested = column
        .element
        .iter()
        .chain(column.key_type.iter())
        .chain(column.value_type.iter())
        .map(|c| c.as_ref())
        .chain(column.fields.iter());
    for child in nested {
        if child.partition {
            return Err(SchemaError::Config(format!(
                "{}: nested declarations cannot be partitions",
                path
            )));
        }
        let child_path = if child.name.is_empty() {
            format!("{}.<{}>", path, child.semantic_type)
        } else {
            format!("{}.{}", path, child.name)
        };
        validate_column(module, child, &child_path)?;
    }

    Ok(())
}
