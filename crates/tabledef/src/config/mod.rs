//! Declaration file loading and validation.
//!
//! A declaration file describes one schema module in YAML:
//!
//! ```yaml
//! description: Web analytics.
//! pii:
//!   email: { name: EMAIL, transform_on_insert: "SHA256({quoted_name})" }
//! tables:
//!   - name: PageView
//!     columns:
//!       - { name: id, type: bigint }
//!       - { name: email, type: varchar, pii: email }
//!       - { name: ds, type: varchar, partition: true }
//!     properties:
//!       - { kind: format, attributes: { format: ORC } }
//! ```

mod types;
mod validation;

pub use types::*;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::column::ColumnDecl;
use crate::core::pii::PiiPolicy;
use crate::core::prototype::TableShape;
use crate::core::sequence::DeclarationSequence;
use crate::core::table::TableInstance;
use crate::core::traits::Dialect;
use crate::core::types::SemanticType;
use crate::dialect::BoundTable;
use crate::error::{Result, SchemaError};

/// Schema used for modules that were neither named nor loaded from a file.
pub const DEFAULT_MODULE_NAME: &str = "default";

impl SchemaModule {
    /// Load a module from a YAML file, naming it after the file stem unless
    /// the file names it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut module = Self::from_yaml(&content)?;
        if module.name.is_none() {
            module.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        debug!(
            "Loaded schema module {} from {} ({} tables)",
            module.name(),
            path.display(),
            module.tables.len()
        );
        Ok(module)
    }

    /// Parse a module from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let module: SchemaModule = serde_yaml::from_str(yaml)?;
        module.validate()?;
        Ok(module)
    }

    /// Validate the module.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Module name, which is also the schema of its tables.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_MODULE_NAME)
    }

    /// Build every declared shape, abstract ones included, in declaration
    /// order. All shapes share one declaration sequence.
    pub fn shapes(&self) -> Result<Vec<Arc<TableShape>>> {
        let sequence = DeclarationSequence::new();
        let mut built: HashMap<&str, Arc<TableShape>> = HashMap::new();
        let mut shapes = Vec::with_capacity(self.tables.len());

        for table in &self.tables {
            let mut builder = TableShape::builder(table.name.clone(), &sequence);
            if let Some(base) = &table.extends {
                let base = built.get(base.as_str()).ok_or_else(|| {
                    SchemaError::Config(format!(
                        "{}.extends: unknown table '{}'",
                        table.name, base
                    ))
                })?;
                builder = builder.extends(base);
            }
            if let Some(description) = &table.description {
                builder = builder.description(description.clone());
            }
            if let Some(prefix) = &table.prefix {
                builder = builder.prefix(prefix.clone());
            }
            if table.is_abstract {
                builder = builder.abstract_shape();
            }
            for column in &table.columns {
                builder = builder.column(column.to_decl(&self.pii)?);
            }
            for property in &table.properties {
                builder = builder.property(property.clone());
            }
            for policy in &table.policies {
                builder = builder.policy(policy.clone());
            }

            let shape = Arc::new(builder.build()?);
            built.insert(table.name.as_str(), shape.clone());
            shapes.push(shape);
        }

        Ok(shapes)
    }

    /// Instantiate every non-abstract table in this module's schema.
    pub fn instances(&self) -> Result<Vec<TableInstance>> {
        let schema = self.name();
        self.tables
            .iter()
            .zip(self.shapes()?)
            .filter(|(config, _)| !config.is_abstract)
            .map(|(_, shape)| TableInstance::empty(shape, schema))
            .collect()
    }

    /// Instantiate and bind every non-abstract table to `dialect`.
    pub fn bind_all(&self, dialect: Arc<dyn Dialect>) -> Result<Vec<BoundTable>> {
        self.instances()?
            .into_iter()
            .map(|instance| instance.bind(dialect.clone()))
            .collect()
    }
}

impl ColumnConfig {
    /// Convert into a column declaration, resolving named PII categories.
    pub fn to_decl(&self, categories: &BTreeMap<String, PiiPolicy>) -> Result<ColumnDecl> {
        let mut decl = match self.semantic_type {
            SemanticType::Array => ColumnDecl::array(
                self.name.clone(),
                self.nested(&self.element, "element")?.to_decl(categories)?,
            ),
            SemanticType::Map => ColumnDecl::map(
                self.name.clone(),
                self.nested(&self.key_type, "key_type")?.to_decl(categories)?,
                self.nested(&self.value_type, "value_type")?
                    .to_decl(categories)?,
            ),
            SemanticType::Row => ColumnDecl::row(
                self.name.clone(),
                self.fields
                    .iter()
                    .map(|f| f.to_decl(categories))
                    .collect::<Result<Vec<_>>>()?,
            ),
            scalar => ColumnDecl::new(self.name.clone(), scalar),
        };

        decl.attributes = self.attributes.clone();
        decl.comment = self.comment.clone();
        decl.default_value = self.default_value.clone();
        decl.is_partition = self.partition;
        decl.value = self.value.clone();
        decl.pii = match &self.pii {
            None => PiiPolicy::default(),
            Some(PiiRef::Inline(policy)) => policy.clone(),
            Some(PiiRef::Named(name)) => {
                let mut policy = categories.get(name).cloned().ok_or_else(|| {
                    SchemaError::Config(format!(
                        "{}.pii: unknown PII category '{}'",
                        self.name, name
                    ))
                })?;
                // Unlabelled categories are labelled by their key.
                if policy.name.is_none() {
                    policy.name = Some(name.clone());
                }
                policy
            }
        };
        Ok(decl)
    }

    fn nested<'a>(
        &self,
        nested: &'a Option<Box<ColumnConfig>>,
        field: &str,
    ) -> Result<&'a ColumnConfig> {
        nested.as_deref().ok_or_else(|| {
            SchemaError::Config(format!(
                "{}: {} columns require '{}'",
                self.name, self.semantic_type, field
            ))
        })
    }
}
