//! tabledef CLI - Markdown documentation and DDL from schema modules.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tabledef::docs::{self, ModuleDocs};
use tabledef::{CreateTableOptions, Dialect, DialectCatalog, SchemaError, SchemaModule, Vocabulary};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "tabledef")]
#[command(about = "Render warehouse table declarations as documentation and SQL")]
#[command(version)]
struct Cli {
    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print Markdown documentation for schema modules
    Markdown {
        /// Dialect used to render column types
        dialect: String,

        /// Schema module files (YAML)
        #[arg(required = true)]
        modules: Vec<PathBuf>,

        /// Start module headings at the top level, without a document heading
        #[arg(long)]
        ns: bool,

        /// Render with a vocabulary loaded from YAML, registered under DIALECT
        #[arg(long, value_name = "FILE")]
        vocabulary: Option<PathBuf>,
    },

    /// Print CREATE TABLE statements for every concrete table
    Ddl {
        /// Target dialect
        dialect: String,

        /// Schema module files (YAML)
        #[arg(required = true)]
        modules: Vec<PathBuf>,

        /// Override the schema of every table (defaults to the module name)
        #[arg(long, value_name = "NAME")]
        schema: Option<String>,

        /// Render with a vocabulary loaded from YAML, registered under DIALECT
        #[arg(long, value_name = "FILE")]
        vocabulary: Option<PathBuf>,
    },

    /// List registered dialects
    Dialects,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), SchemaError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    match cli.command {
        Commands::Markdown {
            dialect,
            modules,
            ns,
            vocabulary,
        } => {
            let dialect = resolve_dialect(&dialect, vocabulary.as_deref())?;
            let mut documented = Vec::with_capacity(modules.len());
            for module in load_modules(&modules)? {
                documented.push(ModuleDocs {
                    name: module.name().to_string(),
                    description: module.description.clone(),
                    tables: module.bind_all(dialect.clone())?,
                });
            }
            println!("{}", docs::document(&documented, ns));
        }

        Commands::Ddl {
            dialect,
            modules,
            schema,
            vocabulary,
        } => {
            let dialect = resolve_dialect(&dialect, vocabulary.as_deref())?;
            let mut statements = Vec::new();
            for mut module in load_modules(&modules)? {
                if let Some(schema) = &schema {
                    module.name = Some(schema.clone());
                }
                for table in module.bind_all(dialect.clone())? {
                    statements.push(table.create_table(&CreateTableOptions::default()));
                }
            }
            info!("Rendered {} CREATE TABLE statements", statements.len());
            println!("{}", statements.join("\n\n"));
        }

        Commands::Dialects => {
            for name in DialectCatalog::with_builtins().dialect_names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

/// Look up `name` in the built-in catalog, or register `vocabulary` under it.
fn resolve_dialect(name: &str, vocabulary: Option<&Path>) -> Result<Arc<dyn Dialect>, SchemaError> {
    let mut catalog = DialectCatalog::with_builtins();
    if let Some(path) = vocabulary {
        catalog.register_vocabulary(name.to_lowercase(), Vocabulary::load(path)?);
        info!("Loaded vocabulary for {} from {:?}", name, path);
    }
    catalog.require(name)
}

/// Load schema modules in argument order. Files named `__*` are skipped.
fn load_modules(paths: &[PathBuf]) -> Result<Vec<SchemaModule>, SchemaError> {
    let mut modules = Vec::with_capacity(paths.len());
    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.starts_with("__") {
            debug!("Skipping {:?}", path);
            continue;
        }
        modules.push(SchemaModule::load(path)?);
    }
    Ok(modules)
}

/// Logs go to stderr so stdout carries only rendered output.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
