use clap::{Parser, Subcommand};

use formtree::Result;
use formtree::diagnostics;
use formtree::export::{EXPORT_FILE_NAME, ExportDocument};
use formtree::field::{IdAllocator, raw::load_forest};
use formtree::registry::FieldTypeRegistry;
use formtree::render::{RenderInput, RendererConfig, reconcile_data};
use formtree::schema::{build_json_schema, build_uischema_from_fields, convert_schema_to_fields};
use formtree::starter::{find_starter, load_starters};
use formtree::validate;

use anyhow::{Context, bail};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "formtree")]
#[command(about = "Form design tree: build JSON Schema + UI schema, or import a schema", long_about = None)]
struct Cli {
    /// Log debug events (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the export document ({schema, uischema, fields}) from a fields file.
    Build {
        #[arg(long)]
        fields: String,

        #[arg(short = 'o', long, default_value = EXPORT_FILE_NAME)]
        out: String,
    },

    /// Convert a JSON Schema (or a named starter) into a fields file.
    Import {
        #[arg(long, conflicts_with = "starters")]
        schema: Option<String>,

        #[arg(long, requires = "id")]
        starters: Option<String>,

        #[arg(long)]
        id: Option<String>,

        /// Write to this file instead of stdout.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Report duplicate ids and sibling keys; exits non-zero when any exist.
    Check {
        #[arg(long)]
        fields: String,
    },

    /// Write the renderer bundle ({schema, uischema, data, config}).
    Preview {
        #[arg(long)]
        fields: String,

        #[arg(long)]
        data: Option<String>,

        #[arg(long)]
        config: Option<String>,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// List the built-in field types.
    Types,
}

fn read_json(path: &str) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read {}", path)))?;
    serde_json::from_str(&text)
        .with_context(|| diagnostics::error_message(format!("Invalid JSON format in {}", path)))
}

fn emit(text: &str, out: Option<&str>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| diagnostics::error_message(format!("write {}", path)))?;
            println!("Wrote {}", path);
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init_logging(cli.verbose);

    match cli.cmd {
        Commands::Build { fields, out } => {
            // 1) Load + validate the forest.
            let forest = load_forest(&fields)?;
            for dup in validate::duplicate_keys(&forest) {
                diagnostics::warn(&dup);
            }

            // 2) Derive schema + uischema and write the document.
            let doc = ExportDocument::from_fields(&forest);
            doc.write_to(std::path::Path::new(&out))?;
            println!("Wrote {}", out);
        }
        Commands::Import {
            schema,
            starters,
            id,
            out,
        } => {
            let schema = match (schema, starters, id) {
                (Some(path), _, _) => read_json(&path)?,
                (None, Some(path), Some(id)) => {
                    let list = load_starters(&path)?;
                    match find_starter(&list, &id) {
                        Some(starter) => starter.schema.clone(),
                        None => bail!(
                            "{}",
                            diagnostics::error_message(format!("no starter '{}' in {}", id, path))
                        ),
                    }
                }
                _ => bail!(
                    "{}",
                    diagnostics::error_message("import needs --schema or --starters with --id")
                ),
            };

            let registry = FieldTypeRegistry::builtin();
            let forest = convert_schema_to_fields(&schema, &registry, &mut IdAllocator::new());
            emit(&serde_json::to_string_pretty(&forest)?, out.as_deref())?;
        }
        Commands::Check { fields } => {
            let forest = load_forest(&fields)?;
            validate::check_forest(&forest)?;
            println!(
                "{}: {} fields, no duplicate keys",
                fields,
                formtree::tree::collect_all_ids(&forest).len()
            );
        }
        Commands::Preview {
            fields,
            data,
            config,
            out,
        } => {
            let forest = load_forest(&fields)?;
            let config = match config {
                Some(path) => RendererConfig::load(&path)?,
                None => RendererConfig::default(),
            };
            let schema = build_json_schema(&forest);
            let data = match data {
                Some(path) => read_json(&path)?,
                None => Value::Object(Default::default()),
            };

            let input = RenderInput {
                data: reconcile_data(&schema, &data),
                uischema: build_uischema_from_fields(&forest),
                schema,
                config,
            };
            emit(&serde_json::to_string_pretty(&input)?, out.as_deref())?;
        }
        Commands::Types => {
            for template in FieldTypeRegistry::builtin().all() {
                println!(
                    "{:<18} {:<18} {:?}{}",
                    template.id,
                    template.label,
                    template.category,
                    if template.is_layout { " (layout)" } else { "" }
                );
            }
        }
    }

    Ok(())
}
