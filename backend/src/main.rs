//! Monday parser CLI - normalize Monday.com items
//!
//! # Main Commands
//!
//! ```bash
//! monday-parser serve                    # Start HTTP server (port 3000)
//! monday-parser transform items.json     # Normalize a batch of items
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! monday-parser parse-value --type status '{"index":1}'   # Parse one raw value
//! monday-parser validate items.json                       # Check item structure
//! monday-parser column-types                              # List known type tags
//! ```

use clap::{Parser, Subcommand};
use monday_parser::pipeline::{execute, load_batch_file, TransformOptions};
use monday_parser::{
    mappable_value, parse_column, validate_item, ColumnDescriptor, ColumnType,
    RecordDefaults,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "monday-parser")]
#[command(about = "Normalize Monday.com items into mappable records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a batch of items (a single item object or an array)
    Transform {
        /// Input JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Operation to run
        #[arg(long, default_value = "transform")]
        operation: String,

        /// Record per-item failures instead of aborting
        #[arg(long)]
        continue_on_fail: bool,

        /// Board id for items without one
        #[arg(long)]
        board_id: Option<String>,

        /// Group id for items without one
        #[arg(long)]
        group_id: Option<String>,

        /// Group title for items without one
        #[arg(long)]
        group_title: Option<String>,

        /// Synthetic email pattern, `{id}` is replaced by the item id
        #[arg(long)]
        email_pattern: Option<String>,

        /// Leave missing board, group and email null
        #[arg(long)]
        no_defaults: bool,
    },

    /// Parse one raw column value and show its mappable form
    ParseValue {
        /// Column type tag (status, people, color_xyz, ...)
        #[arg(short = 't', long = "type")]
        type_tag: String,

        /// Raw value, JSON or plain text
        raw: String,

        /// Rendered text of the column
        #[arg(long)]
        text: Option<String>,
    },

    /// Validate items against the item schema
    Validate {
        /// Input JSON file (an item or an array of items)
        input: PathBuf,
    },

    /// Show recognized column type tags
    ColumnTypes,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform {
            input,
            output,
            operation,
            continue_on_fail,
            board_id,
            group_id,
            group_title,
            email_pattern,
            no_defaults,
        } => {
            let mut defaults = if no_defaults {
                RecordDefaults::unset()
            } else {
                RecordDefaults::from_env()
            };
            defaults.board_id = board_id.or(defaults.board_id);
            defaults.group_id = group_id.or(defaults.group_id);
            defaults.group_title = group_title.or(defaults.group_title);
            defaults.email_pattern = email_pattern.or(defaults.email_pattern);

            let options = TransformOptions {
                operation,
                continue_on_fail,
                defaults,
            };
            cmd_transform(&input, &options, output.as_deref())
        }

        Commands::ParseValue { type_tag, raw, text } => cmd_parse_value(&type_tag, &raw, text),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::ColumnTypes => cmd_column_types(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    options: &TransformOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let items = load_batch_file(input)?;
    let result = execute(&items, options)?;

    if result.failed > 0 {
        eprintln!("\n⚠️  {} item(s) failed:", result.failed);
        for failure in result.items.iter().filter_map(|o| o.error.as_ref()).take(5) {
            eprintln!("   - item {}: {}", failure.item_index, failure.message);
        }
    }

    let json = serde_json::to_string_pretty(&result.items)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse_value(
    type_tag: &str,
    raw: &str,
    text: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Accept decoded JSON as well as plain strings
    let raw_value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| json!(raw));

    let column = ColumnDescriptor {
        id: type_tag.to_string(),
        value: Some(raw_value),
        text: text.map(Value::String),
        type_tag: json!(type_tag),
        column: None,
    };
    let parsed = parse_column(&column);
    let mappable = mappable_value(&column, parsed.as_ref());

    let report = json!({
        "type": ColumnType::from_tag(type_tag).as_str(),
        "parsed": parsed.map(|p| p.to_json()),
        "mappable": mappable,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let items = load_batch_file(input)?;

    let mut valid = 0;
    let mut invalid = 0;

    for (i, item) in items.iter().enumerate() {
        match validate_item(&item.json) {
            Ok(()) => valid += 1,
            Err(errors) => {
                invalid += 1;
                if invalid <= 5 {
                    eprintln!("\n❌ Item {} invalid:", i);
                    for err in errors.iter().take(3) {
                        eprintln!("   - {}", err);
                    }
                }
            }
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_column_types() -> Result<(), Box<dyn std::error::Error>> {
    for tag in ColumnType::KNOWN_TAGS {
        println!("{}", tag);
    }
    eprintln!("\nOther tags containing \"color\" are handled as color columns.");
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    monday_parser::server::start_server(port).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
