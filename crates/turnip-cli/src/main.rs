//! Turnip CLI - Command-line interface for the protocol catalog

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use turnip_core::{Turnip, TurnipConfig};

#[derive(Parser)]
#[command(name = "turnip")]
#[command(about = "Turnip - catalog of network protocols")]
struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Database path, overriding the configuration
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List protocol names
    List,
    /// Show the number of protocols
    Count,
    /// Show a protocol, or one of its fields
    Show {
        /// Protocol name or alias
        protocol: String,
        /// Field name
        field: Option<String>,
    },
    /// Report protocols failing validation
    Check,
    /// Create a protocol
    Add {
        /// Protocol name
        name: String,
        /// Alias (repeatable)
        #[arg(short, long)]
        alias: Vec<String>,
    },
    /// Update a field; list fields are appended to unless --replace is set
    Set {
        protocol: String,
        field: String,
        value: String,
        #[arg(long)]
        replace: bool,
    },
    /// Append a value to a field
    Append {
        protocol: String,
        field: String,
        value: String,
    },
    /// Add a field the protocol does not have yet
    NewField {
        protocol: String,
        field: String,
        value: String,
    },
    /// Delete a protocol
    Delete {
        protocol: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut config = match &cli.config {
        Some(path) => TurnipConfig::load(path).with_context(|| format!("loading {}", path))?,
        None => TurnipConfig::default(),
    };
    if let Some(db) = cli.db {
        config.storage.db_path = db.into();
    }

    let turnip = Turnip::new(config)?;
    let catalog = turnip.catalog();

    match cli.command {
        Some(Commands::List) => {
            let mut names = catalog.list()?;
            names.sort_by_key(|n| n.to_lowercase());
            for name in names {
                println!("{}", name);
            }
        }
        Some(Commands::Count) => {
            println!("{}", catalog.count()?);
        }
        Some(Commands::Show { protocol, field }) => {
            let record = catalog.resolve(&protocol)?;
            match field {
                Some(field) => {
                    let (field, value) = record.resolve_field(&field)?;
                    println!("{}: {}", catalog.schema().label(field), value);
                }
                None => {
                    for (field, value) in record.to_dict(true) {
                        println!("{}: {}", catalog.schema().label(&field), value);
                    }
                }
            }
        }
        Some(Commands::Check) => {
            let report = turnip.report()?;
            for message in &report {
                println!("{}", message);
            }
            if !report.is_empty() {
                anyhow::bail!("{} protocols failed validation", report.len());
            }
        }
        Some(Commands::Add { name, alias }) => {
            let aliases: Vec<&str> = alias.iter().map(String::as_str).collect();
            turnip.create_protocol(&name, &aliases)?;
            println!("Added {}", name);
        }
        Some(Commands::Set {
            protocol,
            field,
            value,
            replace,
        }) => {
            catalog.resolve(&protocol)?.set(&field, value, replace)?;
        }
        Some(Commands::Append {
            protocol,
            field,
            value,
        }) => {
            catalog.resolve(&protocol)?.append(&field, value)?;
        }
        Some(Commands::NewField {
            protocol,
            field,
            value,
        }) => {
            catalog.resolve(&protocol)?.add(&field, value)?;
        }
        Some(Commands::Delete { protocol }) => {
            let record = catalog.resolve(&protocol)?;
            catalog.delete(&record)?;
            println!("Deleted {}", record.name());
        }
        None => {
            println!("Turnip v0.1.0 - Use --help for commands");
        }
    }

    turnip.flush()?;
    Ok(())
}
