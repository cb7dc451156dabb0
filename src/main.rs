//! # Tech KB CLI (`kb`)
//!
//! ## Usage
//!
//! ```bash
//! kb --config ./config/kb.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `kb init` | Create the database (or empty JSON file) |
//! | `kb list` | List technologies, newest first |
//! | `kb add "<text>"` | Summarize a technology with AI and store it |
//! | `kb search "<query>"` | Semantic search over stored technologies |
//! | `kb delete <id>` | Delete a technology |
//! | `kb categories` | List distinct categories |
//! | `kb import <file.json>` | Load a JSON-file store into SQLite |
//! | `kb serve` | Start the HTTP server |

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tech_kb::actions::{filter_by_categories, filter_by_names, parse_id, Actions};
use tech_kb::config;
use tech_kb::import;
use tech_kb::models::Technology;
use tech_kb::server;
use tech_kb::store;

/// Tech KB: a personal technology knowledge base with AI summaries and
/// semantic search.
#[derive(Parser)]
#[command(name = "kb", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/kb.toml")]
    config: PathBuf,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema or the empty JSON file. Idempotent.
    Init,

    /// Load a JSON-file store into the SQLite database.
    Import {
        /// Path to the JSON document (array of technologies).
        json: PathBuf,

        /// Delete the existing database file first.
        #[arg(long)]
        fresh: bool,
    },

    /// Start the HTTP server.
    Serve,

    #[command(flatten)]
    Action(ActionCommand),
}

/// Commands that run through the request handlers.
#[derive(Subcommand)]
enum ActionCommand {
    /// List stored technologies, newest first.
    List {
        /// Only show technologies in any of these categories (repeatable).
        #[arg(long)]
        category: Vec<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Summarize a technology with AI and store it.
    Add {
        /// Name or free-text description (at least 3 characters).
        tech_info: String,
    },

    /// Find stored technologies relevant to a goal.
    Search {
        query: String,
    },

    /// Delete a technology by id.
    Delete {
        id: String,
    },

    /// List distinct categories.
    Categories,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Prints a command error and exits with status 1.
fn fail(err: anyhow::Error) -> ! {
    eprintln!("Error: {:#}", err);
    std::process::exit(1);
}

fn print_technology(tech: &Technology) {
    println!("[{}] {}", tech.id, tech.name);
    println!("    categories: {}", tech.categories.join(", "));
    println!("    summary:    {}", tech.summary);
    if !tech.use_cases.is_empty() {
        println!("    use cases:  {}", tech.use_cases.join("; "));
    }
    if let Some(link) = tech.primary_link() {
        println!("    link:       {}", link);
    }
    if !tech.image_url.is_empty() && !tech.image_url.starts_with("data:") {
        println!("    image:      {}", tech.image_url);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            store::init_store(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { json, fresh } => {
            let n = import::import_json(&cfg, &json, fresh).await?;
            println!("imported technologies: {}", n);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Action(command) => {
            let actions = Actions::from_config(&cfg).await?;
            let result = run_action(&actions, command).await;
            actions.close().await;
            if let Err(e) = result {
                fail(e);
            }
        }
    }

    Ok(())
}

async fn run_action(actions: &Actions, command: ActionCommand) -> anyhow::Result<()> {
    match command {
        ActionCommand::List { category, json } => {
            let records = actions.list().await?;
            let shown = filter_by_categories(&records, &category);
            if json {
                let body = serde_json::to_string_pretty(&shown)
                    .context("Failed to encode technologies as JSON")?;
                println!("{}", body);
            } else {
                for tech in &shown {
                    print_technology(tech);
                }
                println!("technologies: {}", shown.len());
            }
        }
        ActionCommand::Add { tech_info } => {
            let tech = actions.add(&tech_info).await?;
            print_technology(&tech);
            println!("added: {}", tech.id);
        }
        ActionCommand::Search { query } => {
            let response = actions.search(&query).await?;
            let records = actions.list().await?;
            let hits = filter_by_names(&records, &response.relevant_technologies);
            for tech in &hits {
                print_technology(tech);
            }
            println!("relevant: {}", response.relevant_technologies.join(", "));
        }
        ActionCommand::Delete { id } => {
            let id = parse_id(&id)?;
            actions.delete_technology(id).await?;
            println!("deleted: {}", id);
        }
        ActionCommand::Categories => {
            for c in actions.categories().await? {
                println!("{}", c);
            }
        }
    }
    Ok(())
}
