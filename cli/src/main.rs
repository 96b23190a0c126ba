mod commands;
mod config;
mod plan;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{cmd_probe, cmd_run};
use crate::config::Config;
use mealtrail_core::db::Database;
use mealtrail_core::extract::MatchMode;
use mealtrail_core::models::FoodSource;

#[derive(Parser)]
#[command(
    name = "mealtrail",
    version,
    about = "Migrate a free-text meal journal into a relational food log"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full migration plan against the destination database
    Run {
        /// Path to the journal CSV export
        csv: PathBuf,
        /// Destination SQLite database (default: platform data dir)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Report what each pass would insert without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dry-run a single keyword and show the records it would produce
    Probe {
        /// Path to the journal CSV export
        csv: PathBuf,
        /// Dish name to search for
        keyword: String,
        /// Food source category: recipe, restaurant, product
        #[arg(long)]
        source: Option<FoodSource>,
        /// Match on substring containment instead of exact name
        #[arg(long)]
        substring: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            csv,
            db,
            dry_run,
            json,
        } => {
            let db_path = match db {
                Some(path) => path,
                None => Config::load()?.db_path,
            };
            let database = Database::open(&db_path)?;
            cmd_run(&database, &csv, dry_run, json)
        }
        Commands::Probe {
            csv,
            keyword,
            source,
            substring,
            json,
        } => {
            let mode = if substring {
                MatchMode::Substring
            } else {
                MatchMode::Exact
            };
            cmd_probe(&csv, &keyword, source, mode, json)
        }
    }
}
