//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod import;
mod query;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "Timetable ingestion and group schedule lookup service")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the schedule snapshot
    #[arg(long, global = true, env = "TIMETABLE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        /// Bind address: PORT, HOST, or HOST:PORT
        #[arg(short, long, env = "TIMETABLE_BIND")]
        bind: Option<String>,

        /// Origin allowed to call the API from a browser
        #[arg(long, env = "TIMETABLE_ALLOWED_ORIGIN")]
        allowed_origin: Option<String>,
    },

    /// Import a .docx timetable as the current schedule
    Import {
        /// Document to import; its name must start with a DD.MM.YYYY date
        file: PathBuf,
    },

    /// Look up the lessons of a group in the current schedule
    Query {
        /// Group name (matched as a substring of table cells)
        group: String,
        /// Shift number (1 or 2)
        shift: i64,
        /// Print the spoken text instead of JSON records
        #[arg(long)]
        text: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let allowed_origin = match &cli.command {
        Commands::Serve { allowed_origin, .. } => allowed_origin.clone(),
        _ => None,
    };
    let settings = load_settings(LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
        allowed_origin,
    })
    .await;

    match cli.command {
        Commands::Serve { bind, .. } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Import { file } => import::cmd_import(&settings, &file).await,
        Commands::Query { group, shift, text } => {
            query::cmd_query(&settings, &group, shift, text).await
        }
    }
}
