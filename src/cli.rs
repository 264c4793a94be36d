use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Top-level argument parser for the `click` binary.
#[derive(Parser)]
#[command(name = "click", version, about = "Local task management CLI")]
#[command(after_help = "\
Due dates (for `add --due` and `list --due`) accept: today, tomorrow,
yesterday, \"in N days\", YYYY-MM-DD, MM/DD/YYYY and DD-MM-YYYY. All are
normalized to 23:59:59 of the named day; unrecognized text means no due date.")]
pub struct Cli {
    /// Path to the SQLite database file (default: ~/.click_tasks.db).
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
