//! # click — local task management CLI
//!
//! A small command-line task manager that stores tasks in a single SQLite
//! file (`~/.click_tasks.db` by default).
//!
//! ```bash
//! # Add a task
//! click add "Buy milk" --due tomorrow --priority high --tags errand,home
//!
//! # List pending tasks, optionally filtered
//! click list --tags errand
//!
//! # Complete or delete by ID
//! click complete 3
//! click delete 3
//! ```
//!
//! Each invocation runs one command against the database and exits; there is
//! no daemon and no state beyond the database file.

use anyhow::Result;
use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod db;
pub mod fields;
pub mod task;

use cli::Cli;
use cmd::Commands;
use db::TaskStorage;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Completions need no database.
    if let Commands::Completions { shell } = &cli.command {
        cmd::cmd_completions(*shell);
        return Ok(());
    }

    let storage = TaskStorage::new(cli.db)?;

    match cli.command {
        Commands::Add { description, due, priority, tags } => {
            cmd::cmd_add(&storage, description, due, priority, tags)
        }
        Commands::List { priority, due, tags, completed } => {
            cmd::cmd_list(&storage, priority, due, tags, completed)
        }
        Commands::Complete { id } => cmd::cmd_complete(&storage, id),
        Commands::Delete { id } => cmd::cmd_delete(&storage, id),
        Commands::CompleteAll { yes } => cmd::cmd_complete_all(&storage, yes),
        Commands::DeleteAll { yes } => cmd::cmd_delete_all(&storage, yes),
        Commands::View { id } => cmd::cmd_view(&storage, id),
        Commands::Export { output, all } => cmd::cmd_export(&storage, output, all),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
