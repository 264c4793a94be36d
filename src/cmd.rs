//! Command implementations for the CLI interface.
//!
//! This module contains the subcommand definitions and one handler per
//! command. All terminal presentation lives here; the storage layer only
//! returns plain `Task` values and counts.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDateTime};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::db::{parse_date, TaskFilter, TaskStorage};
use crate::fields::Priority;
use crate::task::{split_tags, Task};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// What needs to be done.
        description: String,
        /// Due date: YYYY-MM-DD, MM/DD/YYYY, DD-MM-YYYY, "today", "tomorrow" or "in N days".
        #[arg(long)]
        due: Option<String>,
        /// Task priority.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by due date (same formats as `add --due`).
        #[arg(long)]
        due: Option<String>,
        /// Filter by tags (comma-separated, any match).
        #[arg(long)]
        tags: Option<String>,
        /// Show completed tasks instead of pending ones.
        #[arg(long)]
        completed: bool,
    },

    /// Mark a task as completed.
    Complete {
        /// Task ID.
        id: i64,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: i64,
    },

    /// Mark every pending task as completed.
    CompleteAll {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Delete every task.
    DeleteAll {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show the details of a single task.
    View {
        /// Task ID.
        id: i64,
    },

    /// Export tasks as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn cmd_add(
    storage: &TaskStorage,
    description: String,
    due: Option<String>,
    priority: Priority,
    tags: Option<String>,
) -> Result<()> {
    if description.trim().is_empty() {
        bail!("task description must not be empty");
    }

    // Unparseable due text collapses to "no due date" rather than failing.
    let due_date = due.as_deref().and_then(parse_date);
    let task_tags = tags.as_deref().map(split_tags).unwrap_or_default();

    let task = Task::new(description, priority, due_date, task_tags);
    let id = storage.add_task(&task)?;
    println!("Task added successfully with ID: {id}");

    print_task_list(&storage.get_tasks(&TaskFilter::default())?);
    Ok(())
}

pub fn cmd_list(
    storage: &TaskStorage,
    priority: Option<Priority>,
    due: Option<String>,
    tags: Option<String>,
    completed: bool,
) -> Result<()> {
    let filter = TaskFilter {
        priority,
        due_date: due.as_deref().and_then(parse_date),
        tags: tags.as_deref().map(split_tags).unwrap_or_default(),
        completed,
    };
    print_task_list(&storage.get_tasks(&filter)?);
    Ok(())
}

pub fn cmd_complete(storage: &TaskStorage, id: i64) -> Result<()> {
    if storage.complete_task(id)? {
        println!("Task {id} marked as completed!");
    } else {
        eprintln!("Task {id} not found.");
    }
    print_task_list(&storage.get_tasks(&TaskFilter::default())?);
    Ok(())
}

pub fn cmd_delete(storage: &TaskStorage, id: i64) -> Result<()> {
    if storage.delete_task(id)? {
        println!("Task {id} deleted successfully!");
    } else {
        eprintln!("Task {id} not found.");
    }
    print_task_list(&storage.get_tasks(&TaskFilter::default())?);
    Ok(())
}

pub fn cmd_complete_all(storage: &TaskStorage, yes: bool) -> Result<()> {
    if !yes && !confirm("Are you sure you want to complete all tasks?")? {
        println!("Aborted.");
        return Ok(());
    }
    let count = storage.complete_all_tasks()?;
    println!("Completed {count} tasks!");
    print_task_list(&storage.get_tasks(&TaskFilter::default())?);
    Ok(())
}

pub fn cmd_delete_all(storage: &TaskStorage, yes: bool) -> Result<()> {
    if !yes && !confirm("Are you sure you want to delete all tasks?")? {
        println!("Aborted.");
        return Ok(());
    }
    let count = storage.delete_all_tasks()?;
    println!("Deleted {count} tasks!");
    Ok(())
}

pub fn cmd_view(storage: &TaskStorage, id: i64) -> Result<()> {
    let Some(task) = storage.get_task_by_id(id)? else {
        bail!("task {id} not found");
    };

    let now = Local::now().naive_local();
    println!("ID:          {id}");
    println!("Description: {}", task.description);
    println!("Priority:    {}", task.priority);
    println!("Status:      {}", status_label(&task, now));
    println!("Created:     {}", task.created_at.format("%Y-%m-%d %H:%M"));
    match task.due_date {
        Some(due) => println!("Due:         {}", format_due_date(due, now)),
        None => println!("Due:         -"),
    }
    if !task.tags.is_empty() {
        println!("Tags:        {}", task.tags.join(", "));
    }
    Ok(())
}

pub fn cmd_export(storage: &TaskStorage, output: Option<PathBuf>, all: bool) -> Result<()> {
    let tasks = tasks_for_export(storage, all)?;
    let json = serde_json::to_string_pretty(&tasks).context("failed to serialize tasks")?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} tasks to {}", tasks.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Collect tasks for export, most recently created first. Pending and
/// completed tasks come from separate queries, so the combined list is
/// re-sorted to keep one global order.
fn tasks_for_export(storage: &TaskStorage, all: bool) -> Result<Vec<Task>> {
    let mut tasks = storage.get_tasks(&TaskFilter::default())?;
    if all {
        tasks.extend(storage.get_tasks(&TaskFilter { completed: true, ..Default::default() })?);
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    Ok(tasks)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn status_label(task: &Task, now: NaiveDateTime) -> &'static str {
    if task.completed {
        "Done"
    } else if task.is_overdue(now) {
        "Late"
    } else {
        "Todo"
    }
}

/// Render a due date with friendly labels for today and tomorrow.
fn format_due_date(due: NaiveDateTime, now: NaiveDateTime) -> String {
    if due.date() == now.date() {
        "Today".to_string()
    } else if due.date() == (now + Duration::days(1)).date() {
        "Tomorrow".to_string()
    } else {
        due.format("%Y-%m-%d").to_string()
    }
}

/// Print tasks as an aligned table followed by a total count.
fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }

    let now = Local::now().naive_local();
    println!(
        "{:<4} {:<6} {:<8} {:<30} {:<12} {}",
        "ID", "Status", "Priority", "Description", "Due Date", "Tags"
    );
    for task in tasks {
        let due = task
            .due_date
            .map(|d| format_due_date(d, now))
            .unwrap_or_default();
        println!(
            "{:<4} {:<6} {:<8} {:<30} {:<12} {}",
            task.id.map(|id| id.to_string()).unwrap_or_default(),
            status_label(task, now),
            task.priority,
            task.description,
            due,
            task.tags.join(", "),
        );
    }
    println!("\nTotal: {} tasks", tasks.len());
}
