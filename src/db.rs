//! SQLite-backed task storage and date parsing utilities.
//!
//! `TaskStorage` owns the durable representation of tasks in a single local
//! database file. Every operation opens a fresh scoped connection and releases
//! it before returning, so no file handles or locks outlive a call. Cross-
//! process coordination is left entirely to SQLite's own file locking.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, ToSql};

use crate::fields::Priority;
use crate::task::Task;

/// Timestamp layout used for `created_at` and `due_date` columns.
/// `%.f` keeps sub-second precision when present and round-trips exactly.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse human-readable due date input.
///
/// Recognized forms, first match wins:
/// - "today", "tomorrow", "yesterday"
/// - "in N day(s)" for non-negative N
/// - "YYYY-MM-DD", "MM/DD/YYYY", "DD-MM-YYYY"
///
/// Every match is normalized to 23:59:59 of the resulting calendar day.
/// Empty and unrecognized input both yield `None`; an unparseable date is
/// deliberately not an error.
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let s = input.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return end_of_day(today),
        "tomorrow" => return end_of_day(today + Duration::days(1)),
        "yesterday" => return end_of_day(today - Duration::days(1)),
        _ => {}
    }

    // "in N days" / "in N day"
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(n) = rest.strip_suffix(" days").or_else(|| rest.strip_suffix(" day")) {
            if let Ok(days) = n.trim().parse::<u32>() {
                return end_of_day(today + Duration::days(i64::from(days)));
            }
        }
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&s, format) {
            return end_of_day(date);
        }
    }

    None
}

fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(23, 59, 59)
}

/// Optional predicates for task retrieval. All set predicates combine with
/// AND; requested tags combine with OR among themselves. `completed` always
/// applies, defaulting to pending tasks only.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub completed: bool,
}

/// SQLite-based task storage.
pub struct TaskStorage {
    db_path: PathBuf,
}

impl TaskStorage {
    /// Open (and initialize if needed) the task database. With no explicit
    /// path the database lives at `~/.click_tasks.db`.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => {
                let home = std::env::var("HOME").context("HOME is not set; cannot locate the task database")?;
                PathBuf::from(home).join(".click_tasks.db")
            }
        };
        let storage = TaskStorage { db_path };
        storage.init_database()?;
        Ok(storage)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("failed to open task database at {}", self.db_path.display()))
    }

    /// Create the tasks table if it does not exist. Idempotent; any future
    /// schema change is a hard compatibility break.
    fn init_database(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                priority TEXT NOT NULL DEFAULT 'medium',
                completed BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                due_date TEXT,
                tags TEXT
            )",
            [],
        )
        .context("failed to initialize the tasks table")?;
        Ok(())
    }

    /// Insert a new task and return its assigned id. Every call creates a
    /// new row; there is no duplicate detection.
    pub fn add_task(&self, task: &Task) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO tasks (description, priority, completed, created_at, due_date, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.description,
                task.priority.as_str(),
                task.completed,
                task.created_at.format(DATETIME_FORMAT).to_string(),
                task.due_date.map(|d| d.format(DATETIME_FORMAT).to_string()),
                task.tags.join(","),
            ],
        )
        .context("failed to insert task")?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch tasks matching the filter, most recently created first.
    ///
    /// Tag filtering is a substring match against the comma-joined tags
    /// column, so requesting "wor" also matches a stored "work" tag.
    pub fn get_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut query = String::from(
            "SELECT id, description, priority, completed, created_at, due_date, tags
             FROM tasks WHERE completed = ?",
        );
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(filter.completed)];

        if let Some(priority) = filter.priority {
            query.push_str(" AND priority = ?");
            values.push(Box::new(priority.as_str().to_string()));
        }
        if let Some(due) = filter.due_date {
            query.push_str(" AND date(due_date) = date(?)");
            values.push(Box::new(due.format(DATETIME_FORMAT).to_string()));
        }
        if !filter.tags.is_empty() {
            let conditions = vec!["tags LIKE ?"; filter.tags.len()].join(" OR ");
            query.push_str(&format!(" AND ({conditions})"));
            for tag in &filter.tags {
                values.push(Box::new(format!("%{tag}%")));
            }
        }
        query.push_str(" ORDER BY created_at DESC");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&query).context("failed to prepare task query")?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt
            .query_map(&param_refs[..], task_from_row)
            .context("failed to query tasks")?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.context("failed to read task row")?);
        }
        Ok(tasks)
    }

    /// Mark a task as completed. Returns whether a row with that id exists;
    /// re-completing an already-completed task still reports true because
    /// SQLite counts every row matched by the UPDATE.
    pub fn complete_task(&self, task_id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let affected = conn
            .execute("UPDATE tasks SET completed = 1 WHERE id = ?1", params![task_id])
            .context("failed to complete task")?;
        Ok(affected > 0)
    }

    /// Delete a task. Returns whether a row existed.
    pub fn delete_task(&self, task_id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let affected = conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![task_id])
            .context("failed to delete task")?;
        Ok(affected > 0)
    }

    /// Point lookup by id.
    pub fn get_task_by_id(&self, task_id: i64) -> Result<Option<Task>> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT id, description, priority, completed, created_at, due_date, tags
             FROM tasks WHERE id = ?1",
            params![task_id],
            task_from_row,
        )
        .optional()
        .context("failed to look up task")
    }

    /// Mark every pending task as completed; returns the number of tasks
    /// that actually transitioned.
    pub fn complete_all_tasks(&self) -> Result<usize> {
        let conn = self.connect()?;
        conn.execute("UPDATE tasks SET completed = 1 WHERE completed = 0", [])
            .context("failed to complete all tasks")
    }

    /// Remove every task unconditionally; returns the number removed.
    pub fn delete_all_tasks(&self) -> Result<usize> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM tasks", [])
            .context("failed to delete all tasks")
    }
}

/// Map a tasks row back to a `Task`. A malformed stored priority or
/// timestamp is surfaced as a conversion failure, not skipped: only this
/// tool writes the file, so bad values mean corruption.
fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let priority_text: String = row.get(2)?;
    let priority = priority_text
        .parse::<Priority>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;

    let created_text: String = row.get(4)?;
    let created_at = NaiveDateTime::parse_from_str(&created_text, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    let due_text: Option<String> = row.get(5)?;
    let due_date = match due_text {
        Some(text) => Some(
            NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        ),
        None => None,
    };

    // Empty string means "no tags"; an individual empty tag is therefore
    // indistinguishable from none, which the writer side prevents.
    let tags_text: String = row.get::<_, Option<String>>(6)?.unwrap_or_default();
    let tags = if tags_text.is_empty() {
        Vec::new()
    } else {
        tags_text.split(',').map(str::to_string).collect()
    };

    Ok(Task {
        id: Some(row.get(0)?),
        description: row.get(1)?,
        priority,
        completed: row.get(3)?,
        created_at,
        due_date,
        tags,
    })
}
