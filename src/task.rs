//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct that represents a single to-do
//! item: description, priority, completion state, optional due date and tags.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::fields::Priority;

/// A single to-do item.
///
/// `id` is `None` until the task has been persisted; the store assigns it on
/// insert and it is never reused after deletion. All other fields except
/// `completed` are fixed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Option<i64>,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub tags: Vec<String>,
}

impl Task {
    /// Create an unpersisted task. `created_at` is set to the current local
    /// wall-clock time.
    pub fn new(
        description: impl Into<String>,
        priority: Priority,
        due_date: Option<NaiveDateTime>,
        tags: Vec<String>,
    ) -> Self {
        Task {
            id: None,
            description: description.into(),
            priority,
            completed: false,
            created_at: Local::now().naive_local(),
            due_date,
            tags,
        }
    }

    /// A task is overdue when its due date is strictly in the past and it is
    /// not completed. Computed against the supplied `now`, never stored.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        match self.due_date {
            Some(due) => !self.completed && now > due,
            None => false,
        }
    }
}

/// Split comma-separated tag text into trimmed, non-empty tags.
/// Order is preserved and duplicates are kept as given.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Test task", Priority::default(), None, Vec::new());
        assert_eq!(task.id, None);
        assert_eq!(task.description, "Test task");
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert!(task.due_date.is_none());
        assert!(task.tags.is_empty());
    }

    #[test]
    fn test_overdue_with_past_due_date() {
        let now = Local::now().naive_local();
        let mut task = Task::new("Overdue task", Priority::High, Some(now - Duration::days(2)), Vec::new());
        assert!(task.is_overdue(now));

        // Completed tasks are never overdue.
        task.completed = true;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_not_overdue_without_due_date() {
        let now = Local::now().naive_local();
        let task = Task::new("No due date", Priority::Medium, None, Vec::new());
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_not_overdue_with_future_due_date() {
        let now = Local::now().naive_local();
        let task = Task::new("Future", Priority::Medium, Some(now + Duration::days(1)), Vec::new());
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("work, urgent ,home"), vec!["work", "urgent", "home"]);
        assert_eq!(split_tags(""), Vec::<String>::new());
        assert_eq!(split_tags(" , ,"), Vec::<String>::new());
        // Duplicates and order are preserved.
        assert_eq!(split_tags("a,b,a"), vec!["a", "b", "a"]);
    }
}
