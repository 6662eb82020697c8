//! Domain types for stored todos.
//!
//! # Design
//! `Todo` is the in-memory record and always holds a parsed instant in
//! `created_at`. `StoredTodo` is the plain persisted shape, with `createdAt`
//! rendered as an ISO-8601 string. The two are kept separate so nothing can
//! reach the store without going through `StoredTodo::from`, and nothing can
//! leave it without going through the normalizer.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::instant::format_instant;

static DUE_DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

/// A single validated todo item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DueDate>,
}

impl Todo {
    /// Create a fresh, not yet completed todo with a random id, stamped now.
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: String::new(),
            completed: false,
            created_at: Utc::now(),
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_due_date(mut self, due_date: DueDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Why a due date string was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DueDateError {
    #[error("due date {0:?} is not in YYYY-MM-DD form")]
    Format(String),
    #[error("due date {0:?} is not a calendar date")]
    Calendar(String),
}

/// A calendar date that always renders as `YYYY-MM-DD`.
///
/// Parsing is strict: `2024-02-30` is an error, not `2024-03-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DueDate(NaiveDate);

impl DueDate {
    pub fn parse(s: &str) -> Result<Self, DueDateError> {
        if !DUE_DATE_SHAPE.is_match(s) {
            return Err(DueDateError::Format(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(DueDate)
            .map_err(|_| DueDateError::Calendar(s.to_string()))
    }

    /// Build from year, month and day. Years outside 0..=9999 cannot be
    /// written in the four digit form and are refused.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(0..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(DueDate)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl TryFrom<String> for DueDate {
    type Error = DueDateError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        DueDate::parse(&s)
    }
}

impl From<DueDate> for String {
    fn from(d: DueDate) -> Self {
        d.to_string()
    }
}

/// The persisted shape of a todo, as written under the storage key.
///
/// Field order matches the stored JSON object so repeated saves of the same
/// records produce byte-identical text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTodo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,
}

impl From<&Todo> for StoredTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id.clone(),
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            created_at: format_instant(&todo.created_at),
            due_date: todo.due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn due_date_accepts_real_dates() {
        let d = DueDate::parse("2024-02-29").unwrap();
        assert_eq!(d.to_string(), "2024-02-29");
    }

    #[test]
    fn due_date_rejects_rollover_dates() {
        assert_eq!(
            DueDate::parse("2024-02-30"),
            Err(DueDateError::Calendar("2024-02-30".to_string()))
        );
        assert!(matches!(DueDate::parse("2023-02-29"), Err(DueDateError::Calendar(_))));
        assert!(matches!(DueDate::parse("2024-13-40"), Err(DueDateError::Calendar(_))));
    }

    #[test]
    fn due_date_rejects_other_shapes() {
        for s in ["2024-1-01", "24-01-01", "2024/01/01", "2024-01-01T00:00:00Z", "", " 2024-01-01"] {
            assert!(matches!(DueDate::parse(s), Err(DueDateError::Format(_))), "{s}");
        }
    }

    #[test]
    fn due_date_rejects_non_ascii_digits() {
        // Arabic-Indic digits are \d in Unicode regexes but not dates.
        assert!(matches!(
            DueDate::parse("٢٠٢٤-٠١-٠١"),
            Err(DueDateError::Format(_))
        ));
    }

    #[test]
    fn due_date_from_ymd_keeps_four_digit_years() {
        assert!(DueDate::from_ymd(2024, 1, 31).is_some());
        assert!(DueDate::from_ymd(2024, 2, 30).is_none());
        assert!(DueDate::from_ymd(10000, 1, 1).is_none());
        assert_eq!(DueDate::from_ymd(987, 6, 5).unwrap().to_string(), "0987-06-05");
    }

    #[test]
    fn new_todo_has_defaults() {
        let todo = Todo::new("Buy milk");
        assert_eq!(todo.title, "Buy milk");
        assert!(Uuid::parse_str(&todo.id).is_ok());
        assert!(todo.description.is_empty());
        assert!(!todo.completed);
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn stored_todo_renders_created_at_with_millis() {
        let todo = Todo {
            id: "1".to_string(),
            title: "A".to_string(),
            description: String::new(),
            completed: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            due_date: None,
        };
        let json = serde_json::to_value(StoredTodo::from(&todo)).unwrap();
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
        assert!(json.get("dueDate").is_none());
        assert_eq!(json["description"], "");
    }

    #[test]
    fn stored_todo_writes_due_date_as_string() {
        let todo = Todo::new("A").with_due_date(DueDate::parse("2025-12-31").unwrap());
        let json = serde_json::to_value(StoredTodo::from(&todo)).unwrap();
        assert_eq!(json["dueDate"], "2025-12-31");
    }
}
