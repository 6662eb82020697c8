//! Validation of untrusted stored values into [`Todo`] records.
//!
//! The input is whatever `serde_json` produced from the stored text, so any
//! JSON shape can show up here. Required fields reject the whole element;
//! `description` and `dueDate` are tolerant and never do.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};

use crate::config::StorageConfig;
use crate::error::Rejection;
use crate::instant::parse_instant;
use crate::types::{DueDate, DueDateError, Todo};

/// Turns candidate JSON values into validated todos.
///
/// Owns the one-shot malformed-data flag: the first dropped `dueDate` is
/// reported through `tracing` when diagnostics are enabled, later ones are
/// silent for the life of this normalizer.
#[derive(Debug)]
pub struct Normalizer {
    diagnostics: bool,
    reported_malformed: AtomicBool,
}

impl Normalizer {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            diagnostics: config.diagnostics,
            reported_malformed: AtomicBool::new(false),
        }
    }

    /// Validate one candidate. Never panics on any JSON input.
    pub fn normalize(&self, candidate: &Value) -> Result<Todo, Rejection> {
        let fields = candidate.as_object().ok_or(Rejection::NotAnObject)?;

        let id = non_empty_str(fields, "id").ok_or(Rejection::MissingId)?;
        let title = non_empty_str(fields, "title").ok_or(Rejection::MissingTitle)?;
        let completed = fields
            .get("completed")
            .and_then(Value::as_bool)
            .ok_or(Rejection::InvalidCompleted)?;
        let created_at = match fields.get("createdAt") {
            Some(Value::String(raw)) => {
                parse_instant(raw).ok_or_else(|| Rejection::InvalidCreatedAt(raw.clone()))?
            }
            _ => return Err(Rejection::MissingCreatedAt),
        };

        let description = fields
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let due_date = match parse_due_date(fields.get("dueDate")) {
            Ok(due_date) => due_date,
            Err(err) => {
                self.report_malformed(fields.get("id"), &err);
                None
            }
        };

        Ok(Todo {
            id: id.to_string(),
            title: title.to_string(),
            description,
            completed,
            created_at,
            due_date,
        })
    }

    /// Whether the one-shot malformed-data diagnostic has been emitted.
    pub fn has_reported_malformed(&self) -> bool {
        self.reported_malformed.load(Ordering::Relaxed)
    }

    fn report_malformed(&self, id: Option<&Value>, err: &DueDateError) {
        if !self.diagnostics {
            return;
        }
        if self.reported_malformed.swap(true, Ordering::Relaxed) {
            return;
        }
        let value = match err {
            DueDateError::Format(value) | DueDateError::Calendar(value) => value.as_str(),
        };
        tracing::debug!(
            id = ?id,
            value,
            error = %err,
            "ignoring malformed dueDate in stored todo"
        );
    }
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Absent and null both mean "no due date"; every other shape is an error.
fn parse_due_date(value: Option<&Value>) -> Result<Option<DueDate>, DueDateError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DueDate::parse(s).map(Some),
        Some(other) => Err(DueDateError::Format(other.to_string())),
    }
}
