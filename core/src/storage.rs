//! Loading and saving the todo list under the fixed storage key.
//!
//! # Design
//! Like the rest of the crate, `TodoStorage` keeps the pure work apart from
//! the store round-trip: `decode` turns stored text into todos and `encode`
//! turns todos into text, with no I/O. `load_all` and `save_all` compose
//! those with a `KeyValueStore`. Hosts that own the store themselves (see the
//! ffi crate) call `decode`/`encode` directly.
//!
//! Every `try_*` method reports failures as typed errors. The plain methods
//! never fail: a load degrades to an empty list and a save to a no-op, with a
//! development diagnostic.

use serde_json::Value;

use crate::config::StorageConfig;
use crate::error::{LoadError, Rejection, SaveError};
use crate::normalize::Normalizer;
use crate::store::KeyValueStore;
use crate::types::{StoredTodo, Todo};

/// The key the todo list is stored under.
pub const TODO_STORAGE_KEY: &str = "todoItems";

/// Result of decoding with per-element detail.
#[derive(Debug, Default, PartialEq)]
pub struct DecodeReport {
    pub todos: Vec<Todo>,
    /// Index into the stored array and the reason that element was dropped.
    pub rejected: Vec<(usize, Rejection)>,
}

/// Loader and saver for the stored todo list.
#[derive(Debug)]
pub struct TodoStorage {
    config: StorageConfig,
    normalizer: Normalizer,
}

impl Default for TodoStorage {
    fn default() -> Self {
        Self::new(StorageConfig::default())
    }
}

impl TodoStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            normalizer: Normalizer::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Read every valid todo from `store`. Never fails.
    pub fn load_all<S: KeyValueStore + ?Sized>(&self, store: &S) -> Vec<Todo> {
        self.try_load_all(store).unwrap_or_else(|err| {
            self.log_load_failure(&err);
            Vec::new()
        })
    }

    pub fn try_load_all<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Vec<Todo>, LoadError> {
        let raw = store.get(TODO_STORAGE_KEY)?;
        self.try_decode(raw.as_deref())
    }

    /// Decode stored text. `None` means the key was absent. Never fails.
    pub fn decode(&self, raw: Option<&str>) -> Vec<Todo> {
        self.try_decode(raw).unwrap_or_else(|err| {
            self.log_load_failure(&err);
            Vec::new()
        })
    }

    pub fn try_decode(&self, raw: Option<&str>) -> Result<Vec<Todo>, LoadError> {
        Ok(self.decode_report(raw)?.todos)
    }

    /// Decode stored text, keeping the reason each dropped element was
    /// rejected. Missing or empty text decodes to an empty report.
    pub fn decode_report(&self, raw: Option<&str>) -> Result<DecodeReport, LoadError> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(DecodeReport::default()),
        };
        let parsed: Value = serde_json::from_str(raw)?;
        let elements = match parsed {
            Value::Array(elements) => elements,
            _ => return Err(LoadError::NotAnArray),
        };

        let mut report = DecodeReport::default();
        for (index, element) in elements.iter().enumerate() {
            match self.normalizer.normalize(element) {
                Ok(todo) => report.todos.push(todo),
                Err(reason) => report.rejected.push((index, reason)),
            }
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Replace the stored list with `todos`. Failures are swallowed.
    pub fn save_all<S: KeyValueStore + ?Sized>(&self, store: &mut S, todos: &[Todo]) {
        if let Err(err) = self.try_save_all(store, todos) {
            if self.config.diagnostics {
                tracing::debug!(key = TODO_STORAGE_KEY, error = %err, "saving todos failed");
            }
        }
    }

    pub fn try_save_all<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        todos: &[Todo],
    ) -> Result<(), SaveError> {
        let text = self.encode(todos)?;
        store.set(TODO_STORAGE_KEY, &text)?;
        Ok(())
    }

    /// Serialize `todos` to the stored JSON text.
    pub fn encode(&self, todos: &[Todo]) -> Result<String, SaveError> {
        let stored: Vec<StoredTodo> = todos.iter().map(StoredTodo::from).collect();
        Ok(serde_json::to_string(&stored)?)
    }

    fn log_load_failure(&self, err: &LoadError) {
        if !self.config.diagnostics {
            return;
        }
        match err {
            LoadError::NotAnArray => {}
            LoadError::Store(_) | LoadError::Parse(_) => {
                tracing::debug!(key = TODO_STORAGE_KEY, error = %err, "loading todos failed");
            }
        }
    }
}
