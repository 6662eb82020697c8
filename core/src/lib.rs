//! Normalization and persistence of a todo list in a key-value store.
//!
//! # Overview
//! Stored todos arrive as untrusted JSON text. `TodoStorage` parses that
//! text, runs every element through the `Normalizer`, and keeps only the
//! elements that form a valid `Todo`. Saving maps todos back to the plain
//! stored shape and overwrites the single storage key.
//!
//! # Design
//! - The store is a collaborator behind `KeyValueStore`; `MemoryStore` is the
//!   in-process implementation.
//! - `decode`/`encode` do no I/O, so a host that owns the store can drive
//!   them directly.
//! - `load_all`/`save_all` never fail; the `try_*` variants return the
//!   typed error instead.
//! - Development diagnostics go through `tracing` and are gated by
//!   `StorageConfig::diagnostics`.

pub mod config;
pub mod error;
pub mod instant;
pub mod normalize;
pub mod storage;
pub mod store;
pub mod types;

pub use config::StorageConfig;
pub use error::{LoadError, Rejection, SaveError, StoreError};
pub use instant::{format_instant, parse_instant};
pub use normalize::Normalizer;
pub use storage::{DecodeReport, TodoStorage, TODO_STORAGE_KEY};
pub use store::{KeyValueStore, MemoryStore};
pub use types::{DueDate, DueDateError, StoredTodo, Todo};
