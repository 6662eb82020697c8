//! The key-value store seam.
//!
//! # Design
//! The actual storage medium (browser session storage, a file, a host
//! application's settings) lives outside this crate. `TodoStorage` only
//! needs string get/set under one key, so that is all `KeyValueStore` asks
//! for. `MemoryStore` is the in-process implementation used by tests and by
//! hosts that have nothing better; it can emulate a size quota and an
//! unreadable backend so failure paths can be exercised.

use std::collections::HashMap;

use crate::error::StoreError;

/// A string-keyed, string-valued store.
pub trait KeyValueStore {
    /// Read the value under `key`. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`. A failed write leaves the previous
    /// value in place.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory `KeyValueStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    unreadable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses writes whose total key and value bytes exceed
    /// `bytes`, the way browser storage reports a full quota.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Make every subsequent `get` fail with `StoreError::Unavailable`.
    pub fn set_unreadable(&mut self, unreadable: bool) {
        self.unreadable = unreadable;
    }

    /// Raw value under `key`, bypassing the unreadable switch.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.unreadable {
            return Err(StoreError::Unavailable("store is not readable".to_string()));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.quota {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
