// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Object index — maps object id → [`Object`] metadata.
//!
//! The index lives in memory only and is **not** persistent: it starts empty
//! on every process start and is never rebuilt from the files on disk.
//! Writers take the exclusive lock, readers share it, so a reader sees a
//! record either fully registered or not at all.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::storage::object::Object;

/// Thread-safe registry of object metadata. Knows nothing about file content.
#[derive(Default)]
pub struct ObjectIndex {
    entries: RwLock<HashMap<String, Object>>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry keyed by `object.id`.
    pub fn set(&self, object: Object) {
        self.entries.write().insert(object.id.clone(), object);
    }

    /// Look up a single object by id.
    pub fn get(&self, id: &str) -> Result<Object> {
        self.entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Snapshot of every registered object. Order is unspecified.
    pub fn all(&self) -> Vec<Object> {
        self.entries.read().values().cloned().collect()
    }

    /// Total number of indexed objects.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
