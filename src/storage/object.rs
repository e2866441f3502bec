// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about a single stored object. The content bytes live on disk
/// under the object's id; this record lives only in the in-memory index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Object {
    /// Build a record stamped with the current wall-clock time.
    pub fn new(id: String, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }
}
