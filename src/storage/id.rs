// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use uuid::Uuid;

use crate::error::Result;

/// Source of object identifiers.
///
/// Ids must be unique across concurrent calls for the lifetime of one
/// process. Cross-process uniqueness is not needed since the index is
/// never persisted.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Time-ordered UUID (v7) ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
    fn generate(&self) -> Result<String> {
        Ok(Uuid::now_v7().to_string())
    }
}
