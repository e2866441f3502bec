// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Storage subsystem — object index + local filesystem engine.

use std::io::Read;

use crate::error::Result;

pub mod id;
pub mod index;
pub mod local;
pub mod object;

pub use id::{IdGenerator, TimeOrderedIds};
pub use index::ObjectIndex;
pub use local::{prepare_root, LocalStorage};
pub use object::Object;

/// Readable content of a stored object, positioned at the start.
pub type ObjectReader = Box<dyn Read + Send>;

/// Capability set exposed to the HTTP layer. Any backend (local disk,
/// remote object store, ...) implements the same three operations.
///
/// Calls block on I/O; async callers should run them on a blocking thread.
pub trait StorageProvider: Send + Sync {
    /// Open the content of object `id`, or [`StoreError::NotFound`].
    ///
    /// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
    fn get(&self, id: &str) -> Result<ObjectReader>;

    /// Store the full contents of `reader` under a freshly generated id.
    fn put(&self, name: &str, reader: &mut dyn Read) -> Result<Object>;

    /// Snapshot of all stored objects in unspecified order.
    fn list(&self) -> Vec<Object>;

    /// Metadata for one object without opening its content.
    fn stat(&self, id: &str) -> Result<Object>;
}
