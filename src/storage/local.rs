// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Local filesystem storage engine.
//!
//! ## On-disk layout
//!
//! ```text
//! <root>/
//!   <id>      raw object content, no header
//!   <id>
//!   ...
//! ```
//!
//! Metadata lives only in the [`ObjectIndex`]. An object becomes visible
//! through `get`/`list` only after its content has been copied and flushed
//! completely; a failed copy leaves an orphaned file that nothing serves.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::storage::id::{IdGenerator, TimeOrderedIds};
use crate::storage::index::ObjectIndex;
use crate::storage::object::Object;
use crate::storage::{ObjectReader, StorageProvider};

/// Stores each object as a single file named after its id under `root`.
pub struct LocalStorage {
    root: PathBuf,
    index: Arc<ObjectIndex>,
    ids: Box<dyn IdGenerator>,
}

impl LocalStorage {
    /// Build an engine over an existing, writable directory with the given
    /// index and id source.
    pub fn new(root: impl Into<PathBuf>, index: Arc<ObjectIndex>, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            root: root.into(),
            index,
            ids,
        }
    }

    /// Engine with a fresh, empty index and time-ordered UUID ids.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Arc::new(ObjectIndex::new()), Box::new(TimeOrderedIds))
    }

    fn object_path(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Copy `reader` into a brand new file at `path`. The file is closed on
    /// every path out of this function.
    fn write_content(path: &Path, reader: &mut dyn Read) -> Result<u64> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| StoreError::Write(format!("create {path:?}: {e}")))?;

        let mut writer = BufWriter::new(file);
        let copied = io::copy(reader, &mut writer)
            .map_err(|e| StoreError::Write(format!("copy into {path:?}: {e}")))?;
        writer
            .flush()
            .map_err(|e| StoreError::Write(format!("flush {path:?}: {e}")))?;
        Ok(copied)
    }
}

impl StorageProvider for LocalStorage {
    fn get(&self, id: &str) -> Result<ObjectReader> {
        if !is_plain_id(id) || !self.index.contains(id) {
            return Err(StoreError::not_found(id));
        }

        let path = self.object_path(id);
        match File::open(&path) {
            Ok(file) => {
                debug!(id, path = ?path, "Object opened for reading");
                Ok(Box::new(file))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::not_found(id)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn put(&self, name: &str, reader: &mut dyn Read) -> Result<Object> {
        let id = self.ids.generate()?;
        if !is_plain_id(&id) {
            return Err(StoreError::IdGeneration(format!(
                "generated id {id:?} is not a valid file name"
            )));
        }

        let object = Object::new(id, name);
        let path = self.object_path(&object.id);

        match Self::write_content(&path, reader) {
            Ok(bytes) => {
                self.index.set(object.clone());
                info!(id = %object.id, name, bytes, "Object stored");
                Ok(object)
            }
            Err(e) => {
                warn!(id = %object.id, name, error = %e, "Object write failed, not registered");
                Err(e)
            }
        }
    }

    fn list(&self) -> Vec<Object> {
        self.index.all()
    }

    fn stat(&self, id: &str) -> Result<Object> {
        self.index.get(id)
    }
}

/// Ids are used directly as file names, so anything that could escape
/// `root` is rejected.
fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

/// Prepare the object directory at startup.
///
/// With `reset` set, any existing directory is removed first so the files on
/// disk match the (empty) index.
pub fn prepare_root(path: &Path, reset: bool) -> Result<()> {
    if reset && path.exists() {
        std::fs::remove_dir_all(path)
            .map_err(|e| StoreError::Config(format!("Cannot clear storage root {path:?}: {e}")))?;
        info!(path = ?path, "Storage root cleared");
    }
    std::fs::create_dir_all(path)
        .map_err(|e| StoreError::Config(format!("Cannot create storage root {path:?}: {e}")))?;
    Ok(())
}
