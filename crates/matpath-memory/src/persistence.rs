//! Save/load a [`MemoryStore`] to/from a JSON snapshot.
//!
//! # File Format
//!
//! ```text
//! {
//!   "version": 1,
//!   "nodes": [
//!     { "id": "1", "parent_id": null, "path": "/1", "explicit_path": null, "label": null },
//!     ...
//!   ]
//! }
//! ```
//!
//! Rows are written ordered by key. Loading rejects duplicate keys.
//!
//! # Example
//!
//! ```ignore
//! use matpath_memory::MemoryStore;
//!
//! store.save_snapshot("tree.json")?;
//! let restored = MemoryStore::load_snapshot("tree.json")?;
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use matpath::Node;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MemoryStoreError, MemoryStoreResult};
use crate::store::MemoryStore;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    nodes: Vec<Node>,
}

impl MemoryStore {
    /// Writes every row to a JSON file.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> MemoryStoreResult<()> {
        let path = path.as_ref();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            nodes: self.nodes(),
        };
        let file = File::create(path).map_err(|e| MemoryStoreError::io_error(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &snapshot)
            .map_err(|e| MemoryStoreError::SerializationError(e.to_string()))?;
        info!(path = %path.display(), rows = snapshot.nodes.len(), "saved snapshot");
        Ok(())
    }

    /// Reads a store from a JSON file written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> MemoryStoreResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MemoryStoreError::io_error(path, e))?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| MemoryStoreError::DeserializationError(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(MemoryStoreError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let rows = snapshot.nodes.len();
        let store = Self::from_nodes(snapshot.nodes)?;
        info!(path = %path.display(), rows, "loaded snapshot");
        Ok(store)
    }
}
