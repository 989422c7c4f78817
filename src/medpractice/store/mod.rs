//! # Storage Layer
//!
//! Storage is split in two halves:
//!
//! - [`table`]: the in-memory tables ([`table::Records`]) that the repository
//!   reads and validates against. Identity assignment lives here.
//! - [`StorageBackend`]: raw snapshot I/O. A backend only knows how to read and
//!   write the serialized form of one collection at a time.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage, one JSON array per collection
//! - [`memory::InMemoryStore`]: tests and offline proxies, no persistence
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <data dir>/
//! ├── patients.json       # JSON array, ordered by id
//! ├── physicians.json
//! ├── appointments.json
//! └── notes.json
//! ```
//!
//! Every mutation rewrites the whole file of the collection it touched. There is
//! no append log; the snapshot is the state.

use crate::error::Result;
use crate::model::{Entity, EntityKind};

pub mod fs;
pub mod memory;
pub mod table;

/// Abstract interface for collection snapshots.
///
/// Implementations are shared across threads by the server, hence `Send + Sync`.
pub trait StorageBackend: Send + Sync {
    /// Read the serialized collection. `Ok(None)` means it was never written.
    fn read_collection(&self, kind: EntityKind) -> Result<Option<String>>;

    /// Replace the serialized collection. Must not leave a partial file behind.
    fn write_collection(&self, kind: EntityKind, contents: &str) -> Result<()>;
}

pub fn load_rows<T: Entity, S: StorageBackend + ?Sized>(backend: &S) -> Result<Vec<T>> {
    match backend.read_collection(T::KIND)? {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Vec::new()),
    }
}

pub fn save_rows<T: Entity, S: StorageBackend + ?Sized>(backend: &S, rows: &[T]) -> Result<()> {
    let contents = serde_json::to_string_pretty(rows)?;
    backend.write_collection(T::KIND, &contents)?;
    tracing::debug!(collection = T::KIND.collection(), rows = rows.len(), "snapshot written");
    Ok(())
}
