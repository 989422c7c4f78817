use super::StorageBackend;
use crate::error::{PracticeError, Result};
use crate::model::EntityKind;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Keeps serialized snapshots in memory.
///
/// Used by tests and by client proxies that run without a data directory.
/// Snapshots are stored as the same JSON the file store writes, so the
/// serialization path is exercised either way.
#[derive(Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<EntityKind, String>>,
    simulate_write_error: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail, for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<EntityKind, String>>> {
        self.collections
            .lock()
            .map_err(|_| PracticeError::Store("memory store lock poisoned".to_string()))
    }
}

impl StorageBackend for InMemoryStore {
    fn read_collection(&self, kind: EntityKind) -> Result<Option<String>> {
        Ok(self.lock()?.get(&kind).cloned())
    }

    fn write_collection(&self, kind: EntityKind, contents: &str) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(PracticeError::Store("Simulated write error".to_string()));
        }
        self.lock()?.insert(kind, contents.to_string());
        Ok(())
    }
}
