use super::StorageBackend;
use crate::error::{PracticeError, Result};
use crate::model::EntityKind;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// One `<collection>.json` file per entity type under a single data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn collection_path(&self, kind: EntityKind) -> PathBuf {
        self.root.join(format!("{}.json", kind.collection()))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(PracticeError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FileStore {
    fn read_collection(&self, kind: EntityKind) -> Result<Option<String>> {
        let path = self.collection_path(kind);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(PracticeError::Io)?;
        Ok(Some(content))
    }

    fn write_collection(&self, kind: EntityKind, contents: &str) -> Result<()> {
        self.ensure_dir()?;
        let target = self.collection_path(kind);

        // Write to a sibling temp file and rename over the target
        let tmp = self
            .root
            .join(format!(".{}-{}.tmp", kind.collection(), Uuid::new_v4()));
        fs::write(&tmp, contents).map_err(PracticeError::Io)?;
        fs::rename(&tmp, &target).map_err(PracticeError::Io)?;
        Ok(())
    }
}
