use crate::crawler::ExtractedResult;
use crate::storage::export::{export_results, import_results};
use crate::storage::traits::{ResultStore, StorageResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Entries = HashMap<String, Vec<ExtractedResult>>;

/// In-memory result store
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    entries: RwLock<Entries>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes every entry to `path` as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> StorageResult<usize> {
        export_results(self, path)
    }

    /// Loads entries from a file written by [`save_to_file`](Self::save_to_file)
    ///
    /// Loaded targets replace existing entries with the same key; other
    /// entries are kept.
    pub fn load_from_file(&self, path: &Path) -> StorageResult<usize> {
        import_results(self, path)
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultStore for MemoryResultStore {
    fn store(&self, target: &str, results: Vec<ExtractedResult>) -> StorageResult<()> {
        self.write().insert(target.to_string(), results);
        Ok(())
    }

    fn get(&self, target: &str) -> StorageResult<Option<Vec<ExtractedResult>>> {
        Ok(self.read().get(target).cloned())
    }

    fn get_all(&self) -> StorageResult<HashMap<String, Vec<ExtractedResult>>> {
        Ok(self.read().clone())
    }

    fn clear(&self) -> StorageResult<()> {
        self.write().clear();
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.read().len())
    }
}
