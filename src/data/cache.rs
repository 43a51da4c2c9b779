//! Load Cache Module
//! Memoizes normalized tables per (path, row cap). Owned by the caller.

use crate::data::loader::{CollisionTable, DatasetLoader, LoadError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

type CacheKey = (PathBuf, usize);

#[derive(Default)]
pub struct LoadCache {
    tables: HashMap<CacheKey, Arc<CollisionTable>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path, max_rows: usize) -> Option<Arc<CollisionTable>> {
        self.tables.get(&(path.to_path_buf(), max_rows)).cloned()
    }

    pub fn insert(&mut self, table: Arc<CollisionTable>) {
        let key = (table.source().to_path_buf(), table.max_rows());
        self.tables.insert(key, table);
    }

    /// Return the cached table or load and remember it.
    pub fn get_or_load(
        &mut self,
        loader: &DatasetLoader,
        path: &Path,
        max_rows: usize,
    ) -> Result<Arc<CollisionTable>, LoadError> {
        if let Some(table) = self.get(path, max_rows) {
            debug!("cache hit for {} (max_rows={})", path.display(), max_rows);
            return Ok(table);
        }

        let table = Arc::new(loader.load(path, max_rows)?);
        self.insert(Arc::clone(&table));
        Ok(table)
    }

    /// Forget one entry. Returns whether it was present.
    pub fn invalidate(&mut self, path: &Path, max_rows: usize) -> bool {
        self.tables
            .remove(&(path.to_path_buf(), max_rows))
            .is_some()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
