//! In-memory vector index.
//!
//! Useful for testing and single-process sessions.

use super::{rank, IndexedSegment, SearchHit, VectorIndex};
use crate::error::{ClipchatError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Collections = HashMap<String, Vec<IndexedSegment>>;

/// In-memory vector index keyed by collection name.
#[derive(Default)]
pub struct MemoryVectorIndex {
    collections: RwLock<Collections>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| ClipchatError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| ClipchatError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, collection: &str, items: &[IndexedSegment]) -> Result<usize> {
        let mut collections = self.write()?;
        let entries = collections.entry(collection.to_string()).or_default();

        for item in items {
            match entries.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item.clone(),
                None => entries.push(item.clone()),
            }
        }

        Ok(items.len())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let collections = self.read()?;
        let items = collections.get(collection).cloned().unwrap_or_default();
        Ok(rank(items.into_iter(), query_embedding, limit))
    }

    async fn clear(&self, collection: &str) -> Result<usize> {
        let mut collections = self.write()?;
        Ok(collections.remove(collection).map(|v| v.len()).unwrap_or(0))
    }

    async fn promote(&self, staging: &str, collection: &str) -> Result<usize> {
        let mut collections = self.write()?;
        let items = collections.remove(staging).unwrap_or_default();
        let promoted = items.len();

        if items.is_empty() {
            collections.remove(collection);
        } else {
            collections.insert(collection.to_string(), items);
        }
        Ok(promoted)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.read()?;
        Ok(collections.get(collection).map(Vec::len).unwrap_or(0))
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let collections = self.read()?;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
