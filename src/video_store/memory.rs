//! In-memory video store.

use super::{VideoRecord, VideoStatus, VideoStore};
use crate::error::{ClipchatError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Video store living for the lifetime of the process.
#[derive(Default)]
pub struct MemoryVideoStore {
    records: RwLock<HashMap<String, VideoRecord>>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, VideoRecord>>> {
        self.records
            .read()
            .map_err(|e| ClipchatError::VideoStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, VideoRecord>>> {
        self.records
            .write()
            .map_err(|e| ClipchatError::VideoStore(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn get(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        Ok(self.read()?.get(video_id).cloned())
    }

    async fn put(&self, record: VideoRecord) -> Result<()> {
        self.write()?.insert(record.video_id.clone(), record);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        video_id: &str,
        expected: Option<VideoStatus>,
        record: VideoRecord,
    ) -> Result<bool> {
        let mut records = self.write()?;
        let current = records.get(video_id).map(|r| r.status);

        if current != expected {
            return Ok(false);
        }

        records.insert(video_id.to_string(), record);
        Ok(true)
    }

    async fn remove(&self, video_id: &str) -> Result<bool> {
        Ok(self.write()?.remove(video_id).is_some())
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let mut records: Vec<VideoRecord> = self.read()?.values().cloned().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_compare_and_set() {
        let store = MemoryVideoStore::new();

        assert!(store
            .compare_and_set("v", None, VideoRecord::pending("v"))
            .await
            .unwrap());
        // Already pending, so an absent-only write is refused
        assert!(!store
            .compare_and_set("v", None, VideoRecord::pending("v"))
            .await
            .unwrap());

        let ready = VideoRecord::ready("v", "sum".into(), "[00:00:00.00] hi".into(), 1);
        assert!(store
            .compare_and_set("v", Some(VideoStatus::Pending), ready.clone())
            .await
            .unwrap());

        assert_eq!(store.get("v").await.unwrap(), Some(ready));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_and_list() {
        let store = MemoryVideoStore::new();
        store.put(VideoRecord::pending("a")).await.unwrap();
        store
            .put(VideoRecord::ready("a", "s".into(), String::new(), 0))
            .await
            .unwrap();
        store.put(VideoRecord::pending("b")).await.unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(store.get("a").await.unwrap().unwrap().is_ready());

        assert!(store.remove("b").await.unwrap());
        assert!(!store.remove("b").await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
