//! SQLite-backed video store, so readiness survives across CLI invocations.

use super::{VideoRecord, VideoStatus, VideoStore};
use crate::error::{ClipchatError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS videos (
        video_id TEXT PRIMARY KEY,
        status TEXT NOT NULL,
        summary TEXT NOT NULL,
        full_transcript TEXT NOT NULL,
        segments_indexed INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

const SELECT_COLUMNS: &str =
    "SELECT video_id, status, summary, full_transcript, segments_indexed, updated_at FROM videos";

/// SQLite-backed video store.
pub struct SqliteVideoStore {
    conn: Mutex<Connection>,
}

impl SqliteVideoStore {
    /// Open (or create) a store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite video store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ClipchatError::VideoStore(format!("Failed to acquire lock: {}", e)))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<VideoRecord> {
        let status: String = row.get(1)?;
        let segments_indexed: i64 = row.get(4)?;
        let updated_at: String = row.get(5)?;

        Ok(VideoRecord {
            video_id: row.get(0)?,
            status: status.parse().unwrap_or(VideoStatus::Pending),
            summary: row.get(2)?,
            full_transcript: row.get(3)?,
            segments_indexed: segments_indexed.max(0) as usize,
            updated_at: DateTime::parse_from_rfc3339(&updated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn write_record(conn: &Connection, record: &VideoRecord) -> Result<()> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO videos
            (video_id, status, summary, full_transcript, segments_indexed, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.video_id,
                record.status.as_str(),
                record.summary,
                record.full_transcript,
                record.segments_indexed as i64,
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl VideoStore for SqliteVideoStore {
    async fn get(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("{} WHERE video_id = ?1", SELECT_COLUMNS),
                params![video_id],
                Self::from_row,
            )
            .optional()?;
        Ok(record)
    }

    #[instrument(skip(self, record), fields(video_id = %record.video_id, status = %record.status))]
    async fn put(&self, record: VideoRecord) -> Result<()> {
        let conn = self.lock()?;
        Self::write_record(&conn, &record)?;
        debug!("Stored video record");
        Ok(())
    }

    #[instrument(skip(self, record))]
    async fn compare_and_set(
        &self,
        video_id: &str,
        expected: Option<VideoStatus>,
        record: VideoRecord,
    ) -> Result<bool> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT status FROM videos WHERE video_id = ?1",
                params![video_id],
                |row| row.get(0),
            )
            .optional()?;
        let current = current.and_then(|s| s.parse::<VideoStatus>().ok());

        if current != expected {
            return Ok(false);
        }

        Self::write_record(&tx, &record)?;
        tx.commit()?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn remove(&self, video_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM videos WHERE video_id = ?1", params![video_id])?;
        Ok(deleted > 0)
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY updated_at DESC", SELECT_COLUMNS))?;
        let records = stmt.query_map([], Self::from_row)?;
        Ok(records.filter_map(|r| r.ok()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_video_store() {
        let store = SqliteVideoStore::in_memory().unwrap();

        assert!(store.get("v").await.unwrap().is_none());
        assert!(store
            .compare_and_set("v", None, VideoRecord::pending("v"))
            .await
            .unwrap());
        assert!(!store
            .compare_and_set("v", Some(VideoStatus::Ready), VideoRecord::pending("v"))
            .await
            .unwrap());

        let ready = VideoRecord::ready("v", "A summary".into(), "[00:00:01.00] hi".into(), 3);
        store.put(ready.clone()).await.unwrap();

        let loaded = store.get("v").await.unwrap().unwrap();
        assert_eq!(loaded.status, VideoStatus::Ready);
        assert_eq!(loaded.summary, "A summary");
        assert_eq!(loaded.full_transcript, "[00:00:01.00] hi");
        assert_eq!(loaded.segments_indexed, 3);

        assert_eq!(store.list().await.unwrap().len(), 1);

        assert!(store.remove("v").await.unwrap());
        assert!(store.get("v").await.unwrap().is_none());
        assert!(!store.remove("v").await.unwrap());
    }

    #[tokio::test]
    async fn test_records_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.db");

        {
            let store = SqliteVideoStore::new(&path).unwrap();
            store
                .put(VideoRecord::ready("v", "s".into(), String::new(), 0))
                .await
                .unwrap();
        }

        let store = SqliteVideoStore::new(&path).unwrap();
        assert!(store.get("v").await.unwrap().unwrap().is_ready());
    }
}
