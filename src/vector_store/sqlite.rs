//! SQLite-based vector index.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity. A single video
//! rarely exceeds a few thousand segments, so a full scan per query is acceptable.

use super::{rank, IndexedSegment, SearchHit, VectorIndex};
use crate::error::{ClipchatError, Result};
use crate::transcript::Segment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS segments (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        video_id TEXT NOT NULL,
        text TEXT NOT NULL,
        start_seconds REAL NOT NULL,
        timestamp TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_segments_collection ON segments(collection);
"#;

/// SQLite-based vector index.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
}

impl SqliteVectorIndex {
    /// Open (or create) an index at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite index (useful for testing).
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
            .map_err(|e| ClipchatError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn upsert(&self, collection: &str, items: &[IndexedSegment]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for item in items {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO segments
                (id, collection, video_id, text, start_seconds, timestamp, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    item.id.to_string(),
                    collection,
                    item.segment.video_id,
                    item.segment.text,
                    item.segment.start_seconds,
                    item.segment.timestamp,
                    Self::embedding_to_bytes(&item.embedding),
                    item.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Upserted {} segments into {}", items.len(), collection);
        Ok(items.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, video_id, text, start_seconds, timestamp, embedding, indexed_at
            FROM segments
            WHERE collection = ?1
            "#,
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(5)?;
            let indexed_at_str: String = row.get(6)?;

            Ok(IndexedSegment {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                segment: Segment {
                    video_id: row.get(1)?,
                    text: row.get(2)?,
                    start_seconds: row.get(3)?,
                    timestamp: row.get(4)?,
                },
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let hits = rank(rows.filter_map(|r| r.ok()), query_embedding, limit);

        debug!("Found {} matching segments", hits.len());
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn clear(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM segments WHERE collection = ?1",
            params![collection],
        )?;

        info!("Cleared {} segments from {}", deleted, collection);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn promote(&self, staging: &str, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM segments WHERE collection = ?1", params![collection])?;
        let promoted = tx.execute(
            "UPDATE segments SET collection = ?1 WHERE collection = ?2",
            params![collection, staging],
        )?;
        tx.commit()?;

        info!("Promoted {} segments from {} into {}", promoted, staging, collection);
        Ok(promoted)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM segments WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT collection FROM segments ORDER BY collection")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(names.filter_map(|n| n.ok()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::segment;

    #[tokio::test]
    async fn test_sqlite_vector_index() {
        let index = SqliteVectorIndex::in_memory().unwrap();

        let item = IndexedSegment::new(
            segment("video1", "This is test content", 61.5),
            vec![1.0, 0.0, 0.0],
        );
        index.upsert("yt-video1", &[item]).await.unwrap();

        assert_eq!(index.collections().await.unwrap(), vec!["yt-video1"]);
        assert_eq!(index.count("yt-video1").await.unwrap(), 1);
        assert_eq!(index.count("yt-other").await.unwrap(), 0);

        let hits = index.search("yt-video1", &[1.0, 0.0, 0.0], 8).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 1.0).abs() < 0.001);
        assert_eq!(hits[0].segment.timestamp, "00:01:01.50");
        assert_eq!(hits[0].segment.video_id, "video1");

        assert!(index.search("yt-other", &[1.0, 0.0, 0.0], 8).await.unwrap().is_empty());

        assert_eq!(index.clear("yt-video1").await.unwrap(), 1);
        assert!(index.collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_promote_replaces_collection() {
        let index = SqliteVectorIndex::in_memory().unwrap();

        let old: Vec<IndexedSegment> = (0..3)
            .map(|i| IndexedSegment::new(segment("v", "old", i as f64), vec![1.0, 0.0]))
            .collect();
        index.upsert("yt-v", &old).await.unwrap();

        let fresh = IndexedSegment::new(segment("v", "fresh", 0.0), vec![1.0, 0.0]);
        index.upsert("yt-v.staging", &[fresh]).await.unwrap();

        assert_eq!(index.promote("yt-v.staging", "yt-v").await.unwrap(), 1);
        assert_eq!(index.collections().await.unwrap(), vec!["yt-v"]);

        let hits = index.search("yt-v", &[1.0, 0.0], 8).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].segment.text, "fresh");
    }

    #[tokio::test]
    async fn test_sqlite_index_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let index = SqliteVectorIndex::new(&path).unwrap();
            let item = IndexedSegment::new(segment("v", "kept", 0.0), vec![0.5, 0.5]);
            index.upsert("yt-v", &[item]).await.unwrap();
        }

        let index = SqliteVectorIndex::new(&path).unwrap();
        let hits = index.search("yt-v", &[0.5, 0.5], 8).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].segment.text, "kept");
    }

    #[test]
    fn test_embedding_bytes_roundtrip() {
        let embedding = vec![0.25_f32, -1.5, 3.0];
        let bytes = SqliteVectorIndex::embedding_to_bytes(&embedding);
        assert_eq!(SqliteVectorIndex::bytes_to_embedding(&bytes), embedding);
    }
}
