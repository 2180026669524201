//! SQLite-backed chunk store.
//!
//! Cosine similarity is computed in Rust over every stored row; a session holds the
//! transcript of a handful of videos at most.

use super::DataType;
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        source_url TEXT NOT NULL,
        title TEXT NOT NULL,
        data_type TEXT NOT NULL,
        content TEXT NOT NULL,
        chunk_order INTEGER NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_source_url ON chunks(source_url);
"#;

/// A chunk with its embedding, as stored.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub id: Uuid,
    pub source_url: String,
    pub title: String,
    pub data_type: DataType,
    pub content: String,
    pub order: i32,
    pub embedding: Vec<f32>,
    pub indexed_at: DateTime<Utc>,
}

impl StoredChunk {
    pub fn new(
        source_url: String,
        title: String,
        data_type: DataType,
        content: String,
        order: i32,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_url,
            title,
            data_type,
            content,
            order,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search hit.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: StoredChunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Storage and similarity search over embedded chunks.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Replace every chunk of `source_url` with `chunks`.
    async fn replace_source(&self, source_url: &str, chunks: &[StoredChunk]) -> Result<usize>;

    /// Most similar chunks first.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;

    /// Total number of stored chunks.
    async fn chunk_count(&self) -> Result<usize>;
}

/// SQLite-based chunk store.
pub struct SqliteChunkStore {
    conn: Mutex<Connection>,
}

impl SqliteChunkStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized chunk store at {:?}", path);
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
            .map_err(|e| TubechatError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

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
impl ChunkStore for SqliteChunkStore {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn replace_source(&self, source_url: &str, chunks: &[StoredChunk]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let deleted = tx.execute("DELETE FROM chunks WHERE source_url = ?1", params![source_url])?;
        if deleted > 0 {
            debug!("Replaced {} existing chunks for {}", deleted, source_url);
        }

        for chunk in chunks {
            tx.execute(
                r#"
                INSERT INTO chunks
                (id, source_url, title, data_type, content, chunk_order, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    chunk.id.to_string(),
                    source_url,
                    chunk.title,
                    chunk.data_type.to_string(),
                    chunk.content,
                    chunk.order,
                    Self::embedding_to_bytes(&chunk.embedding),
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Stored {} chunks for {}", chunks.len(), source_url);
        Ok(chunks.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source_url, title, data_type, content, chunk_order, embedding, indexed_at
            FROM chunks
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let data_type: String = row.get(3)?;
            let embedding: Vec<u8> = row.get(6)?;
            let indexed_at: String = row.get(7)?;

            Ok(StoredChunk {
                id: Uuid::parse_str(&id).unwrap_or_default(),
                source_url: row.get(1)?,
                title: row.get(2)?,
                data_type: data_type.parse().unwrap_or(DataType::Text),
                content: row.get(4)?,
                order: row.get(5)?,
                embedding: Self::bytes_to_embedding(&embedding),
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            let chunk = row?;
            let score = cosine_similarity(query_embedding, &chunk.embedding);
            results.push(ScoredChunk { chunk, score });
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.order.cmp(&b.chunk.order))
        });
        results.truncate(limit);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(url: &str, content: &str, order: i32, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk::new(
            url.to_string(),
            "Unknown".to_string(),
            DataType::Text,
            content.to_string(),
            order,
            embedding,
        )
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = SqliteChunkStore::in_memory().unwrap();
        store
            .replace_source(
                "https://www.youtube.com/watch?v=a",
                &[
                    chunk("https://www.youtube.com/watch?v=a", "first", 0, vec![1.0, 0.0, 0.0]),
                    chunk("https://www.youtube.com/watch?v=a", "second", 1, vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = store.search(&[0.1, 1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "second");
        assert!(results[0].score > results[1].score);

        let limited = store.search(&[1.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].chunk.content, "first");
        assert_eq!(limited[0].chunk.embedding, vec![1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_replace_source_only_touches_that_source() {
        let store = SqliteChunkStore::in_memory().unwrap();
        store
            .replace_source("a", &[chunk("a", "one", 0, vec![1.0]), chunk("a", "two", 1, vec![1.0])])
            .await
            .unwrap();
        store.replace_source("b", &[chunk("b", "three", 0, vec![1.0])]).await.unwrap();
        assert_eq!(store.chunk_count().await.unwrap(), 3);

        store.replace_source("a", &[chunk("a", "four", 0, vec![1.0])]).await.unwrap();
        assert_eq!(store.chunk_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteChunkStore::new(&dir.path().join("session").join("knowledge.db")).unwrap();
        store.replace_source("a", &[chunk("a", "one", 0, vec![0.5, 0.5])]).await.unwrap();
        assert_eq!(store.chunk_count().await.unwrap(), 1);
    }
}
