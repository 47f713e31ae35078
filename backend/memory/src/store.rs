use std::cmp::Ordering;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{MemoryQuery, SearchResult, VectorEntry};

/// Abstract interface for vector storage.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Insert an entry, replacing any entry with the same metadata id.
    async fn upsert(&self, entry: VectorEntry) -> Result<()>;

    /// Search for similar entries, best match first.
    async fn search(&self, query: MemoryQuery) -> Result<Vec<SearchResult>>;

    async fn len(&self) -> usize;
}

/// In-memory vector store using brute-force cosine similarity.
/// Read-only once the catalog has been indexed.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<VectorEntry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cosine similarity of two vectors; 0 for mismatched or zero vectors.
    pub(crate) fn cosine_similarity(v1: &[f32], v2: &[f32]) -> f32 {
        if v1.len() != v2.len() {
            return 0.0;
        }
        let (dot, sq1, sq2) = v1
            .iter()
            .zip(v2)
            .fold((0.0f32, 0.0f32, 0.0f32), |(dot, sq1, sq2), (a, b)| {
                (dot + a * b, sq1 + a * a, sq2 + b * b)
            });
        let norms = sq1.sqrt() * sq2.sqrt();
        if norms == 0.0 { 0.0 } else { dot / norms }
    }
}

#[async_trait]
impl MemoryStore for InMemoryVectorStore {
    async fn upsert(&self, entry: VectorEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.metadata_id == entry.metadata_id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    async fn search(&self, query: MemoryQuery) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().await;
        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|entry| SearchResult {
                entry: entry.clone(),
                score: Self::cosine_similarity(&query.vector, &entry.vector),
            })
            .filter(|r| r.score >= query.min_score)
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(query.limit);

        Ok(results)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
