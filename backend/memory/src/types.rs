use serde::{Deserialize, Serialize};

/// A stored document with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Identifier of the record this document was synthesized from
    pub metadata_id: u64,
    /// The document text
    pub content: String,
    /// The embedding vector
    pub vector: Vec<f32>,
}

/// A nearest-neighbour query against a [`crate::MemoryStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQuery {
    /// The embedding vector of the query
    pub vector: Vec<f32>,
    /// Minimum similarity score (-1.0 to 1.0)
    pub min_score: f32,
    /// Max number of results to return
    pub limit: usize,
}

impl Default for MemoryQuery {
    fn default() -> Self {
        Self {
            vector: vec![],
            min_score: f32::MIN,
            limit: 4,
        }
    }
}

/// Result of a store search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub entry: VectorEntry,
    pub score: f32,
}

/// A retrieved document handed to prompt assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata_id: u64,
}

impl From<SearchResult> for Document {
    fn from(result: SearchResult) -> Self {
        Self {
            content: result.entry.content,
            metadata_id: result.entry.metadata_id,
        }
    }
}
