/// Embedding providers for catalog retrieval.
///
/// The only production provider delegates to the loaded inference engine,
/// which runs the embedding model next to the chat model.
use std::sync::Arc;

use anyhow::{ensure, Result};
use async_trait::async_trait;
use tracing::debug;

use ragchat_core::Engine;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    /// Embed a batch of texts (default: sequential).
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Engine-backed
// ---------------------------------------------------------------------------

pub struct EngineEmbeddings {
    engine: Arc<dyn Engine>,
    model: String,
}

impl EngineEmbeddings {
    pub fn new(engine: Arc<dyn Engine>, model: impl Into<String>) -> Self {
        Self {
            engine,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for EngineEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response from {}", self.model))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(model = %self.model, count = texts.len(), "Embedding batch");
        let vectors = self.engine.embed(texts, &self.model).await?;
        ensure!(
            vectors.len() == texts.len(),
            "embedding model {} returned {} vectors for {} texts",
            self.model,
            vectors.len(),
            texts.len()
        );
        Ok(vectors)
    }
}
