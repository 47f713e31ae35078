//! Top-k document retrieval over the product catalog.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::catalog::Catalog;
use crate::embeddings::EmbeddingProvider;
use crate::store::{InMemoryVectorStore, MemoryStore};
use crate::types::{Document, MemoryQuery, VectorEntry};

/// Returns the documents most relevant to a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve_top_k(&self, query: &str) -> Result<Vec<Document>>;
}

/// Retriever over an in-memory vector store built once from a catalog.
pub struct CatalogRetriever {
    store: InMemoryVectorStore,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl CatalogRetriever {
    /// Synthesize one document per product, embed them in a single batch and
    /// index the result.
    #[instrument(skip_all, fields(products = catalog.len(), top_k = top_k))]
    pub async fn build(
        catalog: &Catalog,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Result<Self> {
        let documents: Vec<String> = catalog.products().iter().map(|p| p.to_document()).collect();
        let vectors = embedder.embed_batch(&documents).await?;

        let store = InMemoryVectorStore::new();
        for ((product, content), vector) in catalog.products().iter().zip(documents).zip(vectors) {
            store
                .upsert(VectorEntry {
                    metadata_id: product.id,
                    content,
                    vector,
                })
                .await?;
        }

        let documents = store.len().await;
        info!(documents, "Catalog vector store built");
        Ok(Self {
            store,
            embedder,
            top_k,
        })
    }
}

#[async_trait]
impl Retriever for CatalogRetriever {
    async fn retrieve_top_k(&self, query: &str) -> Result<Vec<Document>> {
        let vector = self.embedder.embed(query).await?;
        let results = self
            .store
            .search(MemoryQuery {
                vector,
                limit: self.top_k,
                ..Default::default()
            })
            .await?;
        debug!(hits = results.len(), "Retrieved catalog documents");
        Ok(results.into_iter().map(Document::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    /// Embeds text as keyword presence over a tiny vocabulary.
    struct KeywordEmbeddings;

    const VOCAB: [&str; 3] = ["phone", "perfume", "laptop"];

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbeddings {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(VOCAB
                .iter()
                .map(|w| if lower.contains(w) { 1.0 } else { 0.0 })
                .collect())
        }
    }

    fn product(id: u64, title: &str) -> Product {
        Product {
            id,
            title: title.to_string(),
            description: String::new(),
            price: 10.0,
            rating: 4.0,
            stock: 1,
            discount_percentage: 0.0,
            thumbnail_url: None,
        }
    }

    #[tokio::test]
    async fn test_retrieves_most_similar_first() {
        let catalog = Catalog::new(vec![
            product(1, "Smart phone"),
            product(2, "Perfume oil"),
            product(3, "Gaming laptop"),
        ]);
        let retriever = CatalogRetriever::build(&catalog, Arc::new(KeywordEmbeddings), 2)
            .await
            .unwrap();

        let docs = retriever.retrieve_top_k("cheap perfume please").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata_id, 2);
        assert!(docs[0].content.contains("Perfume oil"));
    }

    #[test]
    fn test_build_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}
        let catalog = Catalog::default();
        let build = CatalogRetriever::build(&catalog, Arc::new(KeywordEmbeddings), 4);
        assert_send(&build);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let retriever = CatalogRetriever::build(&Catalog::default(), Arc::new(KeywordEmbeddings), 4)
            .await
            .unwrap();
        assert!(retriever.retrieve_top_k("anything").await.unwrap().is_empty());
    }
}
