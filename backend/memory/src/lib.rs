pub mod catalog;
pub mod embeddings;
pub mod retriever;
pub mod store;
pub mod types;

pub use catalog::{Catalog, Product};
pub use embeddings::{EmbeddingProvider, EngineEmbeddings};
pub use retriever::{CatalogRetriever, Retriever};
pub use store::{InMemoryVectorStore, MemoryStore};
pub use types::{Document, MemoryQuery, SearchResult, VectorEntry};
