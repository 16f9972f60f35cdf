pub mod pinecone;

pub use pinecone::PineconeStore;

use anyhow::Result;
use async_trait::async_trait;
use sitepath_common::config::VectorStoreConfig;
use sitepath_common::SourceDocument;
use std::sync::Arc;

/// Similarity search over ingested document chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns up to `k` documents, most similar first, with their scores.
    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<(SourceDocument, f32)>>;
}

pub fn create_vector_store(config: &VectorStoreConfig) -> Option<Arc<dyn VectorStore>> {
    let api_key = config.api_key.clone()?;
    let index_host = config.index_host.clone()?;
    Some(Arc::new(PineconeStore::new(
        api_key,
        index_host,
        config.namespace.clone(),
        config.text_key.clone(),
    )))
}
