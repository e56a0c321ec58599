//! # Semantic Retriever
//!
//! Embeds the query and runs approximate-nearest-neighbour similarity
//! search against a vector store. Both the embedding model and the vector
//! store are external collaborators — this module defines the seam traits
//! and a generic retriever that composes them, not a concrete embedding
//! model or database client.

use async_trait::async_trait;
use diagnose_shared::models::RetrievedDocument;

use crate::retriever::{RetrievalError, Retriever};

#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

#[async_trait]
pub trait VectorStore: Send + Sync + std::fmt::Debug {
    /// Returns the top-K nearest documents with their similarity scores
    /// (higher is more similar — implementations own the distance-to-score
    /// conversion).
    async fn similarity_search(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError>;
}

#[derive(Debug)]
pub struct SemanticRetriever<E, S> {
    embedder: E,
    vector_store: S,
}

impl<E, S> SemanticRetriever<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    pub fn new(embedder: E, vector_store: S) -> Self {
        Self { embedder, vector_store }
    }
}

#[async_trait]
impl<E, S> Retriever for SemanticRetriever<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidTopK);
        }
        let embedding = self.embedder.embed(query).await?;
        self.vector_store.similarity_search(&embedding, top_k).await
    }
}
