//! Common retrieval contract implemented by every search channel.

use async_trait::async_trait;
use diagnose_shared::models::RetrievedDocument;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),
    #[error("vector store query failed: {0}")]
    VectorStoreFailed(String),
    #[error("lexical index query failed: {0}")]
    LexicalFailed(String),
    #[error("rerank failed: {0}")]
    RerankFailed(String),
    #[error("top_k must be greater than zero")]
    InvalidTopK,
    #[error("all retrieval channels failed")]
    AllChannelsFailed,
}

#[async_trait]
pub trait Retriever: Send + Sync + std::fmt::Debug {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>, RetrievalError>;
}
