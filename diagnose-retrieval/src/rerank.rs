//! # Reranker
//!
//! Optional cross-encoder-style rescoring of the top-N fused documents.
//! A reranker failure is never fatal to the search — the caller falls
//! back to the fused ordering.

use async_trait::async_trait;
use diagnose_shared::models::RetrievedDocument;

use crate::retriever::RetrievalError;

#[async_trait]
pub trait Reranker: Send + Sync + std::fmt::Debug {
    async fn rerank(
        &self,
        query: &str,
        docs: Vec<RetrievedDocument>,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError>;
}

/// Reranks `docs` through `reranker`, falling back to the original fused
/// ordering (truncated to `top_k`) on any failure.
pub async fn rerank_or_fallback(
    reranker: &dyn Reranker,
    query: &str,
    docs: Vec<RetrievedDocument>,
    top_k: usize,
) -> Vec<RetrievedDocument> {
    let fallback = docs.iter().take(top_k).cloned().collect::<Vec<_>>();
    match reranker.rerank(query, docs, top_k).await {
        Ok(reranked) => reranked,
        Err(e) => {
            tracing::warn!(error = %e, "reranker failed, falling back to fused ordering");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct ReverseReranker;

    #[async_trait]
    impl Reranker for ReverseReranker {
        async fn rerank(
            &self,
            _query: &str,
            mut docs: Vec<RetrievedDocument>,
            top_k: usize,
        ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
            docs.reverse();
            docs.truncate(top_k);
            Ok(docs)
        }
    }

    #[derive(Debug)]
    struct FailingReranker;

    #[async_trait]
    impl Reranker for FailingReranker {
        async fn rerank(
            &self,
            _query: &str,
            _docs: Vec<RetrievedDocument>,
            _top_k: usize,
        ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
            Err(RetrievalError::RerankFailed("model timeout".to_string()))
        }
    }

    fn docs() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument::new("a", 1.0),
            RetrievedDocument::new("b", 0.9),
        ]
    }

    #[tokio::test]
    async fn successful_rerank_is_used() {
        let result = rerank_or_fallback(&ReverseReranker, "q", docs(), 2).await;
        assert_eq!(result[0].content, "b");
    }

    #[tokio::test]
    async fn failed_rerank_falls_back_to_fused_order() {
        let result = rerank_or_fallback(&FailingReranker, "q", docs(), 2).await;
        assert_eq!(result[0].content, "a");
        assert_eq!(result[1].content, "b");
    }
}
