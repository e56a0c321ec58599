//! # Hybrid Retrieval
//!
//! Runs a semantic and a lexical channel concurrently, fuses their
//! rankings, and optionally reranks the result. At least one channel must
//! succeed for the search to succeed; a single channel's failure degrades
//! rather than aborts.

use std::sync::Arc;

use diagnose_shared::models::RetrievedDocument;
use tracing::warn;

use crate::fusion::{min_max_normalize, reciprocal_rank_fusion, weighted_sum_fusion};
use crate::rerank::{rerank_or_fallback, Reranker};
use crate::retriever::{RetrievalError, Retriever};

#[derive(Debug, Clone, Copy)]
pub enum FusionStrategy {
    ReciprocalRank { k: f64 },
    WeightedSum { semantic_weight: f64, lexical_weight: f64 },
}

#[derive(Debug)]
pub struct HybridRetriever {
    semantic: Arc<dyn Retriever>,
    lexical: Arc<dyn Retriever>,
    reranker: Option<Arc<dyn Reranker>>,
    fusion: FusionStrategy,
}

impl HybridRetriever {
    pub fn new(
        semantic: Arc<dyn Retriever>,
        lexical: Arc<dyn Retriever>,
        reranker: Option<Arc<dyn Reranker>>,
        fusion: FusionStrategy,
    ) -> Self {
        Self {
            semantic,
            lexical,
            reranker,
            fusion,
        }
    }

    pub async fn search(
        &self,
        query: &str,
        semantic_top_k: usize,
        lexical_top_k: usize,
        rerank_top_n: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        if semantic_top_k == 0 || lexical_top_k == 0 {
            return Err(RetrievalError::InvalidTopK);
        }

        let (semantic_result, lexical_result) = tokio::join!(
            self.semantic.search(query, semantic_top_k),
            self.lexical.search(query, lexical_top_k),
        );

        let semantic_docs = semantic_result.unwrap_or_else(|e| {
            warn!(error = %e, "semantic retrieval failed, continuing with lexical only");
            Vec::new()
        });
        let lexical_docs = lexical_result.unwrap_or_else(|e| {
            warn!(error = %e, "lexical retrieval failed, continuing with semantic only");
            Vec::new()
        });

        if semantic_docs.is_empty() && lexical_docs.is_empty() {
            return Err(RetrievalError::AllChannelsFailed);
        }

        let fused = match self.fusion {
            FusionStrategy::ReciprocalRank { k } => {
                reciprocal_rank_fusion(&[semantic_docs, lexical_docs], k)
            }
            FusionStrategy::WeightedSum {
                semantic_weight,
                lexical_weight,
            } => weighted_sum_fusion(
                &[min_max_normalize(&semantic_docs), min_max_normalize(&lexical_docs)],
                &[semantic_weight, lexical_weight],
            ),
        };

        let result = match &self.reranker {
            Some(reranker) => rerank_or_fallback(reranker.as_ref(), query, fused, rerank_top_n).await,
            None => fused.into_iter().take(rerank_top_n).collect(),
        };

        Ok(result)
    }
}
