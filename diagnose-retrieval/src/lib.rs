//! # diagnose-retrieval
//!
//! Semantic, lexical and hybrid document retrieval for the optional LLM
//! augmentation step: fusion strategies, reranking with graceful fallback,
//! and the concurrent hybrid orchestrator tying them together.

pub mod fusion;
pub mod hybrid;
pub mod lexical;
pub mod rerank;
pub mod retriever;
pub mod semantic;

pub use fusion::{min_max_normalize, reciprocal_rank_fusion, weighted_sum_fusion};
pub use hybrid::{FusionStrategy, HybridRetriever};
pub use lexical::LexicalRetriever;
pub use rerank::{rerank_or_fallback, Reranker};
pub use retriever::{RetrievalError, Retriever};
pub use semantic::{Embedder, SemanticRetriever, VectorStore};
