//! Retrieved documents flowing out of the hybrid retrieval layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document surfaced by the retrieval layer.
///
/// Score semantics depend on the retriever: cosine/L2 distance for
/// semantic search, BM25 relevance for lexical search, and a dimensionless
/// fused rank once fusion has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: Value,
    pub score: f64,
}

impl RetrievedDocument {
    pub fn new(content: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            metadata: Value::Null,
            score,
        }
    }

    /// Identity used for de-duplication when fusing rankings: content, not
    /// score (two retrievers may legitimately disagree on score for the
    /// same document).
    pub fn identity(&self) -> &str {
        &self.content
    }
}
