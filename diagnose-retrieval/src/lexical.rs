//! # Lexical (BM25) Retriever
//!
//! A self-contained inverted index scored with BM25. No external
//! collaborator is required — unlike semantic search, which needs an
//! embedder and a vector store, keyword search is fully expressible
//! in-process and is exercised directly by the hybrid-retrieval tests.

use std::collections::HashMap;

use async_trait::async_trait;
use diagnose_shared::models::RetrievedDocument;
use serde_json::Value;

use crate::retriever::{RetrievalError, Retriever};

const K1: f64 = 1.5;
const B: f64 = 0.75;

#[derive(Debug, Clone)]
struct IndexedDocument {
    content: String,
    metadata: Value,
    term_counts: HashMap<String, usize>,
    length: usize,
}

#[derive(Debug, Default)]
pub struct LexicalRetriever {
    documents: Vec<IndexedDocument>,
    document_frequency: HashMap<String, usize>,
}

impl LexicalRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&mut self, content: impl Into<String>) {
        self.index_with_metadata(content, Value::Null);
    }

    pub fn index_with_metadata(&mut self, content: impl Into<String>, metadata: Value) {
        let content = content.into();
        let terms = tokenize(&content);
        let mut term_counts = HashMap::new();
        for term in &terms {
            *term_counts.entry(term.clone()).or_insert(0) += 1;
        }
        for term in term_counts.keys() {
            *self.document_frequency.entry(term.clone()).or_insert(0) += 1;
        }
        self.documents.push(IndexedDocument {
            content,
            metadata,
            length: terms.len(),
            term_counts,
        });
    }

    fn average_document_length(&self) -> f64 {
        if self.documents.is_empty() {
            return 0.0;
        }
        self.documents.iter().map(|d| d.length as f64).sum::<f64>() / self.documents.len() as f64
    }

    fn bm25_score(&self, query_terms: &[String], doc: &IndexedDocument) -> f64 {
        let n = self.documents.len() as f64;
        let avg_len = self.average_document_length();

        query_terms
            .iter()
            .map(|term| {
                let df = *self.document_frequency.get(term).unwrap_or(&0) as f64;
                if df == 0.0 {
                    return 0.0;
                }
                let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                let tf = *doc.term_counts.get(term).unwrap_or(&0) as f64;
                let norm = 1.0 - B + B * (doc.length as f64 / avg_len.max(1.0));
                idf * (tf * (K1 + 1.0)) / (tf + K1 * norm)
            })
            .sum()
    }
}

#[async_trait]
impl Retriever for LexicalRetriever {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidTopK);
        }

        let query_terms = tokenize(query);
        let mut scored: Vec<RetrievedDocument> = self
            .documents
            .iter()
            .map(|doc| {
                let score = self.bm25_score(&query_terms, doc);
                RetrievedDocument {
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    score,
                }
            })
            .filter(|d| d.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_index() -> LexicalRetriever {
        let mut retriever = LexicalRetriever::new();
        retriever.index("Redis cluster");
        retriever.index("Redis sentinel");
        retriever.index("MongoDB sharding");
        retriever
    }

    #[tokio::test]
    async fn query_ranks_matching_documents_above_non_matching() {
        let retriever = redis_index();
        let results = retriever.search("Redis", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|d| d.content.contains("Redis")));
    }

    #[tokio::test]
    async fn zero_top_k_is_an_error() {
        let retriever = redis_index();
        assert!(matches!(
            retriever.search("Redis", 0).await,
            Err(RetrievalError::InvalidTopK)
        ));
    }

    #[tokio::test]
    async fn no_matching_terms_returns_empty() {
        let retriever = redis_index();
        let results = retriever.search("Kubernetes", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn tokenization_is_case_insensitive() {
        let retriever = redis_index();
        let results = retriever.search("redis", 5).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
