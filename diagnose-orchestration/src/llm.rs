//! # LLM Augmentation Client
//!
//! An optional collaborator invoked after rule-based recommendations have
//! been assembled. Any failure — timeout, malformed response, parse error
//! — downgrades gracefully: the orchestrator keeps the original
//! recommendations and proceeds without the LLM's contribution.

use std::collections::HashMap;

use async_trait::async_trait;
use diagnose_shared::models::Recommendation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm request timed out")]
    Timeout,
    #[error("llm request failed: {0}")]
    RequestFailed(String),
    #[error("llm response could not be parsed: {0}")]
    ParseFailed(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync + std::fmt::Debug {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Builds the prompt from retrieved passages and structured metric context.
pub fn build_prompt(retrieved_passages: &[String], metrics: &HashMap<String, f64>, query: &str) -> String {
    let context = retrieved_passages.join("\n---\n");
    let metrics_json = serde_json::to_string(metrics).unwrap_or_default();
    format!(
        "query: {query}\ncontext:\n{context}\nmetrics: {metrics_json}\n\nRespond with a JSON array of {{title, action, priority, confidence}} recommendations, where confidence is your own confidence in the recommendation between 0.0 and 1.0."
    )
}

/// Confidence assumed for a well-formed entry that omits `confidence`
/// entirely — a mid-point, not a claim the model vouched for the recommendation.
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Tolerant parse of the model's completion into recommendations. Any
/// entry missing `title` or `action` is skipped rather than failing the
/// whole parse — a partially well-formed response still contributes.
pub fn parse_recommendations(completion: &str) -> Result<Vec<Recommendation>, LlmError> {
    let parsed: serde_json::Value =
        serde_json::from_str(completion).map_err(|e| LlmError::ParseFailed(e.to_string()))?;
    let entries = parsed.as_array().ok_or_else(|| LlmError::ParseFailed("expected a JSON array".to_string()))?;

    let recommendations = entries
        .iter()
        .filter_map(|entry| {
            let title = entry.get("title")?.as_str()?.to_string();
            let action = entry.get("action")?.as_str()?.to_string();
            let priority = entry.get("priority").and_then(|p| p.as_i64()).unwrap_or(0) as i32;
            let confidence = entry
                .get("confidence")
                .and_then(|c| c.as_f64())
                .unwrap_or(DEFAULT_CONFIDENCE)
                .clamp(0.0, 1.0);
            Some(Recommendation {
                title,
                action,
                priority,
                confidence,
                rule_id: None,
                metadata: HashMap::new(),
            })
        })
        .collect();

    Ok(recommendations)
}
