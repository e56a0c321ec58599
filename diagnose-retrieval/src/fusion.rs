//! # Fusion Strategies
//!
//! Combines multiple rankings of the same underlying document set into one.
//! Both strategies dedupe on [`RetrievedDocument::identity`] — content, not
//! score — since two channels may disagree on a document's score without
//! disagreeing that it's the same document.
//!
//! `weighted_sum_fusion` takes scores that are already normalised to a
//! common scale; callers retrieving from channels with incomparable native
//! scales (cosine distance vs. BM25) normalise each channel first with
//! [`min_max_normalize`].

use std::collections::HashMap;

use diagnose_shared::models::RetrievedDocument;

/// Reciprocal Rank Fusion: `score(d) = Σ 1/(k + rank_i(d))` over every
/// ranking `d` appears in, 1-indexed rank. Typical `k = 60`.
pub fn reciprocal_rank_fusion(rankings: &[Vec<RetrievedDocument>], k: f64) -> Vec<RetrievedDocument> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    let mut representative: HashMap<String, RetrievedDocument> = HashMap::new();

    for ranking in rankings {
        for (idx, doc) in ranking.iter().enumerate() {
            let rank = (idx + 1) as f64;
            *scores.entry(doc.identity().to_string()).or_insert(0.0) += 1.0 / (k + rank);
            representative.entry(doc.identity().to_string()).or_insert_with(|| doc.clone());
        }
    }

    finalize(scores, representative)
}

/// Weighted sum over scores already on a common scale. `rankings` and
/// `weights` must be the same length; weights are expected to sum to 1.0
/// but this function does not enforce it — callers validate at the
/// configuration boundary.
pub fn weighted_sum_fusion(rankings: &[Vec<RetrievedDocument>], weights: &[f64]) -> Vec<RetrievedDocument> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    let mut representative: HashMap<String, RetrievedDocument> = HashMap::new();

    for (ranking, weight) in rankings.iter().zip(weights) {
        for doc in ranking {
            *scores.entry(doc.identity().to_string()).or_insert(0.0) += weight * doc.score;
            representative.entry(doc.identity().to_string()).or_insert_with(|| doc.clone());
        }
    }

    finalize(scores, representative)
}

/// Rescales a ranking's scores into `[0, 1]`. A ranking with zero spread
/// (every score identical, including a single-document ranking) maps every
/// score to `1.0` — there is no information to discard by dividing by zero.
pub fn min_max_normalize(ranking: &[RetrievedDocument]) -> Vec<RetrievedDocument> {
    if ranking.is_empty() {
        return Vec::new();
    }
    let min = ranking.iter().map(|d| d.score).fold(f64::INFINITY, f64::min);
    let max = ranking.iter().map(|d| d.score).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    ranking
        .iter()
        .map(|d| {
            let mut normalized = d.clone();
            normalized.score = if range == 0.0 { 1.0 } else { (d.score - min) / range };
            normalized
        })
        .collect()
}

fn finalize(
    scores: HashMap<String, f64>,
    representative: HashMap<String, RetrievedDocument>,
) -> Vec<RetrievedDocument> {
    let mut fused: Vec<RetrievedDocument> = scores
        .into_iter()
        .map(|(identity, score)| {
            let mut doc = representative.get(&identity).cloned().expect("representative tracked for every scored identity");
            doc.score = score;
            doc
        })
        .collect();
    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    fused
}
