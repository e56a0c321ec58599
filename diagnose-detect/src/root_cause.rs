//! # Root-Cause Engine
//!
//! Matches a set of anomalies against a declared list of `RcaRule`s: a rule
//! matches iff every one of its conditions is satisfied by at least one
//! anomaly present. Matches are sorted descending by priority, ties broken
//! by declaration order, and the top match's confidence is computed by a
//! pure formula so it can be tested independent of the matching pass.

use diagnose_shared::models::{Anomaly, RcaCondition, RcaRule, RootCauseResult};

#[derive(Debug, Default)]
pub struct RootCauseEngine {
    rules: Vec<RcaRule>,
}

impl RootCauseEngine {
    pub fn new(rules: Vec<RcaRule>) -> Self {
        Self { rules }
    }

    pub fn analyze(&self, anomalies: &[Anomaly]) -> RootCauseResult {
        let mut matches: Vec<(usize, &RcaRule)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule_matches(rule, anomalies))
            .collect();

        // Stable sort descending by priority; equal priorities keep their
        // original enumerate() order, i.e. declaration order.
        matches.sort_by(|a, b| b.1.priority.cmp(&a.1.priority));

        match matches.first() {
            Some((_, rule)) => RootCauseResult {
                root_cause: rule.root_cause.clone(),
                confidence: confidence_for(rule.priority, rule.conditions.len()),
                actions: rule.actions.clone(),
            },
            None => RootCauseResult::unknown(),
        }
    }
}

fn rule_matches(rule: &RcaRule, anomalies: &[Anomaly]) -> bool {
    if rule.conditions.is_empty() {
        return false;
    }
    rule.conditions.iter().all(|condition| condition_satisfied(condition, anomalies))
}

fn condition_satisfied(condition: &RcaCondition, anomalies: &[Anomaly]) -> bool {
    anomalies.iter().any(|a| {
        a.anomaly_type == condition.anomaly_type
            && condition.severity.map(|s| s == a.severity).unwrap_or(true)
    })
}

/// Pure confidence formula: base 0.7, +0.1 if priority > 50, +0.2 if
/// priority > 80, +0.05 if the rule had more than one condition, clamped
/// to 1.0.
pub fn confidence_for(priority: i32, condition_count: usize) -> f64 {
    let mut confidence: f64 = 0.7;
    if priority > 50 {
        confidence += 0.1;
    }
    if priority > 80 {
        confidence += 0.2;
    }
    if condition_count > 1 {
        confidence += 0.05;
    }
    confidence.min(1.0)
}
