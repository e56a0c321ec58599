//! # Rule Engine
//!
//! Evaluates knowledge-base rules scoped to a middleware type against a
//! diagnosis context's metrics, producing recommendations sorted by
//! descending priority. A single rule's evaluation failure is logged and
//! skipped rather than aborting the pass.

use std::collections::HashMap;
use std::sync::Arc;

use diagnose_shared::models::{Issue, Recommendation};
use tracing::{instrument, warn};

use crate::expression::ConditionEvaluator;
use crate::knowledge_base::{KnowledgeBase, QueryOptions};

#[derive(Debug)]
pub struct RuleEngine {
    knowledge_base: Arc<KnowledgeBase>,
    evaluator: Arc<dyn ConditionEvaluator>,
}

impl RuleEngine {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        Self {
            knowledge_base,
            evaluator,
        }
    }

    /// Evaluates every rule scoped to `middleware_type` against `metrics`.
    /// `issues_so_far` is accepted for forward compatibility with
    /// conditions that reference detector output, but the current
    /// expression surface only addresses `metrics`.
    #[instrument(skip(self, metrics, issues_so_far), fields(middleware_type))]
    pub fn evaluate(
        &self,
        middleware_type: &str,
        metrics: &HashMap<String, f64>,
        issues_so_far: &[Issue],
    ) -> Vec<Recommendation> {
        let _ = issues_so_far;

        let rules = self.knowledge_base.query(&QueryOptions {
            middleware_type: Some(middleware_type.to_string()),
            ..Default::default()
        });

        let mut matches = Vec::new();
        for rule in rules {
            match self.evaluator.evaluate(&rule.condition, metrics) {
                Ok(true) => matches.push(Recommendation {
                    title: rule.name.clone(),
                    action: rule.recommendation.clone(),
                    priority: rule.priority,
                    confidence: 1.0,
                    rule_id: Some(rule.id),
                    metadata: HashMap::new(),
                }),
                Ok(false) => {}
                Err(e) => {
                    warn!(rule_id = %rule.id, error = %e, "skipping rule with evaluation error");
                }
            }
        }

        matches.sort_by(|a, b| b.priority.cmp(&a.priority));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::JaqConditionEvaluator;
    use chrono::Utc;
    use diagnose_shared::models::{IssueSeverity, Rule};
    use uuid::Uuid;

    fn rule(condition: &str, priority: i32) -> Rule {
        Rule {
            id: Uuid::new_v4(),
            name: "test-rule".to_string(),
            middleware_type: "redis".to_string(),
            category: "test".to_string(),
            severity: IssueSeverity::Warning,
            condition: condition.to_string(),
            recommendation: "scale up".to_string(),
            priority,
            tags: Vec::new(),
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn engine(rules: Vec<Rule>) -> RuleEngine {
        let kb = Arc::new(KnowledgeBase::new());
        for r in rules {
            kb.add(r).unwrap();
        }
        RuleEngine::new(kb, Arc::new(JaqConditionEvaluator::new()))
    }

    #[test]
    fn matching_rule_produces_full_confidence_recommendation() {
        let engine = engine(vec![rule(".memory_usage > 80", 10)]);
        let mut metrics = HashMap::new();
        metrics.insert("memory_usage".to_string(), 95.0);

        let recs = engine.evaluate("redis", &metrics, &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, 1.0);
        assert_eq!(recs[0].priority, 10);
    }

    #[test]
    fn non_matching_rule_produces_no_recommendation() {
        let engine = engine(vec![rule(".memory_usage > 80", 10)]);
        let mut metrics = HashMap::new();
        metrics.insert("memory_usage".to_string(), 10.0);

        assert!(engine.evaluate("redis", &metrics, &[]).is_empty());
    }

    #[test]
    fn evaluation_error_on_one_rule_does_not_block_others() {
        let engine = engine(vec![rule("not valid jq {{{", 50), rule(".memory_usage > 80", 10)]);
        let mut metrics = HashMap::new();
        metrics.insert("memory_usage".to_string(), 95.0);

        let recs = engine.evaluate("redis", &metrics, &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, 10);
    }

    #[test]
    fn results_sorted_descending_by_priority() {
        let engine = engine(vec![
            rule(".memory_usage > 0", 5),
            rule(".memory_usage > 0", 50),
            rule(".memory_usage > 0", 20),
        ]);
        let mut metrics = HashMap::new();
        metrics.insert("memory_usage".to_string(), 1.0);

        let recs = engine.evaluate("redis", &metrics, &[]);
        let priorities: Vec<i32> = recs.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![50, 20, 5]);
    }

    #[test]
    fn scoped_to_middleware_type_only() {
        let mut mysql_rule = rule(".memory_usage > 0", 10);
        mysql_rule.middleware_type = "mysql".to_string();
        let engine = engine(vec![mysql_rule]);

        let mut metrics = HashMap::new();
        metrics.insert("memory_usage".to_string(), 1.0);
        assert!(engine.evaluate("redis", &metrics, &[]).is_empty());
    }
}
