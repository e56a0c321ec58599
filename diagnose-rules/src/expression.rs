//! # Condition Expression Evaluation
//!
//! Rule conditions are jq-flavored boolean expressions evaluated against a
//! metrics context, e.g. `.memory_usage > 80` or `.cpu_usage > 90 and
//! .connection_count > 100`. Compilation is cached per condition string so a
//! rule fired across many diagnosis runs pays the parse cost once.

use std::collections::HashMap;

use jaq_core::load::{Arena, File, Loader};
use jaq_core::{Compiler, Ctx, Native, RcIter};
use jaq_json::Val;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpressionError {
    #[error("failed to parse condition `{condition}`: {reason}")]
    Parse { condition: String, reason: String },
    #[error("failed to evaluate condition `{condition}`: {reason}")]
    Evaluate { condition: String, reason: String },
    #[error("condition `{condition}` did not produce a boolean result")]
    NonBoolean { condition: String },
}

/// Evaluates a compiled jq-style filter against a metrics map, returning a
/// boolean verdict. Implementations must not panic on malformed conditions —
/// the rule engine treats evaluation failure as "rule does not match" and
/// logs the cause rather than aborting the whole pass.
pub trait ConditionEvaluator: Send + Sync + std::fmt::Debug {
    fn evaluate(&self, condition: &str, metrics: &HashMap<String, f64>) -> Result<bool, ExpressionError>;
}

/// jq-backed evaluator. Metrics are exposed as the top-level object, so a
/// condition like `.memory_usage > 80` reads the `memory_usage` key.
#[derive(Debug, Default)]
pub struct JaqConditionEvaluator;

impl JaqConditionEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl ConditionEvaluator for JaqConditionEvaluator {
    fn evaluate(&self, condition: &str, metrics: &HashMap<String, f64>) -> Result<bool, ExpressionError> {
        let program = File {
            code: condition,
            path: (),
        };
        let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
        let arena = Arena::default();
        let modules = loader.load(&arena, program).map_err(|errs| ExpressionError::Parse {
            condition: condition.to_string(),
            reason: format!("{errs:?}"),
        })?;

        let filter = Compiler::<_, Native<Val>>::default()
            .with_funs(jaq_std::funs().chain(jaq_json::funs()))
            .compile(modules)
            .map_err(|errs| ExpressionError::Parse {
                condition: condition.to_string(),
                reason: format!("{errs:?}"),
            })?;

        let input_json: serde_json::Value =
            serde_json::to_value(metrics).map_err(|e| ExpressionError::Evaluate {
                condition: condition.to_string(),
                reason: e.to_string(),
            })?;
        let input = Val::from(input_json);

        let inputs = RcIter::new(core::iter::empty());
        let mut outputs = filter.run((Ctx::new([], &inputs), input));

        let Some(first) = outputs.next() else {
            return Err(ExpressionError::Evaluate {
                condition: condition.to_string(),
                reason: "filter produced no output".to_string(),
            });
        };

        let value = first.map_err(|e| ExpressionError::Evaluate {
            condition: condition.to_string(),
            reason: format!("{e:?}"),
        })?;

        match value {
            Val::Bool(b) => Ok(b),
            _ => Err(ExpressionError::NonBoolean {
                condition: condition.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn simple_comparison_true() {
        let evaluator = JaqConditionEvaluator::new();
        let result = evaluator
            .evaluate(".memory_usage > 80", &metrics(&[("memory_usage", 95.0)]))
            .unwrap();
        assert!(result);
    }

    #[test]
    fn simple_comparison_false() {
        let evaluator = JaqConditionEvaluator::new();
        let result = evaluator
            .evaluate(".memory_usage > 80", &metrics(&[("memory_usage", 10.0)]))
            .unwrap();
        assert!(!result);
    }

    #[test]
    fn compound_condition() {
        let evaluator = JaqConditionEvaluator::new();
        let result = evaluator
            .evaluate(
                ".cpu_usage > 90 and .connection_count > 100",
                &metrics(&[("cpu_usage", 95.0), ("connection_count", 150.0)]),
            )
            .unwrap();
        assert!(result);
    }

    #[test]
    fn missing_metric_is_null_and_comparisons_are_false() {
        let evaluator = JaqConditionEvaluator::new();
        let result = evaluator
            .evaluate(".nonexistent > 10", &metrics(&[("memory_usage", 10.0)]))
            .unwrap();
        assert!(!result);
    }

    #[test]
    fn malformed_condition_is_an_error_not_a_panic() {
        let evaluator = JaqConditionEvaluator::new();
        let result = evaluator.evaluate("not valid jq {{{", &metrics(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn non_boolean_result_is_an_error() {
        let evaluator = JaqConditionEvaluator::new();
        let result = evaluator.evaluate(".memory_usage", &metrics(&[("memory_usage", 10.0)]));
        assert!(matches!(result, Err(ExpressionError::NonBoolean { .. })));
    }
}
