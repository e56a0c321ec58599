//! # Knowledge Base
//!
//! In-memory rule store with secondary indexes by `middleware_type` and by
//! `tag`. A single `RwLock` guards the whole table: reads share, writes
//! (add/update/delete) are exclusive, and index rebuilds happen inside the
//! writer's critical section so a reader never observes a primary table and
//! a stale index disagreeing about the same rule.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use diagnose_shared::models::{IssueSeverity, Rule, RuleValidationError};
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Indexes {
    by_middleware: HashMap<String, HashSet<Uuid>>,
    by_tag: HashMap<String, HashSet<Uuid>>,
}

impl Indexes {
    fn insert(&mut self, rule: &Rule) {
        self.by_middleware
            .entry(rule.middleware_type.clone())
            .or_default()
            .insert(rule.id);
        for tag in &rule.tags {
            self.by_tag.entry(tag.clone()).or_default().insert(rule.id);
        }
    }

    /// Removes every index entry pointing at `rule`, including tags it no
    /// longer carries after an update — the stale-index bug this store must
    /// not reproduce.
    fn remove(&mut self, rule: &Rule) {
        if let Some(set) = self.by_middleware.get_mut(&rule.middleware_type) {
            set.remove(&rule.id);
            if set.is_empty() {
                self.by_middleware.remove(&rule.middleware_type);
            }
        }
        for tag in &rule.tags {
            if let Some(set) = self.by_tag.get_mut(tag) {
                set.remove(&rule.id);
                if set.is_empty() {
                    self.by_tag.remove(tag);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    rules: HashMap<Uuid, Rule>,
    indexes: Indexes,
}

#[derive(Debug, Default)]
pub struct QueryOptions {
    pub middleware_type: Option<String>,
    pub severity: Option<Vec<IssueSeverity>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct KnowledgeBase {
    inner: RwLock<Inner>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub fn add(&self, rule: Rule) -> Result<(), RuleValidationError> {
        rule.validate()?;
        let mut inner = self.inner.write().expect("knowledge base lock poisoned");
        inner.indexes.insert(&rule);
        inner.rules.insert(rule.id, rule);
        Ok(())
    }

    #[instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub fn update(&self, rule: Rule) -> Result<(), RuleValidationError> {
        rule.validate()?;
        let mut inner = self.inner.write().expect("knowledge base lock poisoned");
        if let Some(existing) = inner.rules.get(&rule.id).cloned() {
            inner.indexes.remove(&existing);
        }
        inner.indexes.insert(&rule);
        inner.rules.insert(rule.id, rule);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().expect("knowledge base lock poisoned");
        match inner.rules.remove(&id) {
            Some(removed) => {
                inner.indexes.remove(&removed);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Rule> {
        let inner = self.inner.read().expect("knowledge base lock poisoned");
        inner.rules.get(&id).cloned()
    }

    /// Intersects filters in the order: `middleware_type` (index lookup),
    /// then `severity`, then `tags`. Results are sorted descending by
    /// `priority`.
    pub fn query(&self, opts: &QueryOptions) -> Vec<Rule> {
        let inner = self.inner.read().expect("knowledge base lock poisoned");

        let mut candidates: Vec<Rule> = match &opts.middleware_type {
            Some(middleware) => inner
                .indexes
                .by_middleware
                .get(middleware)
                .map(|ids| ids.iter().filter_map(|id| inner.rules.get(id).cloned()).collect())
                .unwrap_or_default(),
            None => inner.rules.values().cloned().collect(),
        };

        if let Some(severities) = &opts.severity {
            candidates.retain(|r| severities.contains(&r.severity));
        }

        if let Some(tags) = &opts.tags {
            candidates.retain(|r| tags.iter().any(|t| r.tags.contains(t)));
        }

        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        candidates
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("knowledge base lock poisoned").rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
