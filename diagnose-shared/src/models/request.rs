//! Diagnosis request and the middleware kinds the engine understands.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Middleware kind named by a diagnosis request.
///
/// `Other` keeps the set open for middleware the engine doesn't ship a
/// built-in collector for but an operator has registered a plugin for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiddlewareKind {
    Redis,
    MySql,
    PostgreSql,
    Kafka,
    RabbitMq,
    Elasticsearch,
    MongoDb,
    Other(String),
}

impl MiddlewareKind {
    /// Canonical string form, used as the rule/index lookup key.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Redis => "redis",
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::Kafka => "kafka",
            Self::RabbitMq => "rabbitmq",
            Self::Elasticsearch => "elasticsearch",
            Self::MongoDb => "mongodb",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl std::fmt::Display for MiddlewareKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for MiddlewareKind {
    fn from(value: &str) -> Self {
        match value {
            "redis" => Self::Redis,
            "mysql" => Self::MySql,
            "postgresql" | "postgres" => Self::PostgreSql,
            "kafka" => Self::Kafka,
            "rabbitmq" => Self::RabbitMq,
            "elasticsearch" => Self::Elasticsearch,
            "mongodb" => Self::MongoDb,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Input to a diagnosis task. Immutable once enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub middleware: MiddlewareKind,
    pub instance: String,
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl DiagnosisRequest {
    pub fn new(middleware: impl Into<MiddlewareKind>, instance: impl Into<String>) -> Self {
        Self {
            middleware: middleware.into(),
            instance: instance.into(),
            filters: HashMap::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// `(middleware, instance)` cache/exclusion key, per the fingerprint
    /// definition: canonicalised as a tuple rather than the legacy
    /// `middleware + "-" + instance` string concatenation.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            middleware: self.middleware.as_str().to_string(),
            instance: self.instance.clone(),
        }
    }
}

impl From<String> for MiddlewareKind {
    fn from(value: String) -> Self {
        MiddlewareKind::from(value.as_str())
    }
}

/// `(middleware, instance)` tuple used for result caching and run exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub middleware: String,
    pub instance: String,
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.middleware, self.instance)
    }
}
