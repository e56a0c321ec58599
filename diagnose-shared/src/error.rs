//! # Error Taxonomy
//!
//! Unified error type for the diagnosis engine, covering the categories
//! named in the design: plugin resolution/execution, the diagnosis
//! pipeline itself, configuration, LLM/knowledge retrieval, and task
//! infrastructure. Each variant carries a human message and, where the
//! category allows it, a machine-stable `code()` and a `suggestion()` for
//! surfacing in a `Failed` task status.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type DiagnosisResult<T> = Result<T, DiagnosisError>;

#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("plugin not found for middleware: {middleware}")]
    PluginNotFound { middleware: String },

    #[error("failed to load plugin {name}: {reason}")]
    PluginLoadFailed { name: String, reason: String },

    #[error("plugin action failed: {action} - {reason}")]
    PluginActionFailed { action: String, reason: String },

    #[error("capability not supported: {capability}")]
    NotSupported { capability: String },

    #[error("diagnosis failed: {0}")]
    DiagnosisFailed(String),

    #[error("data collection error: {0}")]
    DataCollectionError(String),

    #[error("analysis error: {0}")]
    AnalysisError(String),

    #[error("report generation error: {0}")]
    ReportGenerationError(String),

    #[error("config load failed: {0}")]
    ConfigLoadFailed(String),

    #[error("config validation failed: {0}")]
    ConfigValidationFailed(String),

    #[error("llm request failed: {0}")]
    LlmRequestFailed(String),

    #[error("knowledge retrieval failed: {0}")]
    KnowledgeRetrievalFailed(String),

    #[error("task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("queue is full")]
    QueueFull,

    #[error("dequeue cancelled")]
    DequeueCancelled,

    #[error("unknown task type: {task_type}")]
    UnknownTaskType { task_type: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DiagnosisError {
    /// Stable machine code for this error, for the status API's `error.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PluginNotFound { .. } => "PLUGIN_NOT_FOUND",
            Self::PluginLoadFailed { .. } => "PLUGIN_LOAD_FAILED",
            Self::PluginActionFailed { .. } => "PLUGIN_ACTION_FAILED",
            Self::NotSupported { .. } => "NOT_SUPPORTED",
            Self::DiagnosisFailed(_) => "DIAGNOSIS_FAILED",
            Self::DataCollectionError(_) => "DATA_COLLECTION_ERROR",
            Self::AnalysisError(_) => "ANALYSIS_ERROR",
            Self::ReportGenerationError(_) => "REPORT_GENERATION_ERROR",
            Self::ConfigLoadFailed(_) => "CONFIG_LOAD_FAILED",
            Self::ConfigValidationFailed(_) => "CONFIG_VALIDATION_FAILED",
            Self::LlmRequestFailed(_) => "LLM_REQUEST_FAILED",
            Self::KnowledgeRetrievalFailed(_) => "KNOWLEDGE_RETRIEVAL_FAILED",
            Self::TaskNotFound { .. } => "TASK_NOT_FOUND",
            Self::QueueFull => "QUEUE_FULL",
            Self::DequeueCancelled => "DEQUEUE_CANCELLED",
            Self::UnknownTaskType { .. } => "UNKNOWN_TASK_TYPE",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Actionable suggestion surfaced alongside `message` in a `Failed` status.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::PluginNotFound { .. } => {
                Some("register a plugin for this middleware kind before submitting")
            }
            Self::QueueFull => Some("retry after the queue drains or raise the queue bound"),
            Self::NotSupported { .. } => {
                Some("this capability requires a canonical plugin, not the legacy adapter")
            }
            Self::LlmRequestFailed(_) | Self::KnowledgeRetrievalFailed(_) => {
                Some("the report was generated without LLM-enhanced recommendations")
            }
            _ => None,
        }
    }

    /// Whether this error downgrades a pipeline stage instead of failing the task,
    /// per the propagation rules: LLM/retrieval errors downgrade, collection errors fail.
    pub fn is_downgradable(&self) -> bool {
        matches!(
            self,
            Self::LlmRequestFailed(_) | Self::KnowledgeRetrievalFailed(_)
        )
    }

    pub fn not_found(task_id: impl Into<String>) -> Self {
        Self::TaskNotFound {
            task_id: task_id.into(),
        }
    }

    pub fn plugin_not_found(middleware: impl Into<String>) -> Self {
        Self::PluginNotFound {
            middleware: middleware.into(),
        }
    }

    pub fn not_supported(capability: impl Into<String>) -> Self {
        Self::NotSupported {
            capability: capability.into(),
        }
    }
}
