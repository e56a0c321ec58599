//! # diagnose-shared
//!
//! Data model, error taxonomy, resilience primitives and config shared
//! across the diagnosis engine's crates. Nothing here talks to the
//! network or a database — those are collaborator boundaries owned by
//! `diagnose-plugin`, `diagnose-orchestration` and `diagnose-worker`.

pub mod config;
pub mod error;
pub mod models;
pub mod resilience;
pub mod telemetry;

pub use error::{DiagnosisError, DiagnosisResult};
