//! # diagnose-plugin
//!
//! The collector seam: a canonical `PluginCapability` contract, an adapter
//! that bridges pre-migration `LegacyPlugin` implementations onto it, and a
//! registry that resolves a middleware name to its plugin.

pub mod adapter;
pub mod capability;
pub mod legacy;
pub mod registry;

pub use adapter::LegacyPluginAdapter;
pub use capability::{
    DiagnosticSnapshot, Fix, FixKind, FixResult, HealthStatus, LogEntry, PluginCapability,
    PluginMetadata, RawIssue,
};
pub use legacy::{CommandResult, LegacyBuiltinRule, LegacyDiagnosticData, LegacyPlugin, SlowQueryEntry};
pub use registry::PluginRegistry;
