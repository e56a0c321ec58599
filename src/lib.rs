//! Workspace umbrella crate.
//!
//! Carries no behavior of its own — it exists so end-to-end tests in
//! `tests/` can exercise the full pipeline (scheduler → worker → orchestrator
//! → rules/detectors/retrieval → progress hub) through one dependency edge,
//! the way the reference engine's root crate wires its own E2E suite.

pub use diagnose_detect as detect;
pub use diagnose_orchestration as orchestration;
pub use diagnose_plugin as plugin;
pub use diagnose_retrieval as retrieval;
pub use diagnose_rules as rules;
pub use diagnose_shared as shared;
pub use diagnose_worker as worker;
