//! Tracing subscriber bootstrap, shared by every binary-shaped consumer of
//! this workspace (the worker pool's host process, test harnesses).

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `tracing` subscriber reading `RUST_LOG` (default `info`).
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
