//! Top-level subcommand orchestration.
//!
//! Commands convert typed engine errors to [`anyhow::Error`]; `main`
//! prints the propagated detail once and exits non-zero.
pub mod link;
pub mod new;
