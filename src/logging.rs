//! Console logging setup.
//!
//! The engine itself only emits [`tracing`] events (each created link at
//! info, skips and parameter bindings at debug); this module wires those
//! events to stderr once at process start. `RUST_LOG` overrides the
//! verbosity chosen by the `--verbose` flag.
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "paklink=debug" } else { "paklink=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
