//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber so stdout carries only answers.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `info` when verbose.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
