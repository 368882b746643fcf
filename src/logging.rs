//! Logging configuration for sqlserver-executor.
//!
//! Diagnostics go to stderr so stdout carries only results.

use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Initializes logging to stderr.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
