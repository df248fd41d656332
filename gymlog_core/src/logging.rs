//! Tracing setup shared by the gymlog binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at `info`, or `debug` when `verbose` is set
///
/// `RUST_LOG` always wins over the default level. Logs go to stderr so that
/// command output on stdout stays clean.
pub fn init(verbose: bool) {
    init_with_level(if verbose { "debug" } else { "info" })
}

/// Initialize logging with a specific default level
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
