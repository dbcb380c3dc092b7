//! User-facing error prefixes and tracing setup.

use tracing_subscriber::EnvFilter;

const ERROR_PREFIX: &str = "experiment-report";

/// Uniform prefix for errors that reach the terminal.
pub fn error_message(msg: impl AsRef<str>) -> String {
    format!("{}: {}", ERROR_PREFIX, msg.as_ref())
}

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (e.g. from tests) is harmless; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
