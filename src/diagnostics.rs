//! Uniform formatting for user-facing errors and warnings.
//!
//! Messages are routed through `tracing` so the CLI subscriber decides where
//! they end up; library callers that install no subscriber see nothing.

use std::fmt::Display;

/// Prefix an error message so every failure reads the same way.
pub fn error_message(msg: impl Display) -> String {
    format!("formtree: {}", msg)
}

/// Emit a non-fatal warning.
pub fn warn(msg: impl Display) {
    tracing::warn!(target: "formtree", "{}", msg);
}

/// Install the stderr subscriber used by the CLI.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` over `warn`.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "formtree=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests, embedding hosts) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
