//! Logging setup and user-facing diagnostics.
//!
//! Everything that reports problems to the user goes through here so that the
//! wording and the log target stay consistent across loaders and renderers.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks the default level
/// (0 = warn, 1 = info, 2+ = debug).
pub fn init(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Collapse a message onto a single line.
///
/// Parse errors from serde_json and file paths can carry embedded newlines;
/// one line per diagnostic keeps stderr greppable.
pub fn error_message(msg: impl std::fmt::Display) -> String {
    msg.to_string()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn warn(msg: impl std::fmt::Display) {
    tracing::warn!("{}", error_message(msg));
}
