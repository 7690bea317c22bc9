//! Logging initialization for the dirchat binary.

use std::sync::OnceLock;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "DIRCHAT_LOG";

static INIT: OnceLock<()> = OnceLock::new();

fn parse_level(value: Option<&str>) -> tracing::Level {
    match value.unwrap_or("info").trim().to_ascii_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// Install a stderr fmt subscriber at the level named by `DIRCHAT_LOG`.
///
/// Only the first call has an effect. Never fails.
pub fn init() {
    if INIT.get().is_some() {
        return;
    }
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    let _ = INIT.set(());
}
