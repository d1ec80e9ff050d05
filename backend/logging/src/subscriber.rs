//! Subscriber setup for [`TracingEngine`](crate::TracingEngine).
//!
//! Console output plus an optional NDJSON rolling file, with `RUST_LOG`
//! taking precedence over the configured level.

use lineage_config::defaults::{DEFAULT_LOG_FILE, DEFAULT_OUTPUT_LEVEL};
use lineage_config::OutputConfig;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one keeps receiving events.
pub fn init_logger(output: &OutputConfig) -> bool {
    let level = output.level.as_deref().unwrap_or(DEFAULT_OUTPUT_LEVEL);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Rolling file appender: NDJSON to `<dir>/<file>.YYYY-MM-DD`
    let file_layer = output.dir.as_ref().map(|dir| {
        let file_name = output.file.as_deref().unwrap_or(DEFAULT_LOG_FILE);
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, file_name);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let console_layer = output.console.unwrap_or(true).then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
}
