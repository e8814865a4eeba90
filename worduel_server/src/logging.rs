//! Structured logging configuration.
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! also captures those records, so engine and storage messages land in the
//! same stream as request spans.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use worduel_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a command the engine or storage turned down
///
/// Client mistakes are logged at debug; lost races at info so that bursts
/// of conflicts on one session are visible in normal operation.
pub fn log_rejected_command(operation: &str, player: &str, status: u16, reason: &str) {
    if status == 409 {
        tracing::info!(
            operation = operation,
            player = player,
            http_status = status,
            "Command rejected: {}",
            reason
        );
    } else {
        tracing::debug!(
            operation = operation,
            player = player,
            http_status = status,
            "Command rejected: {}",
            reason
        );
    }
}
