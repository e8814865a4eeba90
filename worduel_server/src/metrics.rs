//! Prometheus metrics for monitoring duel traffic.
//!
//! Metrics are exposed in Prometheus text format on the listener given by
//! `METRICS_BIND`. When no exporter is installed the recording functions
//! are no-ops.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and duration by route and status
//! - **Invite Metrics**: Invites created, resolved and expired
//! - **Game Metrics**: Guesses, finished rounds and finished sessions
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use worduel_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/invites", 201);
//! metrics::guesses_submitted_total();
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `path` should be the matched route template, not the raw URI, to keep
/// label cardinality bounded.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Invite Metrics
// ============================================================================

/// Increment invites created counter.
pub fn invites_created_total() {
    metrics::counter!("invites_created_total").increment(1);
}

/// Increment invites resolved counter, labelled with the new status.
pub fn invites_resolved_total(status: &str) {
    metrics::counter!("invites_resolved_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Add invites expired by the sweep.
pub fn invites_expired_total(count: usize) {
    metrics::counter!("invites_expired_total").increment(count as u64);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Increment accepted guesses counter.
pub fn guesses_submitted_total() {
    metrics::counter!("guesses_submitted_total").increment(1);
}

/// Increment finished rounds counter, labelled with the round outcome.
pub fn rounds_completed_total(outcome: &str) {
    metrics::counter!("rounds_completed_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Increment finished sessions counter, labelled completed or abandoned.
pub fn sessions_finished_total(status: &str) {
    metrics::counter!("sessions_finished_total",
        "status" => status.to_string()
    )
    .increment(1);
}
