//! Request ID middleware for tracing and per-route metrics.
//!
//! Every request gets an ID (taken from `x-request-id` when the client sent
//! one), which is echoed on the response and attached to the start and
//! completion log lines together with the matched route and latency.
//! Server errors raised by handlers are logged here too, so the internal
//! detail always carries the request ID.

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use super::errors::ServerErrorDetail;
use crate::metrics;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied ID that is reused as-is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse a sane client-supplied request ID or generate a new one
fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware to add request ID to all requests and responses
///
/// Also records `http_requests_total` and `http_request_duration_ms`,
/// labelled with the route template so `/games/{id}` is one series.
pub async fn request_id_middleware(
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let request_id = get_or_generate_request_id(request.headers());
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        "Request started"
    );

    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, header_value);
    }

    if let Some(ServerErrorDetail(error)) = parts.extensions.remove::<ServerErrorDetail>() {
        tracing::error!(
            request_id = %request_id,
            route = %route,
            error = %error,
            "Request failed"
        );
    }

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics::http_requests_total(method.as_str(), &route, parts.status.as_u16());
    metrics::http_request_duration_ms(method.as_str(), &route, elapsed_ms);

    tracing::info!(
        request_id = %request_id,
        route = %route,
        status = %parts.status,
        elapsed_ms = elapsed_ms,
        "Request completed"
    );

    Ok(Response::from_parts(parts, body))
}
