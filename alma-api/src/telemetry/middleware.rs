//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in a `tracing` span and records Prometheus metrics.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::with_metrics;

static ID_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/\d+(/|$)").ok());

/// Normalize path for metrics/spans (replace numeric IDs with placeholders).
///
/// This prevents high-cardinality label explosion in Prometheus.
pub fn normalize_path(path: &str) -> String {
    let Some(id_pattern) = ID_SEGMENT.as_ref() else {
        return path.to_string();
    };
    // Adjacent ids share a slash, so run until stable.
    let mut current = path.to_string();
    loop {
        let next = id_pattern.replace_all(&current, "/{id}$1").to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Observability middleware for Axum.
///
/// Opens an `http_request` span, records request count and latency, and logs
/// completion.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    with_metrics(|m| {
        m.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        )
    });

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric_id() {
        assert_eq!(
            normalize_path("/api/v1/calendar/instances/12345"),
            "/api/v1/calendar/instances/{id}"
        );
    }

    #[test]
    fn test_normalize_path_nested_ids() {
        assert_eq!(
            normalize_path("/api/v1/calendar/instances/7/assignments/3"),
            "/api/v1/calendar/instances/{id}/assignments/{id}"
        );
    }

    #[test]
    fn test_normalize_path_role_segment_kept() {
        assert_eq!(
            normalize_path("/api/v1/calendar/instances/7/assignments/by-role/coordinator"),
            "/api/v1/calendar/instances/{id}/assignments/by-role/coordinator"
        );
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
        assert_eq!(
            normalize_path("/api/v1/calendar/instances-rich"),
            "/api/v1/calendar/instances-rich"
        );
    }
}
