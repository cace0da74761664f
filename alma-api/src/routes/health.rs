//! Operational checks mounted under /health.
//!
//! `ready` answers 503 while the calendar store cannot complete a round
//! trip, so a load balancer stops routing calendar traffic to the node.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use alma_core::AlmaResult;

use crate::state::{AppState, SharedStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Body of the live and ready endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    /// Round trip to the calendar store; absent on `live`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    fn alive(uptime: Duration) -> Self {
        Self {
            status: HealthStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime.as_secs(),
            store_latency_ms: None,
            error: None,
        }
    }

    /// Fold a timed store check into a report and its status code.
    fn from_store_check(check: AlmaResult<Duration>, uptime: Duration) -> (StatusCode, Self) {
        let mut report = Self::alive(uptime);
        match check {
            Ok(latency) => {
                report.store_latency_ms = Some(latency.as_millis() as u64);
                (StatusCode::OK, report)
            }
            Err(e) => {
                report.status = HealthStatus::Unhealthy;
                report.error = Some(e.to_string());
                (StatusCode::SERVICE_UNAVAILABLE, report)
            }
        }
    }
}

/// GET /health/ping
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses((status = 200, description = "Service is responding", body = String)),
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Process is alive", body = HealthReport)),
)]
pub async fn liveness(State(start_time): State<Instant>) -> Json<HealthReport> {
    Json(HealthReport::alive(start_time.elapsed()))
}

/// GET /health/ready - Calendar store round trip
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Calendar store reachable", body = HealthReport),
        (status = 503, description = "Calendar store unreachable", body = HealthReport),
    ),
)]
pub async fn readiness(
    State(store): State<SharedStore>,
    State(start_time): State<Instant>,
) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();
    let check = store.health_check().await.map(|()| started.elapsed());
    if let Err(e) = &check {
        tracing::warn!(error = %e, "Calendar store health check failed");
    }
    let (status, report) = HealthReport::from_store_check(check, start_time.elapsed());
    (status, Json(report))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}
