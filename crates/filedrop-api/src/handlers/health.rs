//! Liveness and readiness probes.
//!
//! `/health` and `/ready` check the datastore; `/live` only proves the
//! HTTP server is answering.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::AppState;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: HealthStatus,
    /// When the check ran
    pub timestamp: DateTime<Utc>,
    /// Per-component results
    pub checks: HealthChecks,
    /// Crate version
    pub version: String,
}

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every dependency answered
    Healthy,
    /// A dependency is failing
    Unhealthy,
}

/// Component results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Embedded datastore
    pub database: ComponentHealth,
}

/// Result for a single component.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
    /// Failure detail, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Time taken by the check
    pub response_time_ms: u64,
}

/// Component-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component answered
    Up,
    /// Component failed
    Down,
}

async fn run_checks(state: &AppState) -> HealthResponse {
    let timestamp = state.clock.now_utc();
    let started = state.clock.now();

    let (status, message) = match state.storage.health_check().await {
        Ok(()) => (ComponentStatus::Up, None),
        Err(e) => {
            error!(error = %e, "Datastore health check failed");
            (ComponentStatus::Down, Some(format!("Datastore unavailable: {e}")))
        },
    };
    let elapsed = state.clock.now().saturating_duration_since(started);

    HealthResponse {
        status: match status {
            ComponentStatus::Up => HealthStatus::Healthy,
            ComponentStatus::Down => HealthStatus::Unhealthy,
        },
        timestamp,
        checks: HealthChecks {
            database: ComponentHealth {
                status,
                message,
                response_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            },
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// `GET /health`: `200` when the datastore answers, `503` otherwise.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let response = run_checks(&state).await;

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    debug!(status = ?response.status, "Health check completed");
    (status_code, Json(response)).into_response()
}

/// `GET /ready`: same checks as `/health`.
#[instrument(name = "readiness_check", skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    health_check(State(state)).await
}

/// `GET /live`: no dependency checks.
#[instrument(name = "liveness_check", skip(state))]
pub async fn liveness_check(State(state): State<AppState>) -> Response {
    let response = serde_json::json!({
        "status": "alive",
        "timestamp": state.clock.now_utc(),
        "service": "filedrop",
    });

    (StatusCode::OK, Json(response)).into_response()
}
