//! Health check endpoints for load balancer probes and monitoring.

use axum::{Json, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status, always "healthy" while the process serves requests
    pub status: String,
    /// Service version
    pub version: String,
}

/// Health check.
///
/// The service keeps no local state, so it is healthy whenever it can answer.
/// Remote platform and identity provider availability is not probed here.
#[tracing::instrument(name = "health.check")]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Liveness probe.
#[tracing::instrument(name = "health.liveness")]
pub async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}
