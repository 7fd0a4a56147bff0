//! Health check endpoints
//!
//! Kubernetes-style health endpoints:
//! - /health - process is up
//! - /health/live - liveness, never touches dependencies
//! - /health/ready - readiness, pings the credential store (503 on failure)

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

impl HealthResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks: None,
        }
    }
}

/// Dependency checks reported by the readiness endpoint
#[derive(Serialize)]
pub struct HealthChecks {
    pub credential_store: CheckStatus,
}

/// Status of an individual check
#[derive(Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy"))
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive"))
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let credential_store = match state.users.ping().await {
        Ok(()) => CheckStatus {
            healthy: true,
            message: None,
        },
        Err(e) => {
            warn!("Credential store health check failed: {}", e);
            CheckStatus {
                healthy: false,
                message: Some(e.to_string()),
            }
        }
    };

    let ready = credential_store.healthy;
    let response = HealthResponse {
        checks: Some(HealthChecks { credential_store }),
        ..HealthResponse::new(if ready { "ready" } else { "not_ready" })
    };

    if ready {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
