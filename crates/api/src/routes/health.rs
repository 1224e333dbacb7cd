//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{error::ApiResponse, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `"<backend>: healthy|unhealthy"`
    pub store: String,
    pub uptime_seconds: u64,
}

/// Health check: 200 when the store answers, 503 otherwise
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let backend = state.stores.health.backend();
    let healthy = match state.stores.health.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(backend, error = %e, "Health check: store unreachable");
            false
        }
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        store: format!("{}: {}", backend, if healthy { "healthy" } else { "unhealthy" }),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    };

    if healthy {
        (StatusCode::OK, ApiResponse::ok("Server is healthy", response))
    } else {
        let Json(mut body) = ApiResponse::ok("Store unreachable", response);
        body.success = false;
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}

/// Liveness probe (just returns 200 if the server is running)
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
