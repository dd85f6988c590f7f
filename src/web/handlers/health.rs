//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

use crate::database::connection::health_check;
use crate::models::timestamp;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    status: String,
    timestamp: String,
    database_ms: u64,
}

/// Liveness: GET /health
///
/// Answers as long as the process serves requests; does not touch the store.
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: timestamp::format(&state.clock.now()),
    })
}

/// Readiness: GET /ready
///
/// 200 when the store answers `SELECT 1`, 503 otherwise.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    debug!("Performing readiness probe");
    let started = Instant::now();

    match health_check(&state.pool).await {
        Ok(true) => Ok(Json(ReadinessResponse {
            status: "ready".to_string(),
            timestamp: timestamp::format(&state.clock.now()),
            database_ms: started.elapsed().as_millis() as u64,
        })),
        Ok(false) => Err(ApiError::service_unavailable("database check returned an unexpected value")),
        Err(e) => {
            warn!(error = %e, "Readiness probe failed");
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}
