//! # Web API Route Definitions

use axum::routing::{get, post, put};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(handlers::auth::authenticate))
        .route(
            "/tasks",
            post(handlers::tasks::create_task).get(handlers::tasks::list_tasks),
        )
        .route(
            "/tasks/:id",
            put(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
}

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/ready", get(handlers::health::readiness_check))
}
