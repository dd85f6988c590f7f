//! # Web API Module
//!
//! Axum-based REST API for the ToDo+ mini app.
//!
//! ## Core Components
//!
//! - [`routes`] - HTTP route definitions
//! - [`handlers`] - Request handlers for identities, tasks and health probes
//! - [`middleware`] - Request id and internal-error redaction
//! - [`extractors`] - JSON/query extractors that reject with `{error}` bodies
//! - [`errors`] - `ApiError` and its HTTP mapping
//! - [`state`] - Shared application state

pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;
use tower_http::services::ServeDir;

pub use errors::{ApiError, ApiResult};

/// Create the main Axum application with all routes and middleware.
///
/// When `web.static_dir` is set, paths the API does not claim are served
/// from that directory.
pub fn create_app(app_state: AppState) -> Router {
    let web_config = app_state.config.clone();

    let mut router = Router::new()
        .merge(routes::health_routes())
        .nest("/api", routes::api_routes());

    if let Some(dir) = &web_config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    if web_config.redact_internal_errors {
        router = router.layer(axum::middleware::map_response(
            middleware::redaction::redact_internal_errors,
        ));
    }

    router
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(tower_http::timeout::TimeoutLayer::new(
            web_config.request_timeout(),
        ))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}
