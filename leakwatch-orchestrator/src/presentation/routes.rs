//! Route definitions

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use leakwatch_core::config::CorsConfig;

use crate::presentation::controllers::findings::{finding_stats, get_finding, list_findings};
use crate::presentation::controllers::health::{health_check, readiness_check, root};
use crate::presentation::controllers::webhooks::github_webhook;
use crate::presentation::controllers::ApiState;

/// Build the application router with CORS and request tracing
pub fn build_router(state: ApiState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/ready", get(readiness_check))
        .route("/api/v1/webhooks/github", post(github_webhook))
        .route("/api/v1/findings", get(list_findings))
        .route("/api/v1/findings/stats/summary", get(finding_stats))
        .route("/api/v1/findings/{id}", get(get_finding))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
