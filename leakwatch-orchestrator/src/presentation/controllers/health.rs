//! Health and readiness probes

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::Json;
use tracing::error;

use crate::presentation::controllers::ApiState;
use crate::presentation::models::{HealthResponse, ReadyResponse, ServiceInfo};

/// GET / - service description
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Leakwatch credential exposure monitoring API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/v1/health - per-service health with degraded aggregation
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let mut services = BTreeMap::new();
    let mut status = "healthy";

    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&*state.db_pool)
        .await
    {
        Ok(_) => {
            services.insert("database".to_string(), "healthy".to_string());
        }
        Err(e) => {
            error!(error = %e, "Database health check failed");
            services.insert("database".to_string(), "unhealthy".to_string());
            status = "degraded";
        }
    }

    let mut conn = state.redis.clone();
    match redis::cmd("PING").query_async::<String>(&mut conn).await {
        Ok(_) => {
            services.insert("redis".to_string(), "healthy".to_string());
        }
        Err(e) => {
            error!(error = %e, "Redis health check failed");
            services.insert("redis".to_string(), "unhealthy".to_string());
            status = "degraded";
        }
    }

    Json(HealthResponse {
        status: status.to_string(),
        services,
    })
}

/// GET /api/v1/ready - readiness to accept traffic
pub async fn readiness_check(State(state): State<ApiState>) -> Json<ReadyResponse> {
    if let Err(e) = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&*state.db_pool)
        .await
    {
        error!(error = %e, "Readiness check failed on database");
        return Json(ReadyResponse {
            ready: false,
            error: Some(e.to_string()),
        });
    }

    let mut conn = state.redis.clone();
    if let Err(e) = redis::cmd("PING").query_async::<String>(&mut conn).await {
        error!(error = %e, "Readiness check failed on Redis");
        return Json(ReadyResponse {
            ready: false,
            error: Some(e.to_string()),
        });
    }

    Json(ReadyResponse {
        ready: true,
        error: None,
    })
}
