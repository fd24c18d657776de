//! Finding query endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::error;

use crate::infrastructure::persistence::{FindingFilter, FindingStats};
use crate::presentation::controllers::ApiState;
use crate::presentation::models::{FindingQuery, FindingResponse, StatsQuery};

/// GET /api/v1/findings - list findings with filters, newest first
pub async fn list_findings(
    State(state): State<ApiState>,
    Query(query): Query<FindingQuery>,
) -> Result<Json<Vec<FindingResponse>>, StatusCode> {
    let filter = FindingFilter {
        severity: query.severity,
        secret_type: query.secret_type,
        repository_id: query.repository_id,
        days: query.days.unwrap_or(7).clamp(1, 365),
        limit: query.limit.unwrap_or(100).clamp(1, 1_000),
        offset: query.offset.unwrap_or(0).max(0),
    };

    match state.findings.list(&filter).await {
        Ok(findings) => Ok(Json(
            findings.into_iter().map(FindingResponse::from).collect(),
        )),
        Err(e) => {
            error!(error = %e, "Failed to list findings");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/v1/findings/{id} - fetch a single finding
pub async fn get_finding(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<FindingResponse>, StatusCode> {
    match state.findings.find_by_id(id).await {
        Ok(Some(finding)) => Ok(Json(FindingResponse::from(finding))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(finding_id = id, error = %e, "Failed to fetch finding");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/v1/findings/stats/summary - aggregate counts over a window
pub async fn finding_stats(
    State(state): State<ApiState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<FindingStats>, StatusCode> {
    let days = query.days.unwrap_or(30).clamp(1, 365);

    match state.findings.stats(days).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            error!(error = %e, "Failed to compute finding stats");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
