//! Request and response DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leakwatch_secrets::Severity;

use crate::domain::entities::StoredFinding;

/// Query parameters for finding listings
#[derive(Debug, Default, Deserialize)]
pub struct FindingQuery {
    pub severity: Option<Severity>,
    pub secret_type: Option<String>,
    pub repository_id: Option<i64>,
    pub days: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for finding statistics
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i64>,
}

/// One finding as returned by the API
#[derive(Debug, Serialize)]
pub struct FindingResponse {
    pub id: i64,
    pub repository_id: i64,
    pub scan_job_id: Uuid,
    pub commit_sha: String,
    pub secret_type: String,
    pub snippet: String,
    pub file_path: String,
    pub line_number: i64,
    pub column_start: i64,
    pub column_end: i64,
    pub entropy: f64,
    pub severity: Severity,
    pub confidence: f64,
    pub status: String,
    pub discovered_at: DateTime<Utc>,
}

impl From<StoredFinding> for FindingResponse {
    fn from(finding: StoredFinding) -> Self {
        Self {
            id: finding.id,
            repository_id: finding.repository_id,
            scan_job_id: finding.scan_job_id,
            commit_sha: finding.commit_sha,
            secret_type: finding.secret_type,
            snippet: finding.snippet,
            file_path: finding.file_path,
            line_number: finding.line_number,
            column_start: finding.column_start,
            column_end: finding.column_end,
            entropy: finding.entropy,
            severity: finding.severity,
            confidence: finding.confidence,
            status: finding.status.as_str().to_string(),
            discovered_at: finding.discovered_at,
        }
    }
}

/// Webhook intake acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookAccepted {
    pub status: &'static str,
    pub event: String,
}

/// Per-service health report
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub services: BTreeMap<String, String>,
}

/// Readiness report
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Root endpoint service description
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
}
