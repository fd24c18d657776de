//! SQLx implementation of the scan-job repository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::error;
use uuid::Uuid;

use crate::domain::entities::ScanJob;
use crate::domain::value_objects::{JobKind, JobStatus};

use super::{PersistenceError, ScanJobRepository};

/// SQLx implementation of the scan-job repository
pub struct PgScanJobRepository {
    pool: Arc<PgPool>,
}

impl PgScanJobRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn job_from_row(row: &PgRow) -> Result<ScanJob, PersistenceError> {
    let status: String = row.try_get("status")?;
    let kind: String = row.try_get("kind")?;

    Ok(ScanJob {
        id: row.try_get("id")?,
        repository_id: row.try_get("repository_id")?,
        repository: row.try_get("repository")?,
        kind: match kind.as_str() {
            "push_scan" => JobKind::PushScan,
            other => {
                return Err(PersistenceError::Database(format!(
                    "unknown job kind '{other}'"
                )))
            }
        },
        status: status
            .parse::<JobStatus>()
            .map_err(|e| PersistenceError::Database(e.to_string()))?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        findings_count: row.try_get("findings_count")?,
        error: row.try_get("error")?,
    })
}

#[async_trait]
impl ScanJobRepository for PgScanJobRepository {
    async fn create(&self, job: &ScanJob) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO scan_jobs (
                id, repository_id, repository, kind, status, started_at,
                completed_at, findings_count, error
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.id)
        .bind(job.repository_id)
        .bind(&job.repository)
        .bind(job.kind.as_str())
        .bind(job.status.as_str())
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.findings_count)
        .bind(&job.error)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            error!(job_id = %job.id, error = %e, "Database error creating scan job");
            PersistenceError::from(e)
        })?;

        Ok(())
    }

    async fn update(&self, job: &ScanJob) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            UPDATE scan_jobs
            SET status = $2, completed_at = $3, findings_count = $4, error = $5
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(job.status.as_str())
        .bind(job.completed_at)
        .bind(job.findings_count)
        .bind(&job.error)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            error!(job_id = %job.id, error = %e, "Database error updating scan job");
            PersistenceError::from(e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScanJob>, PersistenceError> {
        let row = sqlx::query(
            "SELECT id, repository_id, repository, kind, status, started_at, \
             completed_at, findings_count, error FROM scan_jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| {
            error!(job_id = %id, error = %e, "Database error fetching scan job");
            PersistenceError::from(e)
        })?;

        row.as_ref().map(job_from_row).transpose()
    }
}
