//! SQLx implementation of the finding repository

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};
use tracing::error;

use crate::domain::entities::{NewFinding, StoredFinding};

use super::{FindingFilter, FindingRepository, FindingStats, PersistenceError};

const SELECT_COLUMNS: &str = "id, repository_id, scan_job_id, commit_sha, secret_type, snippet, \
     file_path, line_number, column_start, column_end, entropy, severity, confidence, status, \
     discovered_at";

/// SQLx implementation of the finding repository
pub struct PgFindingRepository {
    pool: Arc<PgPool>,
}

impl PgFindingRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn finding_from_row(row: &PgRow) -> Result<StoredFinding, PersistenceError> {
    let severity: String = row.try_get("severity")?;
    let status: String = row.try_get("status")?;

    Ok(StoredFinding {
        id: row.try_get("id")?,
        repository_id: row.try_get("repository_id")?,
        scan_job_id: row.try_get("scan_job_id")?,
        commit_sha: row.try_get("commit_sha")?,
        secret_type: row.try_get("secret_type")?,
        snippet: row.try_get("snippet")?,
        file_path: row.try_get("file_path")?,
        line_number: row.try_get("line_number")?,
        column_start: row.try_get("column_start")?,
        column_end: row.try_get("column_end")?,
        entropy: row.try_get("entropy")?,
        severity: severity
            .parse()
            .map_err(|e| PersistenceError::Database(format!("{e}")))?,
        confidence: row.try_get("confidence")?,
        status: status
            .parse()
            .map_err(|e| PersistenceError::Database(format!("invalid finding status: {e}")))?,
        discovered_at: row.try_get("discovered_at")?,
    })
}

#[async_trait]
impl FindingRepository for PgFindingRepository {
    async fn save_batch(&self, findings: &[NewFinding]) -> Result<u64, PersistenceError> {
        if findings.is_empty() {
            return Ok(0);
        }

        // One transaction: a batch is committed once, after all findings are
        // buffered, never incrementally
        let mut tx = self.pool.begin().await?;

        for finding in findings {
            sqlx::query(
                r#"
                INSERT INTO security_findings (
                    repository_id, scan_job_id, commit_sha, secret_type, snippet,
                    file_path, line_number, column_start, column_end, entropy,
                    severity, confidence
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(finding.repository_id)
            .bind(finding.scan_job_id)
            .bind(&finding.commit_sha)
            .bind(&finding.secret_type)
            .bind(&finding.snippet)
            .bind(&finding.file_path)
            .bind(finding.line_number)
            .bind(finding.column_start)
            .bind(finding.column_end)
            .bind(finding.entropy)
            .bind(finding.severity.as_str())
            .bind(finding.confidence)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error saving finding");
                PersistenceError::from(e)
            })?;
        }

        tx.commit().await?;
        Ok(findings.len() as u64)
    }

    async fn list(&self, filter: &FindingFilter) -> Result<Vec<StoredFinding>, PersistenceError> {
        let cutoff = Utc::now() - Duration::days(filter.days);

        let mut query = QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM security_findings WHERE discovered_at >= "
        ));
        query.push_bind(cutoff);

        if let Some(severity) = filter.severity {
            query.push(" AND severity = ");
            query.push_bind(severity.as_str());
        }
        if let Some(secret_type) = &filter.secret_type {
            query.push(" AND secret_type = ");
            query.push_bind(secret_type);
        }
        if let Some(repository_id) = filter.repository_id {
            query.push(" AND repository_id = ");
            query.push_bind(repository_id);
        }

        query.push(" ORDER BY discovered_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.offset);

        let rows = query.build().fetch_all(&*self.pool).await.map_err(|e| {
            error!(error = %e, "Database error listing findings");
            PersistenceError::from(e)
        })?;

        rows.iter().map(finding_from_row).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFinding>, PersistenceError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM security_findings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| {
            error!(finding_id = id, error = %e, "Database error fetching finding");
            PersistenceError::from(e)
        })?;

        row.as_ref().map(finding_from_row).transpose()
    }

    async fn stats(&self, days: i64) -> Result<FindingStats, PersistenceError> {
        let cutoff = Utc::now() - Duration::days(days);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM security_findings WHERE discovered_at >= $1")
                .bind(cutoff)
                .fetch_one(&*self.pool)
                .await?;

        let severity_rows = sqlx::query(
            "SELECT severity, COUNT(*) AS count FROM security_findings \
             WHERE discovered_at >= $1 GROUP BY severity",
        )
        .bind(cutoff)
        .fetch_all(&*self.pool)
        .await?;

        let mut by_severity = BTreeMap::new();
        for row in &severity_rows {
            by_severity.insert(row.try_get::<String, _>("severity")?, row.try_get("count")?);
        }

        let type_rows = sqlx::query(
            "SELECT secret_type, COUNT(*) AS count FROM security_findings \
             WHERE discovered_at >= $1 GROUP BY secret_type",
        )
        .bind(cutoff)
        .fetch_all(&*self.pool)
        .await?;

        let mut by_type = BTreeMap::new();
        for row in &type_rows {
            by_type.insert(row.try_get::<String, _>("secret_type")?, row.try_get("count")?);
        }

        Ok(FindingStats {
            total,
            by_severity,
            by_type,
            window_days: days,
        })
    }
}
