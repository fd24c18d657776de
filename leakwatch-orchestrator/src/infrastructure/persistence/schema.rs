//! Schema bootstrap
//!
//! Tables are created idempotently at startup; the persisted record shapes
//! are the contract, the schema itself stays collaborator-owned.

use sqlx::PgPool;
use tracing::info;

use super::PersistenceError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS repositories (
        id BIGSERIAL PRIMARY KEY,
        github_id BIGINT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        owner TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        is_private BOOLEAN NOT NULL DEFAULT FALSE,
        stars BIGINT NOT NULL DEFAULT 0,
        language TEXT,
        first_seen TIMESTAMPTZ NOT NULL DEFAULT now(),
        last_scanned TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_repositories_full_name ON repositories (full_name)",
    r#"
    CREATE TABLE IF NOT EXISTS scan_jobs (
        id UUID PRIMARY KEY,
        repository_id BIGINT NOT NULL,
        repository TEXT NOT NULL,
        kind TEXT NOT NULL,
        status TEXT NOT NULL,
        started_at TIMESTAMPTZ NOT NULL,
        completed_at TIMESTAMPTZ,
        findings_count BIGINT NOT NULL DEFAULT 0,
        error TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_scan_jobs_repository ON scan_jobs (repository_id)",
    "CREATE INDEX IF NOT EXISTS idx_scan_jobs_status ON scan_jobs (status)",
    r#"
    CREATE TABLE IF NOT EXISTS security_findings (
        id BIGSERIAL PRIMARY KEY,
        repository_id BIGINT NOT NULL,
        scan_job_id UUID NOT NULL,
        commit_sha TEXT NOT NULL,
        secret_type TEXT NOT NULL,
        snippet TEXT NOT NULL,
        file_path TEXT NOT NULL,
        line_number BIGINT NOT NULL,
        column_start BIGINT NOT NULL,
        column_end BIGINT NOT NULL,
        entropy DOUBLE PRECISION NOT NULL,
        severity TEXT NOT NULL,
        confidence DOUBLE PRECISION NOT NULL,
        status TEXT NOT NULL DEFAULT 'open',
        discovered_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_findings_repository ON security_findings (repository_id)",
    "CREATE INDEX IF NOT EXISTS idx_findings_severity ON security_findings (severity)",
    "CREATE INDEX IF NOT EXISTS idx_findings_secret_type ON security_findings (secret_type)",
    "CREATE INDEX IF NOT EXISTS idx_findings_discovered_at ON security_findings (discovered_at)",
];

/// Create tables and indexes if they do not exist
pub async fn init_schema(pool: &PgPool) -> Result<(), PersistenceError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema initialized");
    Ok(())
}
