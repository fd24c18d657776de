//! Finding, scan-job, and repository persistence
//!
//! Traits sit at the seams so the workflow can run against in-memory
//! implementations in tests; the Postgres implementations use runtime-bound
//! queries and never require a live database at build time.

pub mod finding_repository;
pub mod job_repository;
pub mod repository_store;
pub mod schema;

pub use finding_repository::PgFindingRepository;
pub use job_repository::PgScanJobRepository;
pub use repository_store::PgRepositoryStore;
pub use schema::init_schema;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use leakwatch_secrets::Severity;

use crate::domain::entities::{NewFinding, NewRepository, RepositoryRecord, ScanJob, StoredFinding};

/// Filters for finding queries
#[derive(Debug, Clone)]
pub struct FindingFilter {
    pub severity: Option<Severity>,
    pub secret_type: Option<String>,
    pub repository_id: Option<i64>,
    /// Trailing window in days
    pub days: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Default for FindingFilter {
    fn default() -> Self {
        Self {
            severity: None,
            secret_type: None,
            repository_id: None,
            days: 7,
            limit: 100,
            offset: 0,
        }
    }
}

/// Aggregate finding counts over a trailing window
#[derive(Debug, Clone, Serialize)]
pub struct FindingStats {
    pub total: i64,
    pub by_severity: BTreeMap<String, i64>,
    pub by_type: BTreeMap<String, i64>,
    pub window_days: i64,
}

/// Finding storage and reads
#[async_trait]
pub trait FindingRepository: Send + Sync {
    /// Persist a batch of findings atomically, returning how many were stored
    async fn save_batch(&self, findings: &[NewFinding]) -> Result<u64, PersistenceError>;

    async fn list(&self, filter: &FindingFilter) -> Result<Vec<StoredFinding>, PersistenceError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFinding>, PersistenceError>;

    async fn stats(&self, days: i64) -> Result<FindingStats, PersistenceError>;
}

/// Scan-job lifecycle storage
#[async_trait]
pub trait ScanJobRepository: Send + Sync {
    async fn create(&self, job: &ScanJob) -> Result<(), PersistenceError>;

    /// Write the job's current status, counters, and error back to storage
    async fn update(&self, job: &ScanJob) -> Result<(), PersistenceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScanJob>, PersistenceError>;
}

/// Monitored repository records, keyed by GitHub id
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn get_or_create(&self, repo: &NewRepository)
        -> Result<RepositoryRecord, PersistenceError>;

    async fn touch_last_scanned(&self, id: i64) -> Result<(), PersistenceError>;
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}
