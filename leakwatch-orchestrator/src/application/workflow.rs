//! Per-event scan workflow
//!
//! One event runs the full state machine: create a running scan job, fetch
//! and scan the changed files of the most recent commits, persist all
//! buffered findings in one batch, then record the terminal job status.
//! A recoverable error on one file or commit is logged and that unit is
//! skipped; it never aborts the rest of the event. A job-level error marks
//! the job failed and surfaces an error so the event stays unacknowledged.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use leakwatch_core::config::ScanningConfig;
use leakwatch_core::domain::{PushPayload, StreamEvent};
use leakwatch_secrets::ScanEngine;

use crate::domain::entities::{NewFinding, NewRepository, ScanJob};
use crate::domain::value_objects::{JobKind, JobTransitionError};
use crate::infrastructure::github::RepositoryClient;
use crate::infrastructure::persistence::{
    FindingRepository, PersistenceError, RepositoryStore, ScanJobRepository,
};

/// Limits applied while walking an event's commits and files
#[derive(Debug, Clone)]
pub struct ScanLimits {
    pub max_commits: usize,
    pub max_file_changes: u64,
    pub max_file_size_bytes: u64,
}

impl From<&ScanningConfig> for ScanLimits {
    fn from(config: &ScanningConfig) -> Self {
        Self {
            max_commits: config.max_commits_per_event,
            max_file_changes: config.max_file_changes,
            max_file_size_bytes: config.max_file_size_bytes(),
        }
    }
}

/// Terminal outcome of processing one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { job_id: Uuid, findings_count: u64 },
    /// Nothing to scan; the event is still safe to acknowledge
    Skipped,
}

/// Workflow errors. Any of these leaves the source event unacknowledged so
/// the stream redelivers it.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Failed to resolve repository: {0}")]
    RepositoryResolution(#[source] PersistenceError),

    #[error("Failed to persist scan job: {0}")]
    JobPersistence(#[source] PersistenceError),

    #[error("Scan job {job_id} failed: {message}")]
    JobFailed { job_id: Uuid, message: String },

    #[error(transparent)]
    InvalidTransition(#[from] JobTransitionError),
}

/// Orchestrates fetch → scan → persist for one event at a time
pub struct ScanWorkflow {
    engine: Arc<ScanEngine>,
    client: Arc<dyn RepositoryClient>,
    repositories: Arc<dyn RepositoryStore>,
    jobs: Arc<dyn ScanJobRepository>,
    findings: Arc<dyn FindingRepository>,
    limits: ScanLimits,
}

impl ScanWorkflow {
    pub fn new(
        engine: Arc<ScanEngine>,
        client: Arc<dyn RepositoryClient>,
        repositories: Arc<dyn RepositoryStore>,
        jobs: Arc<dyn ScanJobRepository>,
        findings: Arc<dyn FindingRepository>,
        limits: ScanLimits,
    ) -> Self {
        Self {
            engine,
            client,
            repositories,
            jobs,
            findings,
            limits,
        }
    }

    /// Process one push event to a terminal state.
    ///
    /// Returns `Ok` only once that state is durably recorded; the caller may
    /// then acknowledge the event.
    #[instrument(skip(self, event), fields(repository = %event.repository))]
    pub async fn process(&self, event: &StreamEvent) -> Result<JobOutcome, WorkflowError> {
        let payload = match event.push_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Unparsable push payload; skipping event");
                return Ok(JobOutcome::Skipped);
            }
        };

        if payload.commits.is_empty() {
            debug!("No commits in push event");
            return Ok(JobOutcome::Skipped);
        }

        info!(commit_count = payload.commits.len(), "Processing push event");

        let repo = self
            .repositories
            .get_or_create(&NewRepository::from(&payload.repository))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to resolve repository record");
                WorkflowError::RepositoryResolution(e)
            })?;

        let mut job = ScanJob::new(repo.id, &event.repository, JobKind::PushScan);
        self.jobs.create(&job).await.map_err(|e| {
            error!(error = %e, "Failed to create scan job");
            WorkflowError::JobPersistence(e)
        })?;

        let buffered = self
            .collect_findings(&event.repository, &payload, repo.id, job.id)
            .await;

        match self.findings.save_batch(&buffered).await {
            Ok(count) => {
                job.complete(count as i64)?;
                self.jobs.update(&job).await.map_err(|e| {
                    error!(job_id = %job.id, error = %e, "Failed to record completed job");
                    WorkflowError::JobPersistence(e)
                })?;

                if let Err(e) = self.repositories.touch_last_scanned(repo.id).await {
                    warn!(repository_id = repo.id, error = %e, "Failed to update last_scanned");
                }

                info!(job_id = %job.id, findings = count, "Push scan completed");
                Ok(JobOutcome::Completed {
                    job_id: job.id,
                    findings_count: count,
                })
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Failed to persist findings");
                let message = e.to_string();
                job.fail(&message)?;
                if let Err(update_err) = self.jobs.update(&job).await {
                    error!(job_id = %job.id, error = %update_err, "Failed to record failed job");
                }
                Err(WorkflowError::JobFailed {
                    job_id: job.id,
                    message,
                })
            }
        }
    }

    /// Walk the most recent commits and buffer findings from every fetchable,
    /// scannable file. All errors here are scoped to one file or commit.
    async fn collect_findings(
        &self,
        repository: &str,
        payload: &PushPayload,
        repository_id: i64,
        job_id: Uuid,
    ) -> Vec<NewFinding> {
        let mut buffered = Vec::new();

        // Push payloads list commits oldest first; keep the most recent ones
        let skip = payload.commits.len().saturating_sub(self.limits.max_commits);
        for commit in &payload.commits[skip..] {
            let files = match self.client.commit_files(repository, &commit.id).await {
                Ok(files) => files,
                Err(e) => {
                    warn!(commit = %commit.id, error = %e, "Failed to list commit files; skipping commit");
                    continue;
                }
            };

            for file in files {
                if !file.has_content() || !self.engine.should_scan(&file.filename) {
                    continue;
                }
                if file.changes > self.limits.max_file_changes {
                    debug!(
                        file = %file.filename,
                        changes = file.changes,
                        "Skipping file with oversized change"
                    );
                    continue;
                }

                let content = match self
                    .client
                    .file_content(repository, &file.filename, &commit.id)
                    .await
                {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(file = %file.filename, error = %e, "Failed to fetch file content; skipping file");
                        continue;
                    }
                };

                if content.size > self.limits.max_file_size_bytes {
                    debug!(
                        file = %file.filename,
                        size = content.size,
                        "Skipping file - too large"
                    );
                    continue;
                }

                for finding in self.engine.scan(&content.text, &file.filename) {
                    warn!(
                        repository,
                        file = %file.filename,
                        secret_type = %finding.secret_type,
                        severity = %finding.severity,
                        "Secret detected"
                    );
                    buffered.push(NewFinding::from_detection(
                        repository_id,
                        job_id,
                        &commit.id,
                        finding,
                    ));
                }
            }
        }

        buffered
    }
}
