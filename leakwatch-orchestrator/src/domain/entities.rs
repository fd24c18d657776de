//! Orchestrator domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leakwatch_core::domain::RepositoryInfo;
use leakwatch_secrets::{SecretFinding, Severity};

use super::value_objects::{JobKind, JobStatus, JobTransitionError};

/// Unit-of-work record tracking one event's scan lifecycle.
///
/// Created when an event is received and mutated only by the orchestrator;
/// `completed` and `failed` are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: Uuid,
    pub repository_id: i64,
    /// Repository full name, kept for log and API readability
    pub repository: String,
    pub kind: JobKind,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub findings_count: i64,
    pub error: Option<String>,
}

impl ScanJob {
    /// Create a job in the running state; processing starts immediately on
    /// event receipt.
    pub fn new(repository_id: i64, repository: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            repository_id,
            repository: repository.into(),
            kind,
            status: JobStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            findings_count: 0,
            error: None,
        }
    }

    /// Transition to completed with the number of findings persisted for
    /// this job.
    pub fn complete(&mut self, findings_count: i64) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Completed)?;
        self.findings_count = findings_count;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Transition to failed with the captured error message.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, target: JobStatus) -> Result<(), JobTransitionError> {
        if !self.status.can_transition_to(&target) {
            return Err(JobTransitionError {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}

/// A finding as buffered by the workflow, ready for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFinding {
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
}

impl NewFinding {
    /// Attach persistence context to an engine finding
    pub fn from_detection(
        repository_id: i64,
        scan_job_id: Uuid,
        commit_sha: &str,
        finding: SecretFinding,
    ) -> Self {
        Self {
            repository_id,
            scan_job_id,
            commit_sha: commit_sha.to_string(),
            secret_type: finding.secret_type,
            snippet: finding.snippet,
            file_path: finding.file_path,
            line_number: i64::from(finding.line_number),
            column_start: i64::from(finding.column_start),
            column_end: i64::from(finding.column_end),
            entropy: finding.entropy,
            severity: finding.severity,
            confidence: finding.confidence,
        }
    }
}

/// A finding as stored, including its triage state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFinding {
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
    pub status: FindingStatus,
    pub discovered_at: DateTime<Utc>,
}

/// Triage status of a stored finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    Acknowledged,
    Resolved,
    FalsePositive,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
            Self::FalsePositive => "false_positive",
        }
    }
}

impl std::str::FromStr for FindingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            "false_positive" => Ok(Self::FalsePositive),
            other => Err(format!("unknown finding status '{other}'")),
        }
    }
}

/// Monitored repository record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: i64,
    pub github_id: i64,
    pub full_name: String,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub stars: i64,
    pub language: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_scanned: Option<DateTime<Utc>>,
}

/// Repository fields extracted from a webhook payload, keyed by github_id
#[derive(Debug, Clone)]
pub struct NewRepository {
    pub github_id: i64,
    pub full_name: String,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub stars: i64,
    pub language: Option<String>,
}

impl From<&RepositoryInfo> for NewRepository {
    fn from(info: &RepositoryInfo) -> Self {
        Self {
            github_id: info.id,
            full_name: info.full_name.clone(),
            owner: info.owner.display_name().to_string(),
            name: info.name.clone(),
            description: info.description.clone(),
            is_private: info.private,
            stars: info.stargazers_count,
            language: info.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_jobs_start_running() {
        let job = ScanJob::new(1, "octocat/hello-world", JobKind::PushScan);
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.completed_at.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn completing_records_count_and_timestamp() {
        let mut job = ScanJob::new(1, "octocat/hello-world", JobKind::PushScan);
        job.complete(3).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.findings_count, 3);
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn terminal_jobs_reject_further_transitions() {
        let mut job = ScanJob::new(1, "octocat/hello-world", JobKind::PushScan);
        job.fail("repository not resolvable").unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.complete(0).is_err());
    }
}
