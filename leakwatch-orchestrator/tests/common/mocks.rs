//! In-memory implementations of the infrastructure seams
//!
//! The stream mock models consumer-group pending-list semantics: delivered
//! entries stay pending until acknowledged, and pending entries idle longer
//! than `redeliver_after` are handed out again on a later read.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use leakwatch_core::domain::StreamEvent;
use leakwatch_orchestrator::domain::entities::{
    FindingStatus, NewFinding, NewRepository, RepositoryRecord, ScanJob, StoredFinding,
};
use leakwatch_orchestrator::infrastructure::github::{
    ChangedFile, FileContent, GitHubError, RepositoryClient,
};
use leakwatch_orchestrator::infrastructure::persistence::{
    FindingFilter, FindingRepository, FindingStats, PersistenceError, RepositoryStore,
    ScanJobRepository,
};
use leakwatch_orchestrator::infrastructure::stream::{EventStream, StreamError};

// ---------------------------------------------------------------------------
// Event stream
// ---------------------------------------------------------------------------

struct StoredEntry {
    id: String,
    event: StreamEvent,
}

#[derive(Default)]
struct StreamState {
    entries: HashMap<String, Vec<StoredEntry>>,
    groups: HashSet<(String, String)>,
    /// (stream, group, entry id) -> last delivery time
    pending: HashMap<(String, String, String), Instant>,
    /// Entries already delivered at least once
    delivered: HashSet<(String, String, String)>,
    next_seq: u64,
}

/// In-memory stream with consumer-group delivery and redelivery semantics
pub struct InMemoryEventStream {
    state: Mutex<StreamState>,
    redeliver_after: Duration,
}

impl InMemoryEventStream {
    /// Pending entries are redelivered after `redeliver_after` of idleness;
    /// pass `Duration::ZERO` to redeliver on every read.
    pub fn new(redeliver_after: Duration) -> Self {
        Self {
            state: Mutex::new(StreamState::default()),
            redeliver_after,
        }
    }

    /// Number of entries currently pending for a group
    pub fn pending_count(&self, stream: &str, group: &str) -> usize {
        let state = self.state.lock().expect("stream mock poisoned");
        state
            .pending
            .keys()
            .filter(|(s, g, _)| s == stream && g == group)
            .count()
    }
}

#[async_trait]
impl EventStream for InMemoryEventStream {
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), StreamError> {
        let mut state = self.state.lock().expect("stream mock poisoned");
        // Idempotent: creating an existing group is a no-op
        state.groups.insert((stream.to_string(), group.to_string()));
        Ok(())
    }

    async fn publish(&self, stream: &str, event: &StreamEvent) -> Result<String, StreamError> {
        let mut state = self.state.lock().expect("stream mock poisoned");
        state.next_seq += 1;
        let id = format!("{}-0", state.next_seq);
        state
            .entries
            .entry(stream.to_string())
            .or_default()
            .push(StoredEntry {
                id: id.clone(),
                event: event.clone(),
            });
        Ok(id)
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        _consumer: &str,
        count: usize,
        block: Duration,
    ) -> Result<Vec<(String, StreamEvent)>, StreamError> {
        let read_once = |now: Instant| -> Vec<(String, StreamEvent)> {
            let mut state = self.state.lock().expect("stream mock poisoned");
            let mut out = Vec::new();

            let entries = match state.entries.get(stream) {
                Some(entries) => entries
                    .iter()
                    .map(|e| (e.id.clone(), e.event.clone()))
                    .collect::<Vec<_>>(),
                None => Vec::new(),
            };

            for (id, event) in entries {
                if out.len() >= count {
                    break;
                }
                let key = (stream.to_string(), group.to_string(), id.clone());
                let undelivered = !state.delivered.contains(&key);
                let redeliverable = state
                    .pending
                    .get(&key)
                    .is_some_and(|t| now.duration_since(*t) >= self.redeliver_after);

                if undelivered || redeliverable {
                    state.delivered.insert(key.clone());
                    state.pending.insert(key, now);
                    out.push((id, event));
                }
            }
            out
        };

        let events = read_once(Instant::now());
        if !events.is_empty() || block.is_zero() {
            return Ok(events);
        }

        // Model the blocking poll: wait once, then re-check
        tokio::time::sleep(block).await;
        Ok(read_once(Instant::now()))
    }

    async fn acknowledge(
        &self,
        stream: &str,
        group: &str,
        event_id: &str,
    ) -> Result<(), StreamError> {
        let mut state = self.state.lock().expect("stream mock poisoned");
        state.pending.remove(&(
            stream.to_string(),
            group.to_string(),
            event_id.to_string(),
        ));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Repository content client
// ---------------------------------------------------------------------------

/// Scripted repository client
#[derive(Default)]
pub struct MockRepositoryClient {
    commits: HashMap<String, Vec<ChangedFile>>,
    contents: HashMap<(String, String), FileContent>,
    failing_commits: HashSet<String>,
    failing_files: HashSet<String>,
    queried_commits: Mutex<Vec<String>>,
}

impl MockRepositoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commit(mut self, sha: &str, files: Vec<ChangedFile>) -> Self {
        self.commits.insert(sha.to_string(), files);
        self
    }

    pub fn with_content(self, sha: &str, path: &str, text: &str) -> Self {
        let size = text.len() as u64;
        self.with_sized_content(sha, path, text, size)
    }

    pub fn with_sized_content(mut self, sha: &str, path: &str, text: &str, size: u64) -> Self {
        self.contents.insert(
            (sha.to_string(), path.to_string()),
            FileContent {
                text: text.to_string(),
                size,
            },
        );
        self
    }

    pub fn failing_commit(mut self, sha: &str) -> Self {
        self.failing_commits.insert(sha.to_string());
        self
    }

    pub fn failing_file(mut self, path: &str) -> Self {
        self.failing_files.insert(path.to_string());
        self
    }

    /// Commit shas that were asked for, in order
    pub fn queried_commits(&self) -> Vec<String> {
        self.queried_commits
            .lock()
            .expect("client mock poisoned")
            .clone()
    }
}

/// A modified file entry with the given declared change count
pub fn modified_file(path: &str, changes: u64) -> ChangedFile {
    ChangedFile {
        filename: path.to_string(),
        status: leakwatch_orchestrator::infrastructure::github::ChangeStatus::Modified,
        changes,
    }
}

/// A removed file entry; its content no longer exists at the commit
pub fn removed_file(path: &str) -> ChangedFile {
    ChangedFile {
        filename: path.to_string(),
        status: leakwatch_orchestrator::infrastructure::github::ChangeStatus::Removed,
        changes: 1,
    }
}

#[async_trait]
impl RepositoryClient for MockRepositoryClient {
    async fn commit_files(
        &self,
        _repository: &str,
        sha: &str,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        self.queried_commits
            .lock()
            .expect("client mock poisoned")
            .push(sha.to_string());

        if self.failing_commits.contains(sha) {
            return Err(GitHubError::Status {
                status: 502,
                url: format!("mock://commits/{sha}"),
            });
        }
        Ok(self.commits.get(sha).cloned().unwrap_or_default())
    }

    async fn file_content(
        &self,
        _repository: &str,
        path: &str,
        reference: &str,
    ) -> Result<FileContent, GitHubError> {
        if self.failing_files.contains(path) {
            return Err(GitHubError::Status {
                status: 502,
                url: format!("mock://contents/{path}"),
            });
        }
        self.contents
            .get(&(reference.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| GitHubError::Status {
                status: 404,
                url: format!("mock://contents/{path}"),
            })
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// In-memory finding repository
#[derive(Default)]
pub struct InMemoryFindingRepository {
    findings: Mutex<Vec<StoredFinding>>,
    fail_saves: bool,
}

impl InMemoryFindingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose save_batch always fails
    pub fn failing() -> Self {
        Self {
            findings: Mutex::new(Vec::new()),
            fail_saves: true,
        }
    }

    pub fn all(&self) -> Vec<StoredFinding> {
        self.findings.lock().expect("finding mock poisoned").clone()
    }

    pub fn count_for_job(&self, job_id: Uuid) -> usize {
        self.all()
            .iter()
            .filter(|f| f.scan_job_id == job_id)
            .count()
    }
}

#[async_trait]
impl FindingRepository for InMemoryFindingRepository {
    async fn save_batch(&self, new_findings: &[NewFinding]) -> Result<u64, PersistenceError> {
        if self.fail_saves {
            return Err(PersistenceError::Database("connection lost".to_string()));
        }

        let mut findings = self.findings.lock().expect("finding mock poisoned");
        for finding in new_findings {
            let id = findings.len() as i64 + 1;
            findings.push(StoredFinding {
                id,
                repository_id: finding.repository_id,
                scan_job_id: finding.scan_job_id,
                commit_sha: finding.commit_sha.clone(),
                secret_type: finding.secret_type.clone(),
                snippet: finding.snippet.clone(),
                file_path: finding.file_path.clone(),
                line_number: finding.line_number,
                column_start: finding.column_start,
                column_end: finding.column_end,
                entropy: finding.entropy,
                severity: finding.severity,
                confidence: finding.confidence,
                status: FindingStatus::Open,
                discovered_at: Utc::now(),
            });
        }
        Ok(new_findings.len() as u64)
    }

    async fn list(&self, filter: &FindingFilter) -> Result<Vec<StoredFinding>, PersistenceError> {
        let findings = self.findings.lock().expect("finding mock poisoned");
        Ok(findings
            .iter()
            .filter(|f| filter.severity.is_none_or(|s| f.severity == s))
            .filter(|f| {
                filter
                    .secret_type
                    .as_ref()
                    .is_none_or(|t| &f.secret_type == t)
            })
            .filter(|f| filter.repository_id.is_none_or(|id| f.repository_id == id))
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFinding>, PersistenceError> {
        let findings = self.findings.lock().expect("finding mock poisoned");
        Ok(findings.iter().find(|f| f.id == id).cloned())
    }

    async fn stats(&self, days: i64) -> Result<FindingStats, PersistenceError> {
        let findings = self.findings.lock().expect("finding mock poisoned");
        let mut by_severity = BTreeMap::new();
        let mut by_type = BTreeMap::new();
        for finding in findings.iter() {
            *by_severity
                .entry(finding.severity.as_str().to_string())
                .or_insert(0) += 1;
            *by_type.entry(finding.secret_type.clone()).or_insert(0) += 1;
        }
        Ok(FindingStats {
            total: findings.len() as i64,
            by_severity,
            by_type,
            window_days: days,
        })
    }
}

/// In-memory scan-job repository
#[derive(Default)]
pub struct InMemoryScanJobRepository {
    jobs: Mutex<HashMap<Uuid, ScanJob>>,
}

impl InMemoryScanJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ScanJob> {
        self.jobs
            .lock()
            .expect("job mock poisoned")
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ScanJobRepository for InMemoryScanJobRepository {
    async fn create(&self, job: &ScanJob) -> Result<(), PersistenceError> {
        self.jobs
            .lock()
            .expect("job mock poisoned")
            .insert(job.id, job.clone());
        Ok(())
    }

    async fn update(&self, job: &ScanJob) -> Result<(), PersistenceError> {
        self.jobs
            .lock()
            .expect("job mock poisoned")
            .insert(job.id, job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScanJob>, PersistenceError> {
        Ok(self.jobs.lock().expect("job mock poisoned").get(&id).cloned())
    }
}

/// In-memory repository store
#[derive(Default)]
pub struct InMemoryRepositoryStore {
    records: Mutex<HashMap<i64, RepositoryRecord>>,
    fail_resolution: bool,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose get_or_create always fails
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_resolution: true,
        }
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn get_or_create(
        &self,
        repo: &NewRepository,
    ) -> Result<RepositoryRecord, PersistenceError> {
        if self.fail_resolution {
            return Err(PersistenceError::Database(
                "repository not resolvable".to_string(),
            ));
        }

        let mut records = self.records.lock().expect("repo mock poisoned");
        let next_id = records.len() as i64 + 1;
        let record = records
            .entry(repo.github_id)
            .or_insert_with(|| RepositoryRecord {
                id: next_id,
                github_id: repo.github_id,
                full_name: repo.full_name.clone(),
                owner: repo.owner.clone(),
                name: repo.name.clone(),
                description: repo.description.clone(),
                is_private: repo.is_private,
                stars: repo.stars,
                language: repo.language.clone(),
                first_seen: Utc::now(),
                last_scanned: None,
            });
        Ok(record.clone())
    }

    async fn touch_last_scanned(&self, id: i64) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().expect("repo mock poisoned");
        for record in records.values_mut() {
            if record.id == id {
                record.last_scanned = Some(Utc::now());
            }
        }
        Ok(())
    }
}
