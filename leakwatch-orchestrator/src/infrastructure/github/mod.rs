//! Changed-file listing and content fetching
//!
//! The scan engine consumes text only; lossy decoding of invalid byte
//! sequences happens here, never in the engine.

mod client;

pub use client::GitHubClient;

use async_trait::async_trait;
use serde::Deserialize;

/// A file touched by a commit, as declared by the commit listing
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: ChangeStatus,
    /// Declared change count (additions + deletions)
    #[serde(default)]
    pub changes: u64,
}

impl ChangedFile {
    /// Only content that exists at the commit is fetchable
    pub fn has_content(&self) -> bool {
        matches!(self.status, ChangeStatus::Added | ChangeStatus::Modified)
    }
}

/// Change status of a file within a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    #[serde(other)]
    Other,
}

/// Decoded file content with its declared byte size
#[derive(Debug, Clone)]
pub struct FileContent {
    pub text: String,
    pub size: u64,
}

/// Read access to repository contents at a revision
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// List the files changed by a commit
    async fn commit_files(&self, repository: &str, sha: &str)
        -> Result<Vec<ChangedFile>, GitHubError>;

    /// Fetch a file's decoded text content at a revision
    async fn file_content(
        &self,
        repository: &str,
        path: &str,
        reference: &str,
    ) -> Result<FileContent, GitHubError>;
}

/// GitHub API errors
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode content of {path}: {message}")]
    Decode { path: String, message: String },
}
