//! GitHub REST API client

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::debug;

use super::{ChangedFile, FileContent, GitHubError, RepositoryClient};

const USER_AGENT: &str = concat!("leakwatch/", env!("CARGO_PKG_VERSION"));

/// Commit detail response; only the file list is of interest
#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

/// Contents API response
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
    #[serde(default)]
    size: u64,
}

/// REST client for commit listings and file contents
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Build a client against an API base URL. An empty token means
    /// unauthenticated requests.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let token = token.into();

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: (!token.is_empty()).then_some(token),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GitHubError> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GitHubError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    async fn commit_files(
        &self,
        repository: &str,
        sha: &str,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        let url = format!("{}/repos/{}/commits/{}", self.base_url, repository, sha);
        let detail: CommitDetail = self.get_json(&url).await?;

        debug!(
            repository,
            sha,
            file_count = detail.files.len(),
            "Listed commit files"
        );
        Ok(detail.files)
    }

    async fn file_content(
        &self,
        repository: &str,
        path: &str,
        reference: &str,
    ) -> Result<FileContent, GitHubError> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.base_url, repository, path, reference
        );
        let contents: ContentsResponse = self.get_json(&url).await?;

        let text = match contents.encoding.as_str() {
            "base64" => {
                // The API wraps base64 content in newlines
                let compact: String = contents
                    .content
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let bytes = STANDARD.decode(compact).map_err(|e| GitHubError::Decode {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
                // Undecodable sequences are replaced, never fatal
                String::from_utf8_lossy(&bytes).into_owned()
            }
            _ => contents.content,
        };

        Ok(FileContent {
            text,
            size: contents.size,
        })
    }
}
