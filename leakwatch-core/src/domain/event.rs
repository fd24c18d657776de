//! Change-event model shared between the webhook intake and the scan worker
//!
//! Events travel through the durable stream as flat field/value entries; the
//! structured `payload` document is serialized to a JSON string on publish and
//! parsed back on read. The stream owns an event until it is acknowledged —
//! consumers hold only a transient reference while processing.

use serde::{Deserialize, Serialize};

/// Supported change-event types, each mapped to its own stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Push,
    PullRequest,
    Release,
    SecurityAdvisory,
}

impl EventKind {
    /// Parse the `X-GitHub-Event` header value; unsupported types yield `None`
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            "push" => Some(Self::Push),
            "pull_request" => Some(Self::PullRequest),
            "release" => Some(Self::Release),
            "security_advisory" => Some(Self::SecurityAdvisory),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Release => "release",
            Self::SecurityAdvisory => "security_advisory",
        }
    }

    /// Stream key this event kind is published to
    pub fn stream_key(&self) -> &'static str {
        match self {
            Self::Push => "github:push",
            Self::PullRequest => "github:pull_request",
            Self::Release => "github:release",
            Self::SecurityAdvisory => "github:security_advisory",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change event as carried on the stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event_type: EventKind,
    /// Repository full name, e.g. "octocat/hello-world"
    pub repository: String,
    /// Login of the account that triggered the event
    pub sender: String,
    /// The full webhook payload document
    pub payload: serde_json::Value,
}

impl StreamEvent {
    pub fn new(
        event_type: EventKind,
        repository: impl Into<String>,
        sender: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            repository: repository.into(),
            sender: sender.into(),
            payload,
        }
    }

    /// Extract the typed push payload from the raw document.
    ///
    /// Missing fields default to empty values rather than failing, matching
    /// the tolerant treatment of webhook payloads at the boundary.
    pub fn push_payload(&self) -> Result<PushPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Typed view of a push-event payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    pub commits: Vec<ChangedCommit>,
    pub repository: RepositoryInfo,
}

/// Commit reference within a push payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangedCommit {
    pub id: String,
    pub message: Option<String>,
    pub timestamp: Option<String>,
}

/// Repository metadata within a webhook payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryInfo {
    pub id: i64,
    pub full_name: String,
    pub name: String,
    pub owner: OwnerInfo,
    pub description: Option<String>,
    pub private: bool,
    pub stargazers_count: i64,
    pub language: Option<String>,
}

/// Repository owner; push payloads use `name`, most other payloads `login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerInfo {
    pub login: Option<String>,
    pub name: Option<String>,
}

impl OwnerInfo {
    pub fn display_name(&self) -> &str {
        self.login
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_push_payload() {
        let event = StreamEvent::new(
            EventKind::Push,
            "octocat/hello-world",
            "octocat",
            json!({
                "commits": [{"id": "abc123", "message": "initial"}],
                "repository": {
                    "id": 42,
                    "full_name": "octocat/hello-world",
                    "name": "hello-world",
                    "owner": {"login": "octocat"},
                    "private": false,
                    "stargazers_count": 7
                }
            }),
        );

        let payload = event.push_payload().unwrap();
        assert_eq!(payload.commits.len(), 1);
        assert_eq!(payload.commits[0].id, "abc123");
        assert_eq!(payload.repository.id, 42);
        assert_eq!(payload.repository.owner.display_name(), "octocat");
    }

    #[test]
    fn tolerates_missing_fields() {
        let event = StreamEvent::new(EventKind::Push, "a/b", "a", json!({}));
        let payload = event.push_payload().unwrap();
        assert!(payload.commits.is_empty());
        assert_eq!(payload.repository.id, 0);
    }

    #[test]
    fn event_kind_round_trips_through_header_values() {
        for kind in [
            EventKind::Push,
            EventKind::PullRequest,
            EventKind::Release,
            EventKind::SecurityAdvisory,
        ] {
            assert_eq!(EventKind::from_header(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_header("issues"), None);
    }
}
