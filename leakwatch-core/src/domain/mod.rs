//! Shared domain models

pub mod event;

pub use event::{ChangedCommit, EventKind, PushPayload, RepositoryInfo, StreamEvent};
