//! Leakwatch Orchestrator - Event-driven scan orchestration
//!
//! This crate turns change events into durable, classified findings:
//!
//! - [`infrastructure::stream`] — at-least-once event consumption from Redis
//!   Streams via consumer groups
//! - [`infrastructure::github`] — changed-file listing and content fetching
//!   over the GitHub REST API
//! - [`infrastructure::persistence`] — finding, scan-job, and repository
//!   storage in PostgreSQL
//! - [`application`] — the per-event scan workflow and the worker loop
//! - [`presentation`] — webhook intake, findings queries, and health probes
//!
//! Each worker processes one event fully (poll → fetch → scan → persist →
//! acknowledge) before polling again; horizontal scale-out is additional
//! worker instances with distinct consumer names in the same group.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
