//! Durable event stream with consumer-group semantics
//!
//! The stream owns an event until a consumer acknowledges it. An entry that
//! is delivered but never acknowledged stays on the group's pending list and
//! is recovered when another consumer identity claims it or a restarted
//! consumer drains its own pending entries — that redelivery is the sole
//! retry mechanism; there is no attempt counter and no backoff policy.

mod redis_stream;

pub use redis_stream::RedisEventStream;

use std::time::Duration;

use async_trait::async_trait;

use leakwatch_core::domain::StreamEvent;

/// At-least-once event retrieval and acknowledgement
#[async_trait]
pub trait EventStream: Send + Sync {
    /// Create the consumer group if it does not exist. Creating a group that
    /// already exists is a no-op, not an error.
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), StreamError>;

    /// Append an event to the stream, returning its id
    async fn publish(&self, stream: &str, event: &StreamEvent) -> Result<String, StreamError>;

    /// Read up to `count` undelivered events for this consumer, blocking up
    /// to `block` when none are available. Returns zero or more
    /// (event id, event) pairs.
    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block: Duration,
    ) -> Result<Vec<(String, StreamEvent)>, StreamError>;

    /// Remove an event from the group's pending list
    async fn acknowledge(&self, stream: &str, group: &str, event_id: &str)
        -> Result<(), StreamError>;
}

/// Stream transport and encoding errors
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Stream connection error: {0}")]
    Connection(String),

    #[error("Stream command failed: {0}")]
    Command(String),

    #[error("Malformed stream entry {entry_id}: {message}")]
    Malformed { entry_id: String, message: String },
}
