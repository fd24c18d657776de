//! Redis Streams implementation of the event stream

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::{StreamMaxlen, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client};
use tracing::{debug, error, warn};

use leakwatch_core::domain::{EventKind, StreamEvent};

use super::{EventStream, StreamError};

/// Event stream backed by Redis Streams and consumer groups.
///
/// Non-scalar payload fields are serialized to JSON text on publish and
/// parsed back to structured values on read.
#[derive(Clone)]
pub struct RedisEventStream {
    manager: ConnectionManager,
    stream_max_len: usize,
}

impl RedisEventStream {
    /// Connect and verify the connection with a PING.
    pub async fn connect(url: &str, stream_max_len: usize) -> Result<Self, StreamError> {
        let client = Client::open(url).map_err(|e| {
            error!(error = %e, "Failed to create Redis client");
            StreamError::Connection(e.to_string())
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            error!(error = %e, "Failed to establish Redis connection");
            StreamError::Connection(e.to_string())
        })?;

        let mut conn = manager.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to ping Redis");
                StreamError::Connection(e.to_string())
            })?;

        debug!("Connected to Redis event stream at {}", url);

        Ok(Self {
            manager,
            stream_max_len,
        })
    }

    /// A connection handle for health probes
    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    fn decode_entry(
        entry_id: &str,
        map: &HashMap<String, redis::Value>,
    ) -> Result<StreamEvent, StreamError> {
        let field = |name: &str| -> Result<String, StreamError> {
            let value = map.get(name).ok_or_else(|| StreamError::Malformed {
                entry_id: entry_id.to_string(),
                message: format!("missing field '{name}'"),
            })?;
            redis::from_redis_value(value).map_err(|e| StreamError::Malformed {
                entry_id: entry_id.to_string(),
                message: format!("field '{name}': {e}"),
            })
        };

        let event_type_raw = field("event_type")?;
        let event_type =
            EventKind::from_header(&event_type_raw).ok_or_else(|| StreamError::Malformed {
                entry_id: entry_id.to_string(),
                message: format!("unknown event type '{event_type_raw}'"),
            })?;

        let repository = field("repository")?;
        let sender = field("sender")?;
        let payload_raw = field("payload")?;
        // Fall back to the raw text when the payload is not valid JSON
        let payload = serde_json::from_str(&payload_raw)
            .unwrap_or_else(|_| serde_json::Value::String(payload_raw));

        Ok(StreamEvent {
            event_type,
            repository,
            sender,
            payload,
        })
    }
}

#[async_trait]
impl EventStream for RedisEventStream {
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), StreamError> {
        let mut conn = self.manager.clone();

        let result: Result<String, redis::RedisError> =
            conn.xgroup_create_mkstream(stream, group, "0").await;

        match result {
            Ok(_) => {
                debug!(stream, group, "Created consumer group");
                Ok(())
            }
            // Creating a group that already exists is a no-op
            Err(e) if e.code() == Some("BUSYGROUP") => {
                debug!(stream, group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => {
                error!(stream, group, error = %e, "Failed to create consumer group");
                Err(StreamError::Command(e.to_string()))
            }
        }
    }

    async fn publish(&self, stream: &str, event: &StreamEvent) -> Result<String, StreamError> {
        let mut conn = self.manager.clone();

        let payload = serde_json::to_string(&event.payload)
            .map_err(|e| StreamError::Command(format!("payload serialization: {e}")))?;
        let fields = [
            ("event_type", event.event_type.as_str().to_string()),
            ("repository", event.repository.clone()),
            ("sender", event.sender.clone()),
            ("payload", payload),
        ];

        let event_id: String = conn
            .xadd_maxlen(stream, StreamMaxlen::Approx(self.stream_max_len), "*", &fields)
            .await
            .map_err(|e| {
                error!(stream, error = %e, "Failed to publish event");
                StreamError::Command(e.to_string())
            })?;

        debug!(stream, event_id = %event_id, "Published event to stream");
        Ok(event_id)
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block: Duration,
    ) -> Result<Vec<(String, StreamEvent)>, StreamError> {
        let mut conn = self.manager.clone();

        let options = StreamReadOptions::default()
            .group(group, consumer)
            .count(count)
            .block(block.as_millis() as usize);

        let reply: StreamReadReply = conn
            .xread_options(&[stream], &[">"], &options)
            .await
            .map_err(|e| {
                error!(stream, group, error = %e, "Failed to read from stream");
                StreamError::Command(e.to_string())
            })?;

        let mut events = Vec::new();
        for key in reply.keys {
            for entry in key.ids {
                match Self::decode_entry(&entry.id, &entry.map) {
                    Ok(event) => events.push((entry.id, event)),
                    // Skipped entries stay on the pending list for operator
                    // inspection instead of poisoning the worker loop
                    Err(e) => warn!(stream, error = %e, "Skipping malformed stream entry"),
                }
            }
        }

        Ok(events)
    }

    async fn acknowledge(
        &self,
        stream: &str,
        group: &str,
        event_id: &str,
    ) -> Result<(), StreamError> {
        let mut conn = self.manager.clone();

        let acked: i64 = conn.xack(stream, group, &[event_id]).await.map_err(|e| {
            error!(stream, event_id, error = %e, "Failed to acknowledge event");
            StreamError::Command(e.to_string())
        })?;

        debug!(stream, event_id, acked, "Acknowledged event");
        Ok(())
    }
}
