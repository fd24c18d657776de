//! Scan worker: run-until-cancelled event consumption
//!
//! Each worker processes one event fully (poll → fetch → scan → persist →
//! acknowledge) before polling again. The poll is the only designed
//! suspension point; shutdown is cooperative and takes effect between
//! events, never mid-processing.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use leakwatch_core::config::RedisConfig;
use leakwatch_core::domain::{EventKind, StreamEvent};

use crate::application::workflow::ScanWorkflow;
use crate::infrastructure::stream::EventStream;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Consumer identity and polling parameters
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub stream: String,
    pub group: String,
    pub consumer: String,
    pub block: Duration,
    pub batch_size: usize,
}

impl ConsumerSettings {
    /// Settings for the push-event stream from the Redis configuration
    pub fn from_config(config: &RedisConfig) -> Self {
        Self {
            stream: EventKind::Push.stream_key().to_string(),
            group: config.consumer_group.clone(),
            consumer: config.consumer_name.clone(),
            block: Duration::from_millis(config.block_timeout_ms),
            // One event at a time: no two events run concurrently in a worker
            batch_size: 1,
        }
    }
}

/// Worker that consumes change events and drives the scan workflow
pub struct ScanWorker {
    stream: Arc<dyn EventStream>,
    workflow: Arc<ScanWorkflow>,
    settings: ConsumerSettings,
}

impl ScanWorker {
    pub fn new(
        stream: Arc<dyn EventStream>,
        workflow: Arc<ScanWorkflow>,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            stream,
            workflow,
            settings,
        }
    }

    /// Consume events until the token is cancelled.
    ///
    /// The in-flight event always reaches a terminal state before the loop
    /// observes cancellation.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            stream = %self.settings.stream,
            group = %self.settings.group,
            consumer = %self.settings.consumer,
            "Scan worker started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scan worker shutting down before joining group");
                    return;
                }
                result = self.stream.ensure_group(&self.settings.stream, &self.settings.group) => {
                    match result {
                        Ok(()) => break,
                        Err(e) => {
                            error!(error = %e, "Failed to join consumer group; retrying");
                            tokio::time::sleep(POLL_RETRY_DELAY).await;
                        }
                    }
                }
            }
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scan worker shutting down");
                    break;
                }
                polled = self.stream.read_group(
                    &self.settings.stream,
                    &self.settings.group,
                    &self.settings.consumer,
                    self.settings.batch_size,
                    self.settings.block,
                ) => {
                    match polled {
                        Ok(events) => {
                            for (event_id, event) in events {
                                self.handle(&event_id, &event).await;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Worker poll error");
                            tokio::time::sleep(POLL_RETRY_DELAY).await;
                        }
                    }
                }
            }
        }
    }

    /// Drive one event to a terminal state, acknowledging only once that
    /// state is durably recorded.
    async fn handle(&self, event_id: &str, event: &StreamEvent) {
        match self.workflow.process(event).await {
            Ok(_) => {
                if let Err(e) = self
                    .stream
                    .acknowledge(&self.settings.stream, &self.settings.group, event_id)
                    .await
                {
                    // The event will be redelivered and re-scanned
                    error!(event_id, error = %e, "Failed to acknowledge event");
                }
            }
            Err(e) => {
                // Left unacknowledged on purpose: redelivery is the retry path
                error!(event_id, error = %e, "Event processing failed; leaving unacknowledged");
            }
        }
    }
}
