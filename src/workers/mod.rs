//! Background workers for the Leakwatch application
//!
//! This module spawns the scan worker that consumes change events from the
//! durable stream and drives them through the scan workflow.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use leakwatch_core::config::RedisConfig;
use leakwatch_orchestrator::application::{ConsumerSettings, ScanWorker, ScanWorkflow};
use leakwatch_orchestrator::infrastructure::stream::EventStream;

/// Spawn the background scan worker.
///
/// The worker polls one event at a time and stops polling once the token is
/// cancelled; the in-flight event still reaches a terminal state.
pub fn spawn_scan_worker(
    stream: Arc<dyn EventStream>,
    workflow: Arc<ScanWorkflow>,
    config: &RedisConfig,
    shutdown_token: CancellationToken,
) {
    let settings = ConsumerSettings::from_config(config);
    let worker = ScanWorker::new(stream, workflow, settings);

    tokio::spawn(async move {
        worker.run(shutdown_token).await;
    });
}
