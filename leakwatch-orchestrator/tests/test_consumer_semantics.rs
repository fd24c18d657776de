//! Delivery, acknowledgement, and redelivery semantics
//!
//! At-least-once delivery with non-idempotent persistence means a crash
//! before acknowledgement re-scans the event and duplicates findings; these
//! tests assert that duplication occurs rather than assuming exactly-once.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::fixtures::{aws_key_content, push_event};
use common::mocks::{
    modified_file, InMemoryEventStream, InMemoryFindingRepository, InMemoryRepositoryStore,
    InMemoryScanJobRepository, MockRepositoryClient,
};
use leakwatch_core::domain::EventKind;
use leakwatch_orchestrator::application::{
    ConsumerSettings, ScanLimits, ScanWorker, ScanWorkflow,
};
use leakwatch_orchestrator::infrastructure::stream::EventStream;
use leakwatch_secrets::ScanEngine;

const STREAM: &str = "github:push";
const GROUP: &str = "scanner-workers";
const CONSUMER: &str = "scanner-worker-1";

fn scripted_workflow(
    findings: Arc<InMemoryFindingRepository>,
    jobs: Arc<InMemoryScanJobRepository>,
) -> Arc<ScanWorkflow> {
    let client = MockRepositoryClient::new()
        .with_commit("c1", vec![modified_file("creds.py", 3)])
        .with_content("c1", "creds.py", aws_key_content());

    Arc::new(ScanWorkflow::new(
        Arc::new(ScanEngine::with_defaults()),
        Arc::new(client),
        Arc::new(InMemoryRepositoryStore::new()),
        jobs,
        findings,
        ScanLimits {
            max_commits: 10,
            max_file_changes: 1_000,
            max_file_size_bytes: 10 * 1024 * 1024,
        },
    ))
}

#[tokio::test]
async fn group_creation_is_idempotent() {
    let stream = InMemoryEventStream::new(Duration::ZERO);
    stream.ensure_group(STREAM, GROUP).await.unwrap();
    stream
        .ensure_group(STREAM, GROUP)
        .await
        .expect("creating an existing group is a no-op");
}

#[tokio::test]
async fn acknowledged_events_are_not_redelivered() {
    let stream = InMemoryEventStream::new(Duration::ZERO);
    stream.ensure_group(STREAM, GROUP).await.unwrap();
    stream
        .publish(STREAM, &push_event("octocat/hello-world", &["c1"]))
        .await
        .unwrap();

    let delivered = stream
        .read_group(STREAM, GROUP, CONSUMER, 10, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(stream.pending_count(STREAM, GROUP), 1);

    let (event_id, _) = &delivered[0];
    stream.acknowledge(STREAM, GROUP, event_id).await.unwrap();
    assert_eq!(stream.pending_count(STREAM, GROUP), 0);

    // Even with immediate redelivery configured, an acknowledged event is gone
    let redelivered = stream
        .read_group(STREAM, GROUP, CONSUMER, 10, Duration::ZERO)
        .await
        .unwrap();
    assert!(redelivered.is_empty());
}

#[tokio::test]
async fn crash_before_ack_redelivers_and_duplicates_findings() {
    let stream = InMemoryEventStream::new(Duration::ZERO);
    let findings = Arc::new(InMemoryFindingRepository::new());
    let jobs = Arc::new(InMemoryScanJobRepository::new());
    let workflow = scripted_workflow(findings.clone(), jobs.clone());

    stream.ensure_group(STREAM, GROUP).await.unwrap();
    stream
        .publish(STREAM, &push_event("octocat/hello-world", &["c1"]))
        .await
        .unwrap();

    // First delivery: processed to completion, but the consumer "crashes"
    // before acknowledging
    let first = stream
        .read_group(STREAM, GROUP, CONSUMER, 1, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    workflow.process(&first[0].1).await.unwrap();
    assert_eq!(findings.all().len(), 1);

    // Redelivery: the full re-scan runs again from scratch
    let second = stream
        .read_group(STREAM, GROUP, CONSUMER, 1, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].0, first[0].0, "same event id is redelivered");
    workflow.process(&second[0].1).await.unwrap();

    // At-least-once plus non-idempotent persistence: findings duplicate
    assert_eq!(findings.all().len(), 2);
    assert_eq!(jobs.all().len(), 2, "each delivery runs its own scan job");
}

#[tokio::test]
async fn worker_loop_processes_and_acknowledges() {
    let stream = Arc::new(InMemoryEventStream::new(Duration::from_secs(60)));
    let findings = Arc::new(InMemoryFindingRepository::new());
    let jobs = Arc::new(InMemoryScanJobRepository::new());
    let workflow = scripted_workflow(findings.clone(), jobs.clone());

    stream
        .publish(STREAM, &push_event("octocat/hello-world", &["c1"]))
        .await
        .unwrap();

    let settings = ConsumerSettings {
        stream: EventKind::Push.stream_key().to_string(),
        group: GROUP.to_string(),
        consumer: CONSUMER.to_string(),
        block: Duration::from_millis(20),
        batch_size: 1,
    };
    let worker = ScanWorker::new(stream.clone(), workflow, settings);

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(worker.run(shutdown.clone()));

    // Give the worker time to poll, process, and acknowledge
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker should stop on cancellation")
        .expect("worker task should not panic");

    assert_eq!(findings.all().len(), 1);
    assert_eq!(jobs.all().len(), 1);
    assert_eq!(
        stream.pending_count(STREAM, GROUP),
        0,
        "terminal completion acknowledges the event"
    );
}
