//! Application assembly
//!
//! Builds the router and the background worker from configuration and the
//! initialized infrastructure.

use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

use leakwatch_core::Config;
use leakwatch_orchestrator::application::{ScanLimits, ScanWorkflow};
use leakwatch_orchestrator::infrastructure::github::RepositoryClient;
use leakwatch_orchestrator::infrastructure::persistence::{
    init_schema, FindingRepository, PgFindingRepository, PgRepositoryStore, PgScanJobRepository,
    RepositoryStore, ScanJobRepository,
};
use leakwatch_orchestrator::infrastructure::stream::EventStream;
use leakwatch_orchestrator::presentation::{build_router, ApiState};
use leakwatch_secrets::ScanEngine;

use crate::infra::Infrastructure;
use crate::workers::spawn_scan_worker;

/// Running application: the HTTP router plus the token that stops the
/// background worker
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
}

/// Initialize infrastructure, bootstrap the schema, spawn the scan worker,
/// and assemble the HTTP router.
pub async fn create_app(
    config: Config,
) -> Result<AppHandle, Box<dyn std::error::Error + Send + Sync>> {
    let infra = Infrastructure::init(&config).await?;
    init_schema(&infra.db_pool).await?;

    let engine = Arc::new(ScanEngine::with_config(&config.scanning.detection));
    let github: Arc<dyn RepositoryClient> = infra.github_client.clone();
    let findings: Arc<dyn FindingRepository> =
        Arc::new(PgFindingRepository::new(infra.db_pool.clone()));
    let jobs: Arc<dyn ScanJobRepository> =
        Arc::new(PgScanJobRepository::new(infra.db_pool.clone()));
    let repositories: Arc<dyn RepositoryStore> =
        Arc::new(PgRepositoryStore::new(infra.db_pool.clone()));
    let stream: Arc<dyn EventStream> = Arc::new(infra.event_stream.clone());

    let workflow = Arc::new(ScanWorkflow::new(
        engine,
        github,
        repositories,
        jobs,
        findings.clone(),
        ScanLimits::from(&config.scanning),
    ));

    let shutdown_token = CancellationToken::new();
    spawn_scan_worker(
        stream.clone(),
        workflow,
        &config.redis,
        shutdown_token.clone(),
    );
    info!(
        group = %config.redis.consumer_group,
        consumer = %config.redis.consumer_name,
        "Scan worker spawned"
    );

    let state = ApiState {
        findings,
        stream,
        db_pool: infra.db_pool.clone(),
        redis: infra.event_stream.connection(),
        webhook_secret: (!config.github.webhook_secret.is_empty())
            .then(|| config.github.webhook_secret.clone()),
    };

    let router = build_router(state, &config.cors);

    Ok(AppHandle {
        router,
        shutdown_token,
    })
}
