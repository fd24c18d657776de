//! HTTP controllers

pub mod findings;
pub mod health;
pub mod webhooks;

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::infrastructure::persistence::FindingRepository;
use crate::infrastructure::stream::EventStream;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct ApiState {
    pub findings: Arc<dyn FindingRepository>,
    pub stream: Arc<dyn EventStream>,
    /// Raw handles used only by the health probes
    pub db_pool: Arc<PgPool>,
    pub redis: ConnectionManager,
    /// Shared webhook secret; `None` disables signature verification
    pub webhook_secret: Option<String>,
}
