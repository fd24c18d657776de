//! Infrastructure initialization for the Leakwatch application
//!
//! This module handles the setup of core infrastructure components: the
//! database pool, the Redis event stream, and the GitHub content client.

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use leakwatch_core::Config;
use leakwatch_orchestrator::infrastructure::github::GitHubClient;
use leakwatch_orchestrator::infrastructure::stream::RedisEventStream;

/// Infrastructure components initialized at startup
pub struct Infrastructure {
    pub db_pool: Arc<PgPool>,
    pub event_stream: RedisEventStream,
    pub github_client: Arc<GitHubClient>,
}

impl Infrastructure {
    /// Initialize all infrastructure components from configuration
    pub async fn init(config: &Config) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Initializing PostgreSQL database pool");
        let db_pool = Arc::new(
            PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(
                    config.database.connect_timeout_seconds,
                ))
                .connect(&config.database.url)
                .await?,
        );

        info!("Initializing Redis event stream at {}", config.redis.url);
        let event_stream =
            RedisEventStream::connect(&config.redis.url, config.redis.stream_max_len).await?;

        let github_client = Arc::new(GitHubClient::new(
            &config.github.api_base_url,
            &config.github.token,
        )?);

        Ok(Self {
            db_pool,
            event_stream,
            github_client,
        })
    }
}
