//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub github: GitHubConfig,
    pub scanning: ScanningConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// PostgreSQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/leakwatch".to_string(),
            max_connections: 10,
            connect_timeout_seconds: 30,
        }
    }
}

/// Redis Streams configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    /// Approximate maximum stream length; older entries are trimmed on publish
    pub stream_max_len: usize,
    pub consumer_group: String,
    /// Consumer identity within the group; must be unique per worker instance
    pub consumer_name: String,
    /// How long a poll blocks waiting for new events, in milliseconds
    pub block_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            stream_max_len: 10_000,
            consumer_group: "scanner-workers".to_string(),
            consumer_name: "scanner-worker-1".to_string(),
            block_timeout_ms: 5_000,
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token used for content fetches; empty means unauthenticated
    pub token: String,
    /// Shared secret for webhook signature verification; empty disables the check
    pub webhook_secret: String,
    pub api_base_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            webhook_secret: String::new(),
            api_base_url: "https://api.github.com".to_string(),
        }
    }
}

/// Scan workflow limits and detection knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Cap on commits processed per push event (most recent first)
    pub max_commits_per_event: usize,
    /// Files whose declared change count exceeds this are skipped
    pub max_file_changes: u64,
    pub max_file_size_mb: u64,
    pub detection: DetectionConfig,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_commits_per_event: 10,
            max_file_changes: 1_000,
            max_file_size_mb: 10,
            detection: DetectionConfig::default(),
        }
    }
}

impl ScanningConfig {
    /// Maximum fetched file size in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// Detection engine limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Lines longer than this are skipped entirely (minified/binary-like content)
    pub max_line_length: usize,
    /// Matched snippets are truncated to this many characters before leaving the engine
    pub snippet_max_chars: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_line_length: 10_000,
            snippet_max_chars: 100,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive, overridable via `RUST_LOG`
    pub level: String,
    /// Output format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("LEAKWATCH").separator("__"));

        let mut config: Config = builder.build()?.try_deserialize()?;

        // Honor the DATABASE_URL / REDIS_URL conventions when present
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            config.database.url = database_url;
        }
        if let Ok(redis_url) = std::env::var("REDIS_URL") {
            config.redis.url = redis_url;
        }

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
