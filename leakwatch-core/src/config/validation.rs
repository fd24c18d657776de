//! Configuration validation module

use crate::config::{
    Config, DatabaseConfig, LoggingConfig, RedisConfig, ScanningConfig, ServerConfig,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Database configuration error: {message}")]
    Database { message: String },

    #[error("Redis configuration error: {message}")]
    Redis { message: String },

    #[error("Scanning configuration error: {message}")]
    Scanning { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn redis(message: impl Into<String>) -> Self {
        Self::Redis {
            message: message.into(),
        }
    }

    pub fn scanning(message: impl Into<String>) -> Self {
        Self::Scanning {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::server("host must not be empty"));
        }
        if self.port == 0 {
            return Err(ValidationError::server("port must be non-zero"));
        }
        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::database("url must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(ValidationError::database(
                "max_connections must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::redis("url must not be empty"));
        }
        if self.consumer_group.is_empty() {
            return Err(ValidationError::redis("consumer_group must not be empty"));
        }
        if self.consumer_name.is_empty() {
            return Err(ValidationError::redis("consumer_name must not be empty"));
        }
        Ok(())
    }
}

impl Validate for ScanningConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_commits_per_event == 0 {
            return Err(ValidationError::scanning(
                "max_commits_per_event must be at least 1",
            ));
        }
        if self.detection.max_line_length == 0 {
            return Err(ValidationError::scanning(
                "detection.max_line_length must be non-zero",
            ));
        }
        if self.detection.snippet_max_chars == 0 {
            return Err(ValidationError::scanning(
                "detection.snippet_max_chars must be non-zero",
            ));
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "unknown log format '{}', expected 'pretty' or 'json'",
                other
            ))),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.scanning.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
