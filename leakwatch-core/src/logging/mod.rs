//! Structured logging initialization

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Error initializing the tracing subscriber
#[derive(Debug, thiserror::Error)]
#[error("Failed to initialize tracing: {0}")]
pub struct LoggingInitError(String);

/// Initialize the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise from the configured
/// default level. Calling this twice returns an error from the underlying
/// subscriber registration.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    result.map_err(|e| LoggingInitError(e.to_string()))
}
