//! Leakwatch Core - Foundation crate for the Leakwatch pipeline
//!
//! This crate provides shared functionality used by the detection engine,
//! the scan orchestrator, and the wiring binary:
//!
//! - [`config`] — Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] — Shared event model for the change-event stream
//! - [`logging`] — Structured logging with tracing
//!
//! # Configuration
//!
//! Environment variables use the `LEAKWATCH__` prefix with double underscore
//! separators:
//!
//! ```bash
//! LEAKWATCH__SERVER__PORT=8080
//! LEAKWATCH__REDIS__CONSUMER_GROUP=scanner-workers
//! ```
//!
//! The `DATABASE_URL` and `REDIS_URL` conventions are honored as overrides.

pub mod config;
pub mod domain;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
