//! Leakwatch - Main application library
//!
//! This is the main binary crate that wires together the detection engine,
//! the scan orchestrator, and the HTTP surface.

mod app;
mod infra;
mod workers;

pub use app::{create_app, AppHandle};
pub use leakwatch_core::{init_tracing, Config};

// Re-export for convenience
pub use leakwatch_core;
pub use leakwatch_orchestrator;
pub use leakwatch_secrets;
