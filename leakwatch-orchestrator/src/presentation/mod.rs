//! HTTP surface: webhook intake, findings queries, health probes

pub mod controllers;
pub mod models;
pub mod routes;

pub use controllers::ApiState;
pub use routes::build_router;
