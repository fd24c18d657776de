//! Detection pipeline: pattern library, suppression, classification, engine

pub mod classifier;
pub mod engine;
pub mod false_positive;
pub mod rules;

pub use classifier::SeverityPolicy;
pub use engine::ScanEngine;
pub use false_positive::FalsePositiveFilter;
