//! Orchestrator domain model

pub mod entities;
pub mod value_objects;

pub use entities::{FindingStatus, NewFinding, RepositoryRecord, ScanJob, StoredFinding};
pub use value_objects::{JobKind, JobStatus, JobTransitionError};
