//! External collaborators: event stream, content fetching, persistence

pub mod github;
pub mod persistence;
pub mod stream;
