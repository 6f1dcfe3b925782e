//! Shared fixtures for integration tests

mod archive;

pub use archive::{SyncDbBuilder, write_db};
