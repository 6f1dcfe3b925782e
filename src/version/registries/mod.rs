//! Registry implementations for fetching repository databases

pub mod mirror;

pub use mirror::MirrorRegistry;
