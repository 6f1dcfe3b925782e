//! Version management layer for repository update checks
//!
//! This module fetches the repository databases and compares the versions
//! they publish against the installed packages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Mirror    │────▶│   Refresh   │────▶│  Registry   │
//! │ (discover)  │     │ (freshness) │     │ (download)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Comparator  │◀────│   Checker   │◀────│   Parser    │
//! │(granularity)│     │   (diff)    │     │  (sync db)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`comparator`]: Version granularity filter and classification
//! - [`checker`]: Diff between installed packages and the repository index
//! - [`mirror`]: Mirror discovery and database URL templating
//! - [`refresh`]: Freshness gate and concurrent database downloads
//! - [`registry`]: Registry trait for fetching databases
//! - [`registries`]: Concrete registry implementations
//! - [`error`]: Error types for registry, mirror and inventory operations

pub mod checker;
pub mod comparator;
pub mod error;
pub mod mirror;
pub mod refresh;
pub mod registries;
pub mod registry;

pub use checker::{DiffEntry, UpdateReport, check, diff};
pub use comparator::{Classification, Relation, VersionFilter, classify};
