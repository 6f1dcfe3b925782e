//! Version comparison between installed packages and repository indexes

use serde::Serialize;

use crate::parser::types::{Inventory, PackageIndex};
use crate::version::comparator::VersionFilter;

/// A package with a newer version in the repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub name: String,
    /// Installed version
    pub current_version: String,
    /// Version published in the repository index
    pub new_version: String,
}

impl DiffEntry {
    pub fn new(name: &str, current_version: &str, new_version: &str) -> Self {
        Self {
            name: name.to_string(),
            current_version: current_version.to_string(),
            new_version: new_version.to_string(),
        }
    }
}

/// Result of checking an inventory against the repository index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Reportable version changes, in inventory order
    pub entries: Vec<DiffEntry>,
    /// Installed packages the index does not know (foreign/AUR packages)
    pub not_in_index: Vec<String>,
}

/// Collect installed packages whose repository version differs at `filter`.
///
/// The output follows inventory order. Packages missing from the index are
/// skipped.
pub fn diff(inventory: &Inventory, index: &PackageIndex, filter: VersionFilter) -> Vec<DiffEntry> {
    inventory
        .iter()
        .filter_map(|(name, current)| {
            let new = index.get(name)?;
            filter
                .reports(current, new)
                .then(|| DiffEntry::new(name, current, new))
        })
        .collect()
}

/// Installed package names absent from the index, in inventory order
pub fn not_in_index(inventory: &Inventory, index: &PackageIndex) -> Vec<String> {
    inventory
        .iter()
        .filter(|(name, _)| !index.contains(name))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Run the full comparison for one inventory
pub fn check(inventory: &Inventory, index: &PackageIndex, filter: VersionFilter) -> UpdateReport {
    UpdateReport {
        entries: diff(inventory, index, filter),
        not_in_index: not_in_index(inventory, index),
    }
}
