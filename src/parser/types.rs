//! Common types for parsers

use indexmap::IndexMap;
use serde::Serialize;

/// A single package entry read from a sync database or the local inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Both fields must be non-empty for the record to enter an index
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.version.is_empty()
    }
}

/// Name to version mapping built from one or more repository archives
///
/// Inserting a name that is already present replaces its version, so the
/// last record seen wins while keeping the position of the first. Records
/// with an empty name or version are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageIndex {
    packages: IndexMap<String, String>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the version it replaced (if any).
    ///
    /// Incomplete records are ignored and `None` is returned.
    pub fn insert(&mut self, record: PackageRecord) -> Option<String> {
        if !record.is_complete() {
            return None;
        }
        self.packages.insert(record.name, record.version)
    }

    /// Merge another index into this one; entries of `other` win on conflict
    pub fn merge(&mut self, other: PackageIndex) {
        self.packages.extend(other.packages);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.packages.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reorder the packages by name
    pub fn sort_by_name(&mut self) {
        self.packages.sort_keys();
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for PackageIndex {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut index = Self::new();
        for (name, version) in iter {
            index.insert(PackageRecord::new(name, version));
        }
        index
    }
}

/// Installed packages in the order the package manager reported them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    packages: IndexMap<String, String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an installed package. A replaced name keeps its
    /// original position.
    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.packages.insert(name.into(), version.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.packages.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut inventory = Self::new();
        for (name, version) in iter {
            inventory.insert(name, version);
        }
        inventory
    }
}
