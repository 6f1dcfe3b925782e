//! Parser trait definition

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::parser::types::PackageIndex;

/// Trait for parsing repository archives into a package index
pub trait IndexParser {
    /// Check if this parser can handle the given file
    fn can_parse(&self, path: &Path) -> bool;

    /// Parse the raw archive bytes and extract every package record
    fn parse(&self, content: &[u8]) -> Result<PackageIndex, ParseError>;

    /// Read and parse an archive from disk
    fn parse_file(&self, path: &Path) -> Result<PackageIndex, ParseError> {
        let content = std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ParseError::ArchiveNotFound(path.to_path_buf()),
            _ => ParseError::Io(e),
        })?;

        let index = self.parse(&content).map_err(|e| match e {
            ParseError::ArchiveCorrupt(reason) => {
                ParseError::ArchiveCorrupt(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;

        info!("Parsed {} packages from {:?}", index.len(), path);
        Ok(index)
    }

    /// Parse several archives and merge them in the given order.
    ///
    /// A package present in more than one archive takes the version from the
    /// archive that comes last.
    fn parse_files(&self, paths: &[PathBuf]) -> Result<PackageIndex, ParseError> {
        let mut merged = PackageIndex::new();
        for path in paths {
            merged.merge(self.parse_file(path)?);
        }
        Ok(merged)
    }
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The archive does not exist on disk
    #[error("Repository archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// The container could not be opened or iterated
    #[error("Malformed repository archive: {0}")]
    ArchiveCorrupt(String),

    /// A metadata entry lacks its name or version
    #[error("Malformed package record in {entry}: missing {field}")]
    MalformedRecord { entry: String, field: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
