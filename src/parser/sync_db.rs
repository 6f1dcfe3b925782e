//! Parser for pacman sync databases (`core.db`, `extra.db`, ...)
//!
//! A sync database is a tar archive, usually gzip compressed, holding one
//! directory per package. Each directory carries a `desc` file made of
//! `%KEY%` marker lines, each followed by its value:
//!
//! ```text
//! %NAME%
//! linux
//!
//! %VERSION%
//! 6.1.1.arch1-1
//! ```

use std::io::{Cursor, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;
use xz2::read::XzDecoder;

use crate::parser::traits::{IndexParser, ParseError};
use crate::parser::types::{PackageIndex, PackageRecord};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const BZIP2_MAGIC: &[u8] = b"BZh";
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

const NAME_MARKER: &str = "%NAME%";
const VERSION_MARKER: &str = "%VERSION%";

/// Suffix of the archive entries that hold package metadata
const ENTRY_SUFFIX: &str = "desc";

#[derive(Debug, Default)]
pub struct SyncDbParser;

impl SyncDbParser {
    pub fn new() -> Self {
        Self
    }

    /// Wrap the raw bytes in a decoder matching their compression
    fn open(content: &[u8]) -> Result<Box<dyn Read + '_>, ParseError> {
        if content.is_empty() {
            return Err(ParseError::ArchiveCorrupt("empty archive".to_string()));
        }
        if content.starts_with(GZIP_MAGIC) {
            return Ok(Box::new(GzDecoder::new(content)));
        }
        if content.starts_with(XZ_MAGIC) {
            return Ok(Box::new(XzDecoder::new(content)));
        }
        if content.starts_with(BZIP2_MAGIC) {
            return Ok(Box::new(BzDecoder::new(content)));
        }
        if content.starts_with(ZSTD_MAGIC) {
            return Err(ParseError::ArchiveCorrupt(
                "unsupported compression: zstd".to_string(),
            ));
        }
        Ok(Box::new(Cursor::new(content)))
    }
}

impl IndexParser for SyncDbParser {
    fn can_parse(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| name.ends_with(".db") || name.contains(".db.tar"))
    }

    fn parse(&self, content: &[u8]) -> Result<PackageIndex, ParseError> {
        let mut archive = Archive::new(Self::open(content)?);
        let entries = archive.entries().map_err(corrupt)?;

        let mut index = PackageIndex::new();
        for entry in entries {
            let mut entry = entry.map_err(corrupt)?;

            let entry_type = entry.header().entry_type();
            if !(entry_type.is_file() || entry_type.is_contiguous()) {
                continue;
            }

            let path = entry.path().map_err(corrupt)?.to_string_lossy().into_owned();
            if !path.ends_with(ENTRY_SUFFIX) {
                continue;
            }

            let mut raw = Vec::new();
            entry.read_to_end(&mut raw).map_err(corrupt)?;

            match parse_desc(&path, &String::from_utf8_lossy(&raw)) {
                Ok(record) => {
                    index.insert(record);
                }
                Err(e) => debug!("Skipping entry: {}", e),
            }
        }

        Ok(index)
    }
}

fn corrupt(e: std::io::Error) -> ParseError {
    ParseError::ArchiveCorrupt(e.to_string())
}

/// Extract the package name and version from the text of a `desc` entry.
///
/// The whole entry is scanned, so a marker that appears twice takes the
/// value following its last occurrence. A marker on the final line has no
/// value.
pub fn parse_desc(entry: &str, text: &str) -> Result<PackageRecord, ParseError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut name = "";
    let mut version = "";
    for (i, line) in lines.iter().enumerate() {
        let value = lines.get(i + 1).copied().unwrap_or_default();
        match *line {
            NAME_MARKER => name = value,
            VERSION_MARKER => version = value,
            _ => {}
        }
    }

    let missing = if name.is_empty() {
        Some("name")
    } else if version.is_empty() {
        Some("version")
    } else {
        None
    };

    match missing {
        Some(field) => Err(ParseError::MalformedRecord {
            entry: entry.to_string(),
            field,
        }),
        None => Ok(PackageRecord::new(name, version)),
    }
}
