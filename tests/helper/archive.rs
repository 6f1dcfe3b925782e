//! Sync database archive builder

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

/// Builds pacman sync databases the way the repositories publish them:
/// one `<name>-<version>/desc` entry per package inside a gzip tarball
#[derive(Default)]
pub struct SyncDbBuilder {
    entries: Vec<(String, String)>,
}

impl SyncDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a well-formed package entry
    pub fn package(self, name: &str, version: &str) -> Self {
        let path = format!("{}-{}/desc", name, version);
        let content = format!(
            "%FILENAME%\n{name}-{version}-x86_64.pkg.tar.zst\n\n%NAME%\n{name}\n\n%BASE%\n{name}\n\n%VERSION%\n{version}\n\n%DESC%\nTest package\n"
        );
        self.entry(&path, &content)
    }

    /// Add an arbitrary regular file entry
    pub fn entry(mut self, path: &str, content: &str) -> Self {
        self.entries.push((path.to_string(), content.to_string()));
        self
    }

    /// Uncompressed tar bytes
    pub fn tar(&self) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, content) in &self.entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    /// Gzip compressed tar bytes
    pub fn gzip(&self) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.tar()).unwrap();
        encoder.finish().unwrap()
    }
}

/// Write `<dir>/<repo>.db` and return its path
pub fn write_db(dir: &Path, repo: &str, bytes: &[u8]) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}.db", repo));
    std::fs::write(&path, bytes).unwrap();
    path
}
