//! Mirror discovery and repository URL construction

use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::version::error::MirrorError;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&$/=]*)",
    )
    .unwrap()
});

/// Find the mirror URL template to download databases from.
///
/// The pacman mirror list is scanned first: commented lines are ignored and
/// the first URL wins. When the mirror list does not exist, the first line
/// of `fallback` is used instead.
pub fn find_mirror(mirrorlist: &Path, fallback: &Path) -> Result<String, MirrorError> {
    let mirror = match std::fs::read_to_string(mirrorlist) {
        Ok(content) => first_mirror(&content).unwrap_or_default(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{:?} not found, using {:?}", mirrorlist, fallback);
            std::fs::read_to_string(fallback)?
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        }
        Err(e) => return Err(e.into()),
    };

    if !URL_PATTERN.is_match(&mirror) {
        return Err(MirrorError::NoUrlFound);
    }
    Ok(mirror)
}

/// First URL on a non-comment line of a mirror list
fn first_mirror(content: &str) -> Option<String> {
    content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| URL_PATTERN.find(line))
        .map(|m| m.as_str().to_string())
}

/// Substitute `$repo` and `$arch` in a mirror template and append the
/// database file name
pub fn database_url(mirror: &str, repo: &str, arch: &str) -> String {
    let base = mirror.replace("$repo", repo).replace("$arch", arch);
    format!("{}/{}", base, database_file_name(repo))
}

pub fn database_file_name(repo: &str) -> String {
    format!("{}.db", repo)
}
