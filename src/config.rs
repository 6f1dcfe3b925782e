use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::version::comparator::VersionFilter;
use crate::version::refresh::database_path;

// =============================================================================
// Constants
// =============================================================================

const APP_NAME: &str = "update-monitor";

/// Downloaded databases younger than this are reused (1 hour)
pub const CACHE_MAX_AGE_SECS: u64 = 60 * 60;

/// Timeout for a single database download in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 120;

/// Repositories checked when no `repos.txt` is present
pub const DEFAULT_REPOS: &[&str] = &["core", "extra", "community"];

/// pacman mirror list
pub const DEFAULT_MIRRORLIST: &str = "/etc/pacman.d/mirrorlist";

pub const REPOS_FILE: &str = "repos.txt";
pub const MIRROR_FILE: &str = "mirror.txt";
pub const EMAIL_FILE: &str = "email.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a monitor run needs to know
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Where downloaded databases and the log file live
    pub data_dir: PathBuf,
    /// Where `repos.txt`, `mirror.txt` and `email.json` live
    pub config_dir: PathBuf,
    /// Repositories to check, in merge order
    pub repos: Vec<String>,
    pub mirrorlist_path: PathBuf,
    pub arch: String,
    pub filter: VersionFilter,
    pub cache_max_age: Duration,
    /// Skip downloads and use whatever databases are cached
    pub offline: bool,
}

impl MonitorConfig {
    /// Build a configuration rooted at the given directories, reading the
    /// repository list from `config_dir/repos.txt` when present
    pub fn load(config_dir: PathBuf, data_dir: PathBuf) -> Result<Self, ConfigError> {
        let repos = load_repo_list(&config_dir.join(REPOS_FILE))?;
        Ok(Self {
            data_dir,
            config_dir,
            repos,
            mirrorlist_path: PathBuf::from(DEFAULT_MIRRORLIST),
            arch: std::env::consts::ARCH.to_string(),
            filter: VersionFilter::default(),
            cache_max_age: Duration::from_secs(CACHE_MAX_AGE_SECS),
            offline: false,
        })
    }

    pub fn mirror_fallback_path(&self) -> PathBuf {
        self.config_dir.join(MIRROR_FILE)
    }

    pub fn email_config_path(&self) -> PathBuf {
        self.config_dir.join(EMAIL_FILE)
    }

    /// Cached database paths for every configured repository, in merge order
    pub fn database_paths(&self) -> Vec<PathBuf> {
        self.repos
            .iter()
            .map(|repo| database_path(&self.data_dir, repo))
            .collect()
    }
}

/// Read one repository name per line; fall back to [`DEFAULT_REPOS`] when
/// the file does not exist
pub fn load_repo_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Ok(DEFAULT_REPOS.iter().map(|s| s.to_string()).collect())
        }
        Err(e) => Err(e.into()),
    }
}

/// SMTP settings read from `email.json`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EmailConfig {
    /// strftime pattern rendered with the current time to form the subject
    pub title_format: String,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient: String,
    pub email_port: u16,
    #[serde(default)]
    pub auth_mechanism: AuthMechanism,
}

impl EmailConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMechanism {
    /// Plain connection upgraded with STARTTLS
    Starttls,
    /// Implicit TLS from the first byte
    Tls,
    /// Unencrypted connection
    #[default]
    #[serde(other)]
    Plain,
}

/// Returns the path to the data directory for update-monitor.
/// Uses $XDG_DATA_HOME/update-monitor if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/update-monitor,
/// or ./update-monitor if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the configuration directory for update-monitor.
/// Uses $XDG_CONFIG_HOME/update-monitor if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/update-monitor.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("update-monitor.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    xdg_dir(xdg_data_home, home_dir, ".local/share")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    xdg_dir(xdg_config_home, home_dir, ".config")
}

fn xdg_dir(xdg_home: Option<String>, home_dir: Option<PathBuf>, home_relative: &str) -> PathBuf {
    let base = xdg_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_relative)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_NAME)
}
