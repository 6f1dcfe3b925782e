//! Registry trait for fetching repository databases

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for fetching sync databases from a package mirror
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Downloads the raw bytes of a repository database
    ///
    /// # Arguments
    /// * `url` - Full URL of the database file (e.g., "https://mirror/core/os/x86_64/core.db")
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The archive exactly as served
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_database(&self, url: &str) -> Result<Vec<u8>, RegistryError>;
}
