//! Installed package inventory

#[cfg(test)]
use mockall::automock;

use std::io::ErrorKind;

use tokio::process::Command;
use tracing::debug;

use crate::parser::pacman_query::parse_query_output;
use crate::parser::types::Inventory;
use crate::version::error::InventoryError;

const DEFAULT_PROGRAM: &str = "pacman";

/// Trait for listing the packages installed on this machine
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait InventorySource: Send + Sync {
    /// Returns installed packages in the order the source lists them
    async fn installed_packages(&self) -> Result<Inventory, InventoryError>;
}

/// Inventory source backed by `pacman -Q`
pub struct PacmanInventory {
    program: String,
}

impl PacmanInventory {
    /// Creates a new PacmanInventory running the given executable
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for PacmanInventory {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[async_trait::async_trait]
impl InventorySource for PacmanInventory {
    async fn installed_packages(&self) -> Result<Inventory, InventoryError> {
        let output = Command::new(&self.program)
            .arg("-Q")
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => InventoryError::SourceMissing(self.program.clone()),
                _ => InventoryError::Io(e),
            })?;

        if !output.status.success() {
            return Err(InventoryError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let inventory = parse_query_output(&String::from_utf8_lossy(&output.stdout));
        debug!("{} reported {} installed packages", self.program, inventory.len());
        Ok(inventory)
    }
}
