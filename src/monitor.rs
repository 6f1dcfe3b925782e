//! End-to-end update check: refresh databases, parse them, diff against the
//! installed packages and deliver the report

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, MonitorConfig};
use crate::inventory::InventorySource;
use crate::notify::{Notifier, NotifyError};
use crate::parser::sync_db::SyncDbParser;
use crate::parser::traits::{IndexParser, ParseError};
use crate::parser::types::PackageIndex;
use crate::report::{render_html, summary};
use crate::version::checker::{UpdateReport, check};
use crate::version::error::{InventoryError, MirrorError, RegistryError};
use crate::version::mirror::find_mirror;
use crate::version::refresh::{download_repositories, is_fresh, plan_downloads};
use crate::version::registry::Registry;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

pub struct UpdateMonitor {
    config: MonitorConfig,
    registry: Arc<dyn Registry>,
    inventory: Arc<dyn InventorySource>,
    parser: SyncDbParser,
}

impl UpdateMonitor {
    pub fn new(
        config: MonitorConfig,
        registry: Arc<dyn Registry>,
        inventory: Arc<dyn InventorySource>,
    ) -> Self {
        Self {
            config,
            registry,
            inventory,
            parser: SyncDbParser::new(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Download every configured database that is missing or stale.
    ///
    /// Returns the paths written during this run. Nothing is fetched in
    /// offline mode, and the mirror is only looked up when a download is due.
    pub async fn sync_repositories(&self) -> Result<Vec<PathBuf>, MonitorError> {
        if self.config.offline {
            info!("Offline mode, using cached databases");
            return Ok(Vec::new());
        }

        let now = SystemTime::now();
        let all_fresh = self
            .config
            .database_paths()
            .iter()
            .all(|path| is_fresh(path, self.config.cache_max_age, now));
        if all_fresh {
            info!("All repository databases are up to date");
            return Ok(Vec::new());
        }

        let mirror = find_mirror(
            &self.config.mirrorlist_path,
            &self.config.mirror_fallback_path(),
        )?;
        debug!("Using mirror {}", mirror);

        let downloads = plan_downloads(
            &mirror,
            &self.config.repos,
            &self.config.arch,
            &self.config.data_dir,
            self.config.cache_max_age,
            now,
        );
        Ok(download_repositories(self.registry.as_ref(), downloads).await?)
    }

    /// Parse and merge the cached database of every configured repository
    pub fn load_index(&self) -> Result<PackageIndex, MonitorError> {
        Ok(self.parser.parse_files(&self.config.database_paths())?)
    }

    /// Refresh the databases and compare them with the installed packages
    pub async fn check_updates(&self) -> Result<UpdateReport, MonitorError> {
        self.sync_repositories().await?;
        let index = self.load_index()?;
        let inventory = self.inventory.installed_packages().await?;

        let report = check(&inventory, &index, self.config.filter);
        info!(
            "{} ({} filter)",
            summary(&report.entries),
            self.config.filter
        );
        if !report.not_in_index.is_empty() {
            info!(
                "{} installed packages are not in any configured repository",
                report.not_in_index.len()
            );
            debug!("Not in index: {:?}", report.not_in_index);
        }
        Ok(report)
    }
}

/// Render the report as HTML and hand it to the notifier
pub async fn deliver_report(
    notifier: &dyn Notifier,
    report: &UpdateReport,
) -> Result<String, MonitorError> {
    let html = render_html(&summary(&report.entries), &report.entries);
    notifier.notify(&html).await?;
    Ok(html)
}
