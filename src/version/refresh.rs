//! Refresh logic for the locally cached repository databases

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use futures::future::try_join_all;
use tracing::info;

use crate::version::error::RegistryError;
use crate::version::mirror::{database_file_name, database_url};
use crate::version::registry::Registry;

/// A repository database that needs to be downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDownload {
    pub repo: String,
    pub url: String,
    pub destination: PathBuf,
}

/// Path of the cached database for `repo`
pub fn database_path(data_dir: &Path, repo: &str) -> PathBuf {
    data_dir.join(database_file_name(repo))
}

/// Whether the file at `path` exists and was modified less than `max_age` ago.
///
/// A modification time in the future counts as fresh.
pub fn is_fresh(path: &Path, max_age: Duration, now: SystemTime) -> bool {
    if !path.is_file() {
        return false;
    }
    let Ok(modified) = std::fs::metadata(path).and_then(|meta| meta.modified()) else {
        return false;
    };
    now.duration_since(modified)
        .map(|age| age < max_age)
        .unwrap_or(true)
}

/// Decide which repositories must be downloaded.
///
/// Databases cached in `data_dir` that are younger than `max_age` are reused,
/// and a repository listed more than once is downloaded once.
pub fn plan_downloads(
    mirror: &str,
    repos: &[String],
    arch: &str,
    data_dir: &Path,
    max_age: Duration,
    now: SystemTime,
) -> Vec<RepoDownload> {
    let mut seen = HashSet::new();
    repos
        .iter()
        .filter(|repo| seen.insert(repo.as_str()))
        .filter_map(|repo| {
            let destination = database_path(data_dir, repo);
            if is_fresh(&destination, max_age, now) {
                info!("{} is up to date", database_file_name(repo));
                return None;
            }
            Some(RepoDownload {
                repo: repo.clone(),
                url: database_url(mirror, repo, arch),
                destination,
            })
        })
        .collect()
}

/// Download the planned databases concurrently and store them on disk.
///
/// Each archive is written to a temporary `.part` file first and renamed into
/// place, so an interrupted download never looks like a fresh database.
/// Returns the stored paths in plan order. The first failure is returned
/// immediately and the downloads still in flight are dropped.
pub async fn download_repositories(
    registry: &dyn Registry,
    downloads: Vec<RepoDownload>,
) -> Result<Vec<PathBuf>, RegistryError> {
    let futures = downloads.into_iter().map(|download| async move {
        info!("Downloading {}", download.url);
        let bytes = registry.fetch_database(&download.url).await?;

        if let Some(parent) = download.destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = download.destination.with_extension("db.part");
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &download.destination).await?;

        info!(
            "Saved {} ({} bytes) to {:?}",
            download.repo,
            bytes.len(),
            download.destination
        );
        Ok::<_, RegistryError>(download.destination)
    });

    try_join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::registry::MockRegistry;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn repos(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plan_downloads_builds_urls_for_every_missing_repository() {
        let temp_dir = TempDir::new().unwrap();

        let plan = plan_downloads(
            "https://example.com/$arch/$repo",
            &repos(&["a", "b"]),
            "x86_64",
            temp_dir.path(),
            HOUR,
            SystemTime::now(),
        );

        let urls: Vec<&str> = plan.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/x86_64/a/a.db",
                "https://example.com/x86_64/b/b.db"
            ]
        );
        assert_eq!(plan[0].destination, temp_dir.path().join("a.db"));
    }

    #[test]
    fn plan_downloads_fetches_repeated_repository_once() {
        let temp_dir = TempDir::new().unwrap();

        let plan = plan_downloads(
            "https://example.com/$arch/$repo",
            &repos(&["core", "extra", "core"]),
            "x86_64",
            temp_dir.path(),
            HOUR,
            SystemTime::now(),
        );

        let planned: Vec<&str> = plan.iter().map(|d| d.repo.as_str()).collect();
        assert_eq!(planned, vec!["core", "extra"]);
    }

    #[test]
    fn plan_downloads_skips_fresh_databases() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.db"), b"cached").unwrap();

        let plan = plan_downloads(
            "https://example.com/$arch/$repo",
            &repos(&["a", "b"]),
            "x86_64",
            temp_dir.path(),
            HOUR,
            SystemTime::now(),
        );

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].repo, "b");
    }

    #[test]
    fn plan_downloads_refreshes_stale_databases() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.db"), b"cached").unwrap();
        let two_hours_later = SystemTime::now() + 2 * HOUR;

        let plan = plan_downloads(
            "https://example.com/$arch/$repo",
            &repos(&["a"]),
            "x86_64",
            temp_dir.path(),
            HOUR,
            two_hours_later,
        );

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].repo, "a");
    }

    #[test]
    fn is_fresh_is_false_for_missing_file_and_directories() {
        let temp_dir = TempDir::new().unwrap();

        assert!(!is_fresh(
            &temp_dir.path().join("core.db"),
            HOUR,
            SystemTime::now()
        ));
        assert!(!is_fresh(temp_dir.path(), HOUR, SystemTime::now()));
    }

    #[test]
    fn is_fresh_treats_future_modification_time_as_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("core.db");
        std::fs::write(&path, b"cached").unwrap();
        let an_hour_ago = SystemTime::now() - HOUR;

        assert!(is_fresh(&path, HOUR, an_hour_ago));
    }

    #[tokio::test]
    async fn download_repositories_writes_each_database() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_database()
            .withf(|url| url == "https://example.com/core.db")
            .times(1)
            .returning(|_| Ok(b"core-bytes".to_vec()));
        registry
            .expect_fetch_database()
            .withf(|url| url == "https://example.com/extra.db")
            .times(1)
            .returning(|_| Ok(b"extra-bytes".to_vec()));

        let downloads = vec![
            RepoDownload {
                repo: "core".to_string(),
                url: "https://example.com/core.db".to_string(),
                destination: data_dir.join("core.db"),
            },
            RepoDownload {
                repo: "extra".to_string(),
                url: "https://example.com/extra.db".to_string(),
                destination: data_dir.join("extra.db"),
            },
        ];

        let stored = download_repositories(&registry, downloads).await.unwrap();

        assert_eq!(stored, vec![data_dir.join("core.db"), data_dir.join("extra.db")]);
        assert_eq!(std::fs::read(data_dir.join("core.db")).unwrap(), b"core-bytes");
        assert_eq!(std::fs::read(data_dir.join("extra.db")).unwrap(), b"extra-bytes");
        assert!(!data_dir.join("core.db.part").exists());
    }

    #[tokio::test]
    async fn download_repositories_propagates_registry_errors() {
        let temp_dir = TempDir::new().unwrap();

        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_database()
            .times(1)
            .returning(|url| Err(RegistryError::NotFound(url.to_string())));

        let downloads = vec![RepoDownload {
            repo: "missing".to_string(),
            url: "https://example.com/missing.db".to_string(),
            destination: temp_dir.path().join("missing.db"),
        }];

        let result = download_repositories(&registry, downloads).await;

        assert!(matches!(result, Err(RegistryError::NotFound(_))));
        assert!(!temp_dir.path().join("missing.db").exists());
    }

    #[tokio::test]
    async fn download_repositories_handles_empty_plan() {
        let mut registry = MockRegistry::new();
        registry.expect_fetch_database().times(0);

        let stored = download_repositories(&registry, vec![]).await.unwrap();

        assert!(stored.is_empty());
    }
}
