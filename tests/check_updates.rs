mod helper;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockito::Server;
use tempfile::TempDir;

use helper::{SyncDbBuilder, write_db};
use update_monitor::config::MonitorConfig;
use update_monitor::inventory::InventorySource;
use update_monitor::monitor::{MonitorError, UpdateMonitor, deliver_report};
use update_monitor::notify::{Notifier, NotifyError};
use update_monitor::parser::types::Inventory;
use update_monitor::version::checker::DiffEntry;
use update_monitor::version::comparator::VersionFilter;
use update_monitor::version::error::{InventoryError, RegistryError};
use update_monitor::version::registries::MirrorRegistry;

/// Inventory source returning a fixed package list
struct FixedInventory(Vec<(&'static str, &'static str)>);

#[async_trait]
impl InventorySource for FixedInventory {
    async fn installed_packages(&self) -> Result<Inventory, InventoryError> {
        Ok(self.0.iter().copied().collect())
    }
}

/// Notifier keeping every delivered body
#[derive(Default)]
struct CapturingNotifier {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn notify(&self, html_body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(html_body.to_string());
        Ok(())
    }
}

fn monitor_config(temp_dir: &TempDir, mirror: &str, filter: VersionFilter) -> MonitorConfig {
    let config_dir = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    let mirrorlist_path = temp_dir.path().join("mirrorlist");
    std::fs::write(
        &mirrorlist_path,
        format!(
            "##\n## Arch Linux repository mirrorlist\n##\n\n## Worldwide\n#Server = https://geo.example.org/$repo/os/$arch\nServer = {}/$repo/os/$arch\n",
            mirror
        ),
    )
    .unwrap();

    MonitorConfig {
        data_dir: temp_dir.path().join("data"),
        config_dir,
        repos: vec!["core".to_string(), "extra".to_string()],
        mirrorlist_path,
        arch: "x86_64".to_string(),
        filter,
        cache_max_age: Duration::from_secs(3600),
        offline: false,
    }
}

fn installed() -> FixedInventory {
    FixedInventory(vec![
        ("linux", "6.0.9.arch1-1"),
        ("neovim", "0.7.2-3"),
        ("yay", "11.3.1-1"),
        ("python", "3.10.8-3"),
        ("bash", "5.1.016-1"),
    ])
}

#[tokio::test(flavor = "multi_thread")]
async fn reports_updates_from_downloaded_databases() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;

    let core_mock = server
        .mock("GET", "/core/os/x86_64/core.db")
        .with_status(200)
        .with_body(
            SyncDbBuilder::new()
                .package("linux", "6.1.1.arch1-1")
                .package("bash", "5.1.016-1")
                .gzip(),
        )
        .expect(1)
        .create_async()
        .await;
    let extra_mock = server
        .mock("GET", "/extra/os/x86_64/extra.db")
        .with_status(200)
        .with_body(
            SyncDbBuilder::new()
                .package("neovim", "0.8.1-1")
                .package("python", "3.10.9-1")
                .gzip(),
        )
        .expect(1)
        .create_async()
        .await;

    let monitor = UpdateMonitor::new(
        monitor_config(&temp_dir, &server.url(), VersionFilter::Minor),
        Arc::new(MirrorRegistry::new()),
        Arc::new(installed()),
    );

    let report = monitor.check_updates().await.unwrap();

    core_mock.assert_async().await;
    extra_mock.assert_async().await;
    assert_eq!(
        report.entries,
        vec![
            DiffEntry::new("linux", "6.0.9.arch1-1", "6.1.1.arch1-1"),
            DiffEntry::new("neovim", "0.7.2-3", "0.8.1-1"),
        ]
    );
    assert_eq!(report.not_in_index, vec!["yay"]);
    assert!(temp_dir.path().join("data/core.db").is_file());
    assert!(temp_dir.path().join("data/extra.db").is_file());

    let notifier = CapturingNotifier::default();
    deliver_report(&notifier, &report).await.unwrap();

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("<h3>2 new packages available</h3>"));
    let linux = sent[0].find("<td>linux</td>").unwrap();
    let neovim = sent[0].find("<td>neovim</td>").unwrap();
    assert!(linux < neovim);
}

#[tokio::test(flavor = "multi_thread")]
async fn downloads_only_stale_databases() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let config = monitor_config(&temp_dir, &server.url(), VersionFilter::All);
    write_db(
        &config.data_dir,
        "core",
        &SyncDbBuilder::new().package("linux", "6.1.1.arch1-1").gzip(),
    );

    let core_mock = server
        .mock("GET", "/core/os/x86_64/core.db")
        .expect(0)
        .create_async()
        .await;
    let extra_mock = server
        .mock("GET", "/extra/os/x86_64/extra.db")
        .with_status(200)
        .with_body(SyncDbBuilder::new().package("python", "3.10.9-1").gzip())
        .expect(1)
        .create_async()
        .await;

    let monitor = UpdateMonitor::new(config, Arc::new(MirrorRegistry::new()), Arc::new(installed()));

    let report = monitor.check_updates().await.unwrap();

    core_mock.assert_async().await;
    extra_mock.assert_async().await;
    let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["linux", "python"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_repository_on_mirror_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;

    let _core_mock = server
        .mock("GET", "/core/os/x86_64/core.db")
        .with_status(200)
        .with_body(SyncDbBuilder::new().package("linux", "6.1.1.arch1-1").gzip())
        .create_async()
        .await;
    let _extra_mock = server
        .mock("GET", "/extra/os/x86_64/extra.db")
        .with_status(404)
        .create_async()
        .await;

    let monitor = UpdateMonitor::new(
        monitor_config(&temp_dir, &server.url(), VersionFilter::All),
        Arc::new(MirrorRegistry::new()),
        Arc::new(installed()),
    );

    let result = monitor.check_updates().await;

    assert!(matches!(
        result,
        Err(MonitorError::Registry(RegistryError::NotFound(_)))
    ));
}

#[tokio::test]
async fn offline_run_uses_cached_databases() {
    let temp_dir = TempDir::new().unwrap();
    let config = MonitorConfig {
        offline: true,
        ..monitor_config(&temp_dir, "https://unreachable.example.com", VersionFilter::Micro)
    };
    write_db(
        &config.data_dir,
        "core",
        &SyncDbBuilder::new()
            .package("linux", "6.0.9.arch1-1")
            .package("bash", "5.1.016-2")
            .gzip(),
    );
    write_db(
        &config.data_dir,
        "extra",
        &SyncDbBuilder::new().package("python", "3.10.9-1").gzip(),
    );

    let monitor = UpdateMonitor::new(config, Arc::new(MirrorRegistry::new()), Arc::new(installed()));

    let report = monitor.check_updates().await.unwrap();

    assert_eq!(
        report.entries,
        vec![DiffEntry::new("python", "3.10.8-3", "3.10.9-1")]
    );
    assert_eq!(report.not_in_index, vec!["neovim", "yay"]);
}
