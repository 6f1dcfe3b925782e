use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use indicatif::MultiProgress;
use tracing::info;

use update_monitor::config::{self, EmailConfig, MonitorConfig};
use update_monitor::inventory::PacmanInventory;
use update_monitor::logging::init_logging;
use update_monitor::monitor::{UpdateMonitor, deliver_report};
use update_monitor::notify::SmtpNotifier;
use update_monitor::parser::sync_db::SyncDbParser;
use update_monitor::parser::traits::IndexParser;
use update_monitor::report::{console_line, render_html, summary};
use update_monitor::version::comparator::VersionFilter;
use update_monitor::version::registries::MirrorRegistry;

#[derive(Parser)]
#[command(name = "update-monitor")]
#[command(version, about = "Report pending package updates from pacman repositories")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    filter: FilterArgs,

    /// Directory holding repos.txt, mirror.txt and email.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Directory for downloaded databases and the log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Architecture substituted for $arch in the mirror URL
    #[arg(long)]
    arch: Option<String>,

    /// Repository to check, may be repeated (overrides repos.txt)
    #[arg(long = "repo", value_name = "NAME")]
    repos: Vec<String>,

    /// Do not download anything, use cached databases only
    #[arg(long)]
    offline: bool,

    /// Print the report without sending an e-mail
    #[arg(long)]
    dry_run: bool,

    /// Also write the HTML report to this file
    #[arg(long, value_name = "FILE")]
    html_output: Option<PathBuf>,
}

#[derive(Args, Default)]
#[group(multiple = false)]
struct FilterArgs {
    /// Only report changes of the major version
    #[arg(long)]
    major: bool,

    /// Report changes of the major or minor version
    #[arg(long)]
    minor: bool,

    /// Report changes of the major, minor or micro version
    #[arg(long)]
    micro: bool,

    /// Report every version change (default)
    #[arg(long)]
    all: bool,
}

impl FilterArgs {
    fn filter(&self) -> VersionFilter {
        if self.major {
            VersionFilter::Major
        } else if self.minor {
            VersionFilter::Minor
        } else if self.micro {
            VersionFilter::Micro
        } else {
            VersionFilter::All
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Parse repository archives and print the merged package index
    Index {
        /// Archives to parse, later ones win on duplicate names
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Print the index as a JSON object
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(config::data_dir);
    let _guard = init_logging(&data_dir)?;

    match cli.command.take() {
        Some(Command::Index { archives, json }) => print_index(&archives, json),
        None => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run(cli, data_dir)),
    }
}

fn print_index(archives: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let parser = SyncDbParser::new();
    ensure_sync_databases(&parser, archives)?;

    let mut index = parser.parse_files(archives)?;
    index.sort_by_name();

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    for (name, version) in index.iter() {
        println!("{} {}", name, version);
    }
    Ok(())
}

/// Reject paths that do not look like repository databases
fn ensure_sync_databases(parser: &impl IndexParser, archives: &[PathBuf]) -> anyhow::Result<()> {
    match archives.iter().find(|path| !parser.can_parse(path)) {
        Some(path) => anyhow::bail!(
            "{} is not a repository database (expected <repo>.db or <repo>.db.tar.*)",
            path.display()
        ),
        None => Ok(()),
    }
}

async fn run(cli: Cli, data_dir: PathBuf) -> anyhow::Result<()> {
    let config_dir = cli.config_dir.clone().unwrap_or_else(config::config_dir);
    let mut monitor_config = MonitorConfig::load(config_dir, data_dir)?;
    monitor_config.filter = cli.filter.filter();
    monitor_config.offline = cli.offline;
    if let Some(arch) = cli.arch {
        monitor_config.arch = arch;
    }
    if !cli.repos.is_empty() {
        monitor_config.repos = cli.repos;
    }
    info!(
        "Checking {:?} with {} filter",
        monitor_config.repos, monitor_config.filter
    );

    let registry = MirrorRegistry::new().with_progress(MultiProgress::new());
    let monitor = UpdateMonitor::new(
        monitor_config,
        Arc::new(registry),
        Arc::new(PacmanInventory::default()),
    );

    let report = monitor.check_updates().await?;
    for entry in &report.entries {
        println!("{}", console_line(entry));
    }
    let text = summary(&report.entries);
    println!("{}", text);

    if let Some(path) = &cli.html_output {
        std::fs::write(path, render_html(&text, &report.entries))?;
        info!("Wrote HTML report to {:?}", path);
    }

    if cli.dry_run {
        info!("Dry run, not sending e-mail");
        return Ok(());
    }

    let email_config = EmailConfig::load(&monitor.config().email_config_path())?;
    deliver_report(&SmtpNotifier::new(email_config), &report).await?;
    Ok(())
}
