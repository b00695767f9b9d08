//! Vigil CLI
//!
//! Runs one reporting pass: deliver queued reports, assemble a fresh one,
//! then deliver it or queue it for the next run.

mod config;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};
use vigil_agent::{
    ConnectivityProbe, FixedProbe, HtmlRenderer, Orchestrator, OrchestratorConfig,
    SnapshotAssembler, TcpProbe,
};
use vigil_delivery::{DeliveryClient, LogDelivery};
use vigil_email::EmailDelivery;
use vigil_host::{CommandCapture, SysInventory, current_identity};
use vigil_locate::LocationResolver;
use vigil_store::{FileReportStore, ReportStore};

use crate::config::VigilConfig;

/// Vigil: send a situational report, or keep it until the network is back.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "VIGIL_CONFIG", default_value = "vigil.toml")]
    config: PathBuf,

    /// Log reports instead of emailing them, leaving the queue untouched.
    #[arg(long)]
    dry_run: bool,

    /// Skip the connectivity probe and queue the report.
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List queued reports, oldest first.
    Pending,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = VigilConfig::load(&cli.config)?;
    init_tracing(config.logging.file.as_deref())?;

    if !cli.config.exists() {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }

    let store = FileReportStore::open(&config.store.directory).with_context(|| {
        format!(
            "failed to open report store at {}",
            config.store.directory.display()
        )
    })?;

    match cli.command {
        Some(Command::Pending) => list_pending(&store),
        None => run_once(&cli, &config, Arc::new(store)).await,
    }
}

fn init_tracing(file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            subscriber.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn run_once(
    cli: &Cli,
    config: &VigilConfig,
    store: Arc<FileReportStore>,
) -> anyhow::Result<ExitCode> {
    let probe: Arc<dyn ConnectivityProbe> = if cli.offline {
        info!("offline mode forced");
        Arc::new(FixedProbe::offline())
    } else {
        Arc::new(TcpProbe::from_config(&config.connectivity))
    };

    let delivery: Arc<dyn DeliveryClient> = if cli.dry_run {
        Arc::new(LogDelivery::default())
    } else {
        config.validate_email()?;
        Arc::new(EmailDelivery::new(&config.email)?)
    };

    let locator = LocationResolver::from_config(&config.location)?;
    let assembler = SnapshotAssembler::new(
        Arc::new(CommandCapture::new(config.capture.clone())),
        Arc::new(locator),
        Arc::new(SysInventory::new(
            config.report.process_limit,
            config.report.connection_limit,
        )),
        current_identity(),
    );

    let orchestrator = Orchestrator::builder()
        .store(store)
        .probe(probe)
        .assembler(assembler)
        .renderer(Arc::new(HtmlRenderer::from_config(&config.report)?))
        .delivery(delivery)
        .config(OrchestratorConfig {
            recheck_connectivity: config.connectivity.recheck,
            dry_run: cli.dry_run,
        })
        .build()?;

    let summary = orchestrator.run().await;
    if summary.has_unresolved_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn list_pending(store: &dyn ReportStore) -> anyhow::Result<ExitCode> {
    let pending = store.list_pending()?;
    if pending.is_empty() {
        println!("No pending reports.");
        return Ok(ExitCode::SUCCESS);
    }

    for entry in &pending {
        let report = &entry.report;
        println!(
            "{}  {}  {}  {}",
            report.id,
            report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.location.method(),
            report
                .attachment
                .as_ref()
                .map_or("-", |attachment| attachment.filename.as_str()),
        );
    }
    println!("{} pending report(s).", pending.len());
    Ok(ExitCode::SUCCESS)
}
