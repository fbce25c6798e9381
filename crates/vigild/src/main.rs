//! vigild — fleet health watchdog daemon.
//!
//! Single binary that assembles the watchdog subsystems:
//! - Config loading (YAML/JSON)
//! - SSH transport
//! - Check strategies + remediation + sweep engine
//! - Discord webhook sink
//!
//! # Usage
//!
//! ```text
//! vigild --config fleet.yaml
//! ```
//!
//! Exits nonzero when the config is missing or malformed; zero on a
//! clean signal-triggered shutdown or after a completed single-shot
//! sweep.

mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use vigil_config::Config;
use vigil_health::{Checker, Remediator, Sweeper};
use vigil_notify::{DiscordWebhook, Notifier, NullNotifier};
use vigil_transport::{CommandRunner, SshRunner};

#[derive(Parser)]
#[command(
    name = "vigild",
    about = "Fleet health watchdog with SSH remediation",
    version
)]
struct Cli {
    /// Path to the fleet config file (YAML or JSON).
    #[arg(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A bad config aborts startup before any subsystem comes up; this
    // is the only nonzero exit besides argument parsing.
    let config = Config::from_path(&cli.config)?;
    let _log_guard = logging::init(&config.log_file)?;

    info!(
        "vigild starting: {} target(s), sweep interval {}s{}",
        config.targets.len(),
        config.sweep_interval_seconds,
        if config.run_once { ", single-shot" } else { "" }
    );

    // One HTTP client backs both the probes and the webhook sink.
    let http = reqwest::Client::builder().build()?;
    let runner: Arc<dyn CommandRunner> = Arc::new(SshRunner::new(Duration::from_secs(
        config.ssh_connect_timeout_seconds,
    )));

    let notifier: Arc<dyn Notifier> = match config.webhook_url() {
        Some(url) => Arc::new(DiscordWebhook::new(url, http.clone())),
        None => {
            warn!("no discord webhook configured; notifications will be logged and dropped");
            Arc::new(NullNotifier)
        }
    };

    let sweeper = Sweeper::new(
        Checker::new(http, runner.clone()),
        Remediator::new(runner, Duration::from_secs(config.restart_timeout_seconds)),
        notifier,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("failed to install shutdown handler: {e}"),
        }
    });

    sweeper
        .run(
            &config.targets,
            Duration::from_secs(config.sweep_interval_seconds),
            config.run_once,
            shutdown_rx,
        )
        .await;

    info!("vigild stopped");
    Ok(())
}
