mod cli;
mod config;
mod toggle;

use anyhow::Context;
use clap::Parser;
use daw_core::{DiscordIpc, Monitor, SysinfoProbe, run_monitor};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config_path = cli.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load_from(path),
        None => Config::default(),
    };
    cli.apply(&mut config);

    if cli.save_config {
        let path = config_path.context("no config directory on this platform")?;
        config.save_to(&path)?;
        info!(path = %path.display(), "configuration saved");
        return Ok(());
    }

    let client_id = config.client_id()?.to_string();
    let monitor_config = config.monitor_config()?;
    info!(status_file = %monitor_config.status_file.display(), "starting Ableton Live rich presence");

    let broadcasting = Arc::new(AtomicBool::new(true));
    if !cli.no_stdin {
        toggle::spawn_stdin_listener(Arc::clone(&broadcasting))
            .context("failed to start stdin listener")?;
        info!("type 'toggle' and press enter to pause or resume rich presence");
    }

    let monitor = Monitor::new(
        monitor_config,
        DiscordIpc::new(client_id),
        SysinfoProbe::new(),
        broadcasting,
    );
    run_monitor(monitor, shutdown_signal()).await;

    Ok(())
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown requested");
}
