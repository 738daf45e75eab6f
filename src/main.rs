use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use meteolink::archive::RetentionManager;
use meteolink::collector::{CollectorManager, ProviderMonitor};
use meteolink::config::{self, MeteolinkConfig};
use meteolink::metrics;
use meteolink::service::MeteoService;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run a single cycle per provider, print the snapshots as NDJSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Determine configuration path
    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    // Logs go to stderr so stdout carries only NDJSON
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Using configuration file: {:?}", config_path);
    for provider in &config.providers {
        info!(
            "Provider: {} ({}, {} stations, enabled: {})",
            provider.id,
            provider.kind,
            provider.stations.len(),
            provider.enabled
        );
    }

    metrics::init_metrics_config(config.metrics.clone());
    let service = Arc::new(MeteoService::from_config(config.clone())?);

    if args.once {
        run_once(&config, &service).await?;
    } else {
        run_daemon(&config, service).await?;
    }

    match metrics::render() {
        Ok(text) => debug!("Final metrics:\n{}", text),
        Err(e) => error!("Failed to render metrics: {}", e),
    }
    Ok(())
}

/// One aggregation and persistence cycle per enabled provider
async fn run_once(config: &MeteolinkConfig, service: &Arc<MeteoService>) -> Result<()> {
    for provider in config.providers.iter().filter(|p| p.enabled) {
        let snapshot = service.refresh_snapshot(&provider.id).await?;
        let report = ProviderMonitor::new(provider.clone(), Arc::clone(service))
            .persist(&snapshot)
            .await;
        info!(
            "Provider {}: {} archived, {} logged, {} failed writes",
            provider.id, report.archived, report.logged, report.failed_writes
        );

        let mut stdout = std::io::stdout();
        stdout.write_all(snapshot.to_ndjson()?.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Runs the collector and the retention job until Ctrl-C
async fn run_daemon(config: &MeteolinkConfig, service: Arc<MeteoService>) -> Result<()> {
    let provider_ids = config.providers.iter().map(|p| p.id.clone()).collect();
    let mut retention =
        RetentionManager::new(config.retention.clone(), provider_ids, Arc::clone(service.archive()))
            .await?;
    retention.start().await?;

    let mut collector = CollectorManager::new(service);
    collector.start();

    info!("Meteolink running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutdown requested");
    collector.shutdown().await;
    retention.stop().await?;
    Ok(())
}
