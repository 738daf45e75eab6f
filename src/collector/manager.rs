use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::monitor::ProviderMonitor;
use crate::service::MeteoService;

/// Runs one monitor task per enabled provider
pub struct CollectorManager {
    service: Arc<MeteoService>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl CollectorManager {
    pub fn new(service: Arc<MeteoService>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            service,
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// Spawns a monitor for every enabled provider
    pub fn start(&mut self) {
        let providers = self.service.config().providers.clone();
        info!("Starting collector with {} provider(s)", providers.len());

        for provider in providers {
            if !provider.enabled {
                info!("Skipping disabled provider '{}'", provider.id);
                continue;
            }
            let handle = self.spawn_monitor(ProviderMonitor::new(provider, Arc::clone(&self.service)));
            self.handles.push(handle);
        }

        info!(
            "Collector initialization complete. {} provider(s) running.",
            self.handles.len()
        );
    }

    /// Number of running monitor tasks
    pub fn running(&self) -> usize {
        self.handles.len()
    }

    fn spawn_monitor(&self, monitor: ProviderMonitor) -> JoinHandle<()> {
        let shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            monitor.start(shutdown).await;
        })
    }

    /// Signals every monitor to stop after its current cycle and waits for them
    pub async fn shutdown(&mut self) {
        info!("Stopping collector");
        // No receivers left means every monitor has already exited
        let _ = self.shutdown_tx.send(true);
        self.wait().await;
    }

    /// Waits for all monitors to complete
    pub async fn wait(&mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Monitor task panicked: {}", e);
            }
        }
    }
}
