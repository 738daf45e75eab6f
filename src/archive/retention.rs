use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};

use super::daily::DailyArchiveStore;
use crate::config::RetentionConfig;

/// Manages the archive retention job
pub struct RetentionManager {
    config: RetentionConfig,
    providers: Vec<String>,
    archive: Arc<DailyArchiveStore>,
    scheduler: JobScheduler,
}

impl RetentionManager {
    /// Creates a new retention manager for the given providers' archives
    pub async fn new(
        config: RetentionConfig,
        providers: Vec<String>,
        archive: Arc<DailyArchiveStore>,
    ) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;

        Ok(Self {
            config,
            providers,
            archive,
            scheduler,
        })
    }

    /// Starts the retention scheduler
    pub async fn start(&mut self) -> Result<()> {
        if !self.config.enabled {
            info!("Archive retention is disabled in configuration");
            return Ok(());
        }

        let schedule = &self.config.schedule;
        info!(
            "Starting archive retention scheduler with cron schedule: {} (keeping {} days)",
            schedule, self.config.keep_days
        );

        let keep_days = self.config.keep_days;
        let providers = self.providers.clone();
        let archive = Arc::clone(&self.archive);

        let job = Job::new_async(schedule.as_str(), move |_uuid, _l| {
            let providers = providers.clone();
            let archive = Arc::clone(&archive);

            Box::pin(async move {
                info!("Running scheduled archive retention");
                let today = archive.today();
                if let Err(e) = run_retention(&archive, &providers, keep_days, today).await {
                    error!("Archive retention failed: {}", e);
                }
            })
        })
        .context("Failed to create retention job")?;

        self.scheduler
            .add(job)
            .await
            .context("Failed to add job to scheduler")?;

        self.scheduler
            .start()
            .await
            .context("Failed to start scheduler")?;

        info!("Archive retention scheduler started successfully");
        Ok(())
    }

    /// Stops the retention scheduler
    pub async fn stop(&mut self) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        info!("Stopping archive retention scheduler");
        self.scheduler
            .shutdown()
            .await
            .context("Failed to shutdown scheduler")?;
        Ok(())
    }
}

/// First date kept when `keep_days` days are retained, counting `today`
pub fn retention_threshold(today: NaiveDate, keep_days: u32) -> NaiveDate {
    today - Duration::days(i64::from(keep_days.saturating_sub(1)))
}

/// Prunes every archived station of the given providers, returning dates removed
pub async fn run_retention(
    archive: &DailyArchiveStore,
    providers: &[String],
    keep_days: u32,
    today: NaiveDate,
) -> Result<usize> {
    let start_time = Utc::now();
    let threshold = retention_threshold(today, keep_days);
    let mut total_removed = 0usize;
    let mut station_count = 0usize;

    for provider in providers {
        let stations = archive
            .stations(provider)
            .await
            .with_context(|| format!("Failed to list archives of provider '{}'", provider))?;

        for station in stations {
            match archive.prune_before(provider, &station, threshold).await {
                Ok(removed) => {
                    if removed > 0 {
                        debug!(
                            "Removed {} dates before {} from {}/{}",
                            removed, threshold, provider, station
                        );
                    }
                    total_removed += removed;
                    station_count += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to prune archive of station '{}' in provider '{}': {}",
                        station, provider, e
                    );
                }
            }
        }
    }

    let duration = Utc::now() - start_time;
    info!(
        "Archive retention completed: removed {} dates across {} stations in {:.2}s",
        total_removed,
        station_count,
        duration.num_milliseconds() as f64 / 1000.0
    );

    Ok(total_removed)
}
