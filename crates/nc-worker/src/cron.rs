//! Cron scheduler for the subpool activation cycle and actuality sync.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info, trace, warn};

use nc_core::config::ConfigHandle;
use nc_core::error::AppError;
use nc_service::{ActualityService, SubPoolActivator};

/// Cron-based scheduler for the coarse periodic jobs.
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    activator: SubPoolActivator,
    actuality: ActualityService,
    config: ConfigHandle,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(
        activator: SubPoolActivator,
        actuality: ActualityService,
        config: ConfigHandle,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            activator,
            actuality,
            config,
        })
    }

    /// Register the jobs enabled in the current configuration.
    ///
    /// Cron expressions are read once here; a reload takes effect on the
    /// next restart of the scheduler.
    pub async fn register_default_tasks(&self) -> Result<usize, AppError> {
        let config = self.config.current();
        let mut registered = 0;

        if config.rotation.activation_enabled {
            self.register_activation(&config.rotation.activation_cron)
                .await?;
            registered += 1;
        }
        if config.vendor_control.sync_enabled {
            self.register_actuality_sync(&config.vendor_control.sync_cron)
                .await?;
            registered += 1;
        }

        info!(registered, "Scheduled tasks registered");
        Ok(registered)
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        info!("Cron scheduler shut down");
        Ok(())
    }

    /// Subpool activation cycle over every active pool.
    async fn register_activation(&self, schedule: &str) -> Result<(), AppError> {
        let activator = self.activator.clone();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let activator = activator.clone();
            Box::pin(async move {
                debug!("Running subpool activation cycle");
                match activator.activate_all().await {
                    Ok(report) => {
                        info!(
                            pools = report.pools.len(),
                            activated = report.activated(),
                            "Subpool activation cycle finished"
                        );
                        if let Err(e) = report.into_result() {
                            warn!(error = %e, "Subpool activation had failures");
                        }
                    }
                    Err(e) => error!(error = %e, "Subpool activation cycle failed"),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid rotation.activation_cron '{schedule}': {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add subpool_activation schedule: {}", e))
        })?;

        info!(cron = schedule, "Registered: subpool_activation");
        Ok(())
    }

    /// Team actual-vendor sync against vendor control.
    async fn register_actuality_sync(&self, schedule: &str) -> Result<(), AppError> {
        let actuality = self.actuality.clone();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let actuality = actuality.clone();
            Box::pin(async move {
                trace!("Running vendor actuality sync");
                match actuality.sync_all().await {
                    Ok(summary) if summary.updated > 0 || summary.failed > 0 => {
                        info!(
                            teams = summary.teams,
                            updated = summary.updated,
                            failed = summary.failed,
                            "Vendor actuality synced"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Vendor actuality sync failed"),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid vendor_control.sync_cron '{schedule}': {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add actuality_sync schedule: {}", e))
        })?;

        info!(cron = schedule, "Registered: actuality_sync");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use nc_client::mock::{RecordingPusher, StaticVendorControl};
    use nc_core::config::{AppConfig, ConfigSource};
    use nc_core::error::ErrorKind;
    use nc_database::MemoryStore;
    use nc_service::Services;

    fn services() -> Services {
        Services::new(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingPusher::new()),
            Arc::new(StaticVendorControl::new()),
        )
    }

    fn config() -> ConfigHandle {
        let raw = r#"
            [database]
            url = "postgres://localhost/nc"
            [webitel]
            base_url = "http://w"
            access_token = "t"
            [vendor_control]
            base_url = "http://v"
        "#;
        ConfigHandle::new(AppConfig::from_toml(raw).expect("config"), ConfigSource::Static)
    }

    #[tokio::test]
    async fn test_registers_both_jobs_by_default() {
        let services = services();
        let cron = CronScheduler::new(services.activator, services.actuality, config())
            .await
            .expect("scheduler");
        assert_eq!(cron.register_default_tasks().await.expect("register"), 2);
    }

    #[tokio::test]
    async fn test_invalid_cron_is_configuration_error() {
        let services = services();
        let handle = config();
        let mut snapshot = (*handle.current()).clone();
        snapshot.rotation.activation_cron = "every now and then".into();
        handle.replace(snapshot);

        let cron = CronScheduler::new(services.activator, services.actuality, handle)
            .await
            .expect("scheduler");
        let err = cron.register_default_tasks().await.expect_err("bad cron");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
