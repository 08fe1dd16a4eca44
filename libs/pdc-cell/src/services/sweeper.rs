// libs/pdc-cell/src/services/sweeper.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use shared_config::AppConfig;

use crate::services::pdc::PdcService;

/// Owned handle for the periodic issue sweep. Spawned once at bootstrap
/// and aborted on shutdown; dropping the handle does not leave a detached
/// timer behind.
pub struct PdcSweeper {
    handle: JoinHandle<()>,
}

impl PdcSweeper {
    /// Start the sweep loop. The first tick fires immediately so checks
    /// that came due while the service was down are issued at startup.
    pub fn spawn(config: Arc<AppConfig>) -> Self {
        let interval_hours = config.pdc_sweep_interval_hours.max(1);
        info!("Starting PDC sweep loop, every {}h", interval_hours);

        let handle = tokio::spawn(async move {
            let service = PdcService::new(&config);
            let mut ticker =
                tokio::time::interval(Duration::from_secs(interval_hours * 3600));

            loop {
                ticker.tick().await;
                match service.sweep_due_checks().await {
                    Ok(issued) if issued.is_empty() => {}
                    Ok(issued) => info!("Sweep issued {} check(s)", issued.len()),
                    Err(e) => error!("PDC sweep failed: {}", e),
                }
            }
        });

        Self { handle }
    }

    pub fn shutdown(self) {
        info!("Stopping PDC sweep loop");
        self.handle.abort();
    }
}
