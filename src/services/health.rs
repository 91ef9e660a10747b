use crate::error::ClientError;
use crate::models::state::BackendStatus;
use crate::services::scanner_api::ScannerApi;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};

pub struct HealthMonitor {
    api: Arc<dyn ScannerApi>,
    period: Duration,
    probe_timeout: Duration,
    status: RwLock<BackendStatus>,
}

impl HealthMonitor {
    pub fn new(api: Arc<dyn ScannerApi>, period: Duration, probe_timeout: Duration) -> Self {
        Self {
            api,
            period,
            probe_timeout,
            status: RwLock::new(BackendStatus::Loading),
        }
    }

    pub async fn status(&self) -> BackendStatus {
        *self.status.read().await
    }

    /// Probes now and then every period until the handle is aborted.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(monitor.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.probe().await;
            }
        })
    }

    pub async fn probe(&self) -> BackendStatus {
        let outcome = match timeout(self.probe_timeout, self.api.check_health()).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.probe_timeout)),
        };

        let next = match outcome {
            Ok(()) => BackendStatus::Online,
            Err(e) => {
                warn!("Health check failed: {}", e);
                BackendStatus::Offline
            }
        };

        let mut status = self.status.write().await;
        if *status != next {
            info!("Backend status changed: {:?} -> {:?}", *status, next);
        }
        *status = next;
        next
    }
}
