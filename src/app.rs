use crate::config::AppConfig;
use crate::models::history::{HistoryItem, HistoryRow};
use crate::models::scan::{ResultView, ScanResult};
use crate::models::state::{BackendStatus, ErrorState, ViewState};
use crate::services::health::HealthMonitor;
use crate::services::history::HistorySynchronizer;
use crate::services::notifier::ErrorNotifier;
use crate::services::orchestrator::ScanOrchestrator;
use crate::services::scanner_api::ScannerApi;
use crate::services::view::ViewController;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything the rendering layer reads, taken at one instant.
#[derive(Debug, Serialize, Clone)]
pub struct AppSnapshot {
    pub backend_status: BackendStatus,
    pub loading: bool,
    pub result: Option<ScanResult>,
    pub result_view: Option<ResultView>,
    pub history: Vec<HistoryItem>,
    pub history_rows: Vec<HistoryRow>,
    pub error: Option<ErrorState>,
    pub view: ViewState,
}

pub struct ScannerApp {
    pub config: Arc<AppConfig>,
    pub notifier: Arc<ErrorNotifier>,
    pub health: Arc<HealthMonitor>,
    pub history: Arc<HistorySynchronizer>,
    pub orchestrator: Arc<ScanOrchestrator>,
    pub view: Arc<ViewController>,
}

impl ScannerApp {
    pub fn new(config: AppConfig, api: Arc<dyn ScannerApi>) -> Self {
        let notifier = Arc::new(ErrorNotifier::new(config.error_ttl));
        let health = Arc::new(HealthMonitor::new(
            Arc::clone(&api),
            config.health_interval,
            config.health_timeout,
        ));
        let history = Arc::new(HistorySynchronizer::new(
            Arc::clone(&api),
            Arc::clone(&notifier),
            config.ui.messages.history_failed.clone(),
        ));
        let orchestrator = Arc::new(ScanOrchestrator::new(
            api,
            Arc::clone(&notifier),
            Arc::clone(&history),
            config.ui.messages.clone(),
            config.max_upload_bytes,
        ));
        let view = Arc::new(ViewController::new(Arc::clone(&orchestrator)));

        Self {
            config: Arc::new(config),
            notifier,
            health,
            history,
            orchestrator,
            view,
        }
    }

    /// Starts health polling and the initial history load. The returned handle
    /// stops polling when aborted.
    pub fn start(&self) -> JoinHandle<()> {
        self.history.spawn_refresh();
        self.health.spawn()
    }

    /// Puts a past scan on screen without touching the network.
    pub async fn view_history_item(&self, id: i64) -> Option<ScanResult> {
        let result = self.history.resolve_id(id).await?;
        self.orchestrator.show_result(result.clone()).await;
        Some(result)
    }

    pub async fn snapshot(&self) -> AppSnapshot {
        let result = self.orchestrator.result().await;
        let history = self.history.items().await;
        let now = Utc::now();

        AppSnapshot {
            backend_status: self.health.status().await,
            loading: self.orchestrator.is_loading().await,
            result_view: result.as_ref().map(ResultView::from),
            result,
            history_rows: history.iter().map(|item| HistoryRow::new(item, now)).collect(),
            history,
            error: self.notifier.current().await,
            view: self.view.state().await,
        }
    }
}
