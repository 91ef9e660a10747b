use crate::models::state::{ActiveMode, ViewState};
use crate::services::orchestrator::ScanOrchestrator;
use log::debug;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ViewController {
    orchestrator: Arc<ScanOrchestrator>,
    state: RwLock<ViewState>,
}

impl ViewController {
    pub fn new(orchestrator: Arc<ScanOrchestrator>) -> Self {
        Self {
            orchestrator,
            state: RwLock::new(ViewState::default()),
        }
    }

    pub async fn state(&self) -> ViewState {
        *self.state.read().await
    }

    /// Switches mode and drops the current result, even when the mode is unchanged.
    pub async fn select_mode(&self, mode: ActiveMode) -> ViewState {
        let next = ViewState::with_mode(mode);
        *self.state.write().await = next;
        self.orchestrator.clear_result().await;
        debug!("Selected mode {:?}", mode);
        next
    }
}
