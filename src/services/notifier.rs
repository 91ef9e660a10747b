use crate::models::state::ErrorState;
use chrono::Utc;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

#[derive(Default)]
struct NotifierState {
    current: Option<ErrorState>,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

/// Holds the single user-facing error and dismisses it after `ttl`.
pub struct ErrorNotifier {
    ttl: Duration,
    state: Arc<RwLock<NotifierState>>,
}

impl ErrorNotifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(RwLock::new(NotifierState::default())),
        }
    }

    /// Replaces any visible error and restarts the countdown.
    pub async fn raise(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);

        let mut state = self.state.write().await;
        state.generation += 1;
        if let Some(pending) = state.expiry.take() {
            pending.abort();
        }
        state.current = Some(ErrorState {
            message,
            raised_at: Utc::now(),
        });

        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let ttl = self.ttl;
        state.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = shared.write().await;
            // a newer raise or a clear owns the slot now
            if state.generation == generation {
                debug!("Error dismissed after {:?}", ttl);
                state.current = None;
                state.expiry = None;
            }
        }));
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        if let Some(pending) = state.expiry.take() {
            pending.abort();
        }
        state.current = None;
    }

    pub async fn current(&self) -> Option<ErrorState> {
        self.state.read().await.current.clone()
    }

    pub async fn message(&self) -> Option<String> {
        self.state.read().await.current.as_ref().map(|e| e.message.clone())
    }
}
