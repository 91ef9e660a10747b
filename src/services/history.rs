use crate::error::ClientResult;
use crate::models::history::HistoryItem;
use crate::models::scan::ScanResult;
use crate::services::notifier::ErrorNotifier;
use crate::services::scanner_api::ScannerApi;
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Listing {
    items: Vec<HistoryItem>,
    // ticket of the fetch that produced `items`
    ticket: u64,
}

/// Past scans as last delivered by the service, newest first.
pub struct HistorySynchronizer {
    api: Arc<dyn ScannerApi>,
    notifier: Arc<ErrorNotifier>,
    failure_message: String,
    issued: AtomicU64,
    listing: RwLock<Listing>,
}

impl HistorySynchronizer {
    pub fn new(
        api: Arc<dyn ScannerApi>,
        notifier: Arc<ErrorNotifier>,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            api,
            notifier,
            failure_message: failure_message.into(),
            issued: AtomicU64::new(0),
            listing: RwLock::new(Listing::default()),
        }
    }

    /// Replaces the held list with the service's. A failed fetch keeps the old list,
    /// and a response older than the one already applied is dropped.
    pub async fn refresh(&self) -> ClientResult<usize> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        match self.api.scan_history().await {
            Ok(items) => {
                let mut listing = self.listing.write().await;
                if ticket < listing.ticket {
                    debug!("Dropping history response {} superseded by {}", ticket, listing.ticket);
                    return Ok(listing.items.len());
                }
                let count = items.len();
                listing.items = items;
                listing.ticket = ticket;
                info!("Loaded {} history entries", count);
                Ok(count)
            }
            Err(e) => {
                error!("Failed to load history: {}", e);
                self.notifier.raise(self.failure_message.clone()).await;
                Err(e)
            }
        }
    }

    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let history = Arc::clone(self);
        tokio::spawn(async move {
            // failures are already surfaced through the notifier
            let _ = history.refresh().await;
        })
    }

    pub async fn items(&self) -> Vec<HistoryItem> {
        self.listing.read().await.items.clone()
    }

    /// The full result travels with the list entry, so this never hits the network.
    pub fn resolve(&self, item: &HistoryItem) -> ScanResult {
        item.full_result.clone()
    }

    pub async fn resolve_id(&self, id: i64) -> Option<ScanResult> {
        self.listing
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id == id)
            .map(|item| self.resolve(item))
    }
}
