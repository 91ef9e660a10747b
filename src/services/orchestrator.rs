use crate::config::Messages;
use crate::error::{ClientError, ClientResult};
use crate::models::scan::{ScanRequest, ScanResult, UploadFile};
use crate::services::history::HistorySynchronizer;
use crate::services::notifier::ErrorNotifier;
use crate::services::scanner_api::ScannerApi;
use crate::utils::redact::{mask_secret, redact_url};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct ScanState {
    loading: bool,
    result: Option<ScanResult>,
}

/// Drives scan submissions and owns the current-result slot.
pub struct ScanOrchestrator {
    api: Arc<dyn ScannerApi>,
    notifier: Arc<ErrorNotifier>,
    history: Arc<HistorySynchronizer>,
    messages: Messages,
    max_upload_bytes: u64,
    state: RwLock<ScanState>,
}

impl ScanOrchestrator {
    pub fn new(
        api: Arc<dyn ScannerApi>,
        notifier: Arc<ErrorNotifier>,
        history: Arc<HistorySynchronizer>,
        messages: Messages,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            api,
            notifier,
            history,
            messages,
            max_upload_bytes,
            state: RwLock::new(ScanState::default()),
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn result(&self) -> Option<ScanResult> {
        self.state.read().await.result.clone()
    }

    pub async fn submit_git_scan(&self, repo_url: &str, token: Option<String>) -> ClientResult<ScanResult> {
        self.submit(ScanRequest::git(repo_url, token)).await
    }

    pub async fn submit_upload_scan(&self, file: Option<UploadFile>) -> ClientResult<ScanResult> {
        self.submit(ScanRequest::upload(file)).await
    }

    /// Runs one scan. Callers are expected to disable submission while `is_loading()`;
    /// concurrent calls are not rejected here.
    pub async fn submit(&self, request: ScanRequest) -> ClientResult<ScanResult> {
        if let Err(e) = request.validate(self.max_upload_bytes, &self.messages) {
            self.notifier.raise(e.to_string()).await;
            return Err(e);
        }

        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.result = None;
        }
        self.notifier.clear().await;

        let outcome = self.dispatch(&request).await;

        match &outcome {
            Ok(result) => {
                info!(
                    "{} scan finished with {} finding(s)",
                    request.kind(),
                    result.findings.len()
                );
                self.state.write().await.result = Some(result.clone());
            }
            Err(e) => {
                error!("{} scan failed: {}", request.kind(), e);
                let message = request.failure_message(e, &self.messages);
                self.notifier.raise(message).await;
            }
        }

        self.history.spawn_refresh();
        self.state.write().await.loading = false;

        outcome
    }

    async fn dispatch(&self, request: &ScanRequest) -> ClientResult<ScanResult> {
        match request {
            ScanRequest::Git { repo_url, token } => {
                info!("Starting git scan for {}", redact_url(repo_url));
                debug!(
                    "GitHub token: {}",
                    token.as_deref().map(mask_secret).unwrap_or_else(|| "none".to_string())
                );
                self.api.scan_repo(repo_url.trim(), token.as_deref()).await
            }
            ScanRequest::Upload { file: Some(file) } => {
                info!("Uploading {} ({} bytes) for scanning", file.filename, file.size());
                self.api.scan_upload(file).await
            }
            // rejected by validate()
            ScanRequest::Upload { file: None } => {
                Err(ClientError::Validation(self.messages.missing_file.clone()))
            }
        }
    }

    /// Shows a result obtained elsewhere, e.g. a resolved history entry.
    pub async fn show_result(&self, result: ScanResult) {
        self.state.write().await.result = Some(result);
    }

    pub async fn clear_result(&self) {
        self.state.write().await.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake_api::{FakeScannerApi, Reply, history_item};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    struct Fixture {
        api: Arc<FakeScannerApi>,
        notifier: Arc<ErrorNotifier>,
        history: Arc<HistorySynchronizer>,
        orchestrator: Arc<ScanOrchestrator>,
    }

    fn fixture() -> Fixture {
        let api = Arc::new(FakeScannerApi::new());
        let notifier = Arc::new(ErrorNotifier::new(Duration::from_millis(3000)));
        let history = Arc::new(HistorySynchronizer::new(
            api.clone(),
            Arc::clone(&notifier),
            "Failed to load scan history",
        ));
        let orchestrator = Arc::new(ScanOrchestrator::new(
            api.clone(),
            Arc::clone(&notifier),
            Arc::clone(&history),
            Messages::default(),
            1024,
        ));
        Fixture { api, notifier, history, orchestrator }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn leaky_result() -> ScanResult {
        serde_json::from_value(json!({
            "findings": [{"filename": ".env", "detectors": {"secretA": {"passed": false}}}],
            "ai_report": "Rotate secretA"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn blank_url_never_hits_network() {
        let f = fixture();
        for url in ["", "    "] {
            let err = f.orchestrator.submit_git_scan(url, None).await.unwrap_err();
            assert!(err.is_validation());
        }
        settle().await;

        assert_eq!(f.api.network_calls(), 0);
        assert!(!f.orchestrator.is_loading().await);
        assert_eq!(
            f.notifier.message().await.as_deref(),
            Some("Please enter a repository URL.")
        );
    }

    #[tokio::test]
    async fn missing_or_oversized_file_never_hits_network() {
        let f = fixture();
        let err = f.orchestrator.submit_upload_scan(None).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(f.notifier.message().await.as_deref(), Some("Please select a file."));

        let big = UploadFile::new("dump.bin", vec![0u8; 2048]);
        assert!(f.orchestrator.submit_upload_scan(Some(big)).await.is_err());
        settle().await;

        assert_eq!(f.api.network_calls(), 0);
        assert_eq!(
            f.notifier.message().await.as_deref(),
            Some("Upload failed or file is too large.")
        );
    }

    #[tokio::test]
    async fn successful_scan_stores_result_and_refreshes_once() {
        let f = fixture();
        f.api.set_scan_reply(Reply::Ok(leaky_result()));
        f.api.set_history_reply(Reply::Ok(vec![history_item(1, "https://github.com/a/b", 1)]));

        let result = f
            .orchestrator
            .submit_git_scan("https://github.com/a/b", Some("ghp_token".to_string()))
            .await
            .unwrap();
        settle().await;

        assert_eq!(result.findings[0].failed_detectors(), vec!["secretA".to_string()]);
        assert_eq!(f.orchestrator.result().await, Some(leaky_result()));
        assert!(!f.orchestrator.is_loading().await);
        assert_eq!(f.api.history_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.history.items().await.len(), 1);
        assert_eq!(f.api.last_token.lock().unwrap().as_deref(), Some("ghp_token"));
        assert_eq!(f.notifier.message().await, None);
    }

    #[tokio::test]
    async fn failed_scan_raises_service_message_and_still_refreshes() {
        let f = fixture();
        f.api.set_scan_reply(Reply::Fail(
            401,
            "This is a private repository or does not exist. Provide a GitHub token or check URL."
                .to_string(),
        ));

        let err = f
            .orchestrator
            .submit_git_scan("https://github.com/acme/private", None)
            .await
            .unwrap_err();
        settle().await;

        assert!(matches!(err, ClientError::Service { status: 401, .. }));
        assert_eq!(f.orchestrator.result().await, None);
        assert!(!f.orchestrator.is_loading().await);
        assert_eq!(f.api.history_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.notifier.message().await.as_deref(),
            Some("This is a private repository or does not exist. Provide a GitHub token or check URL.")
        );
    }

    #[tokio::test]
    async fn upload_failure_is_generic() {
        let f = fixture();
        f.api.set_scan_reply(Reply::Fail(413, "File is too large.".to_string()));

        let file = UploadFile::new("secrets.txt", b"password = 'hunter22'".to_vec());
        assert!(f.orchestrator.submit_upload_scan(Some(file)).await.is_err());
        settle().await;

        assert_eq!(f.api.upload_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.api.history_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.notifier.message().await.as_deref(),
            Some("Upload failed or file is too large.")
        );
    }

    #[tokio::test]
    async fn refresh_failure_does_not_mask_scan_outcome() {
        let f = fixture();
        f.api.set_scan_reply(Reply::Ok(ScanResult::default()));
        f.api.set_history_reply(Reply::Fail(500, "boom".to_string()));

        f.orchestrator
            .submit_git_scan("https://github.com/a/b", None)
            .await
            .unwrap();
        settle().await;

        assert_eq!(f.orchestrator.result().await, Some(ScanResult::default()));
        assert_eq!(
            f.notifier.message().await.as_deref(),
            Some("Failed to load scan history")
        );
    }

    #[tokio::test]
    async fn loading_spans_the_request() {
        let f = fixture();
        f.orchestrator.show_result(leaky_result()).await;
        f.notifier.raise("old error").await;
        let gate = f.api.hold_scans();

        let orchestrator = Arc::clone(&f.orchestrator);
        let scan = tokio::spawn(async move {
            orchestrator.submit_git_scan("https://github.com/a/b", None).await
        });
        settle().await;

        assert!(f.orchestrator.is_loading().await);
        assert_eq!(f.orchestrator.result().await, None);
        assert_eq!(f.notifier.message().await, None);
        assert_eq!(f.api.history_calls.load(Ordering::SeqCst), 0);

        gate.notify_one();
        scan.await.unwrap().unwrap();
        settle().await;

        assert!(!f.orchestrator.is_loading().await);
        assert_eq!(f.api.history_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_result_empties_slot() {
        let f = fixture();
        f.orchestrator.show_result(leaky_result()).await;
        f.orchestrator.clear_result().await;
        assert_eq!(f.orchestrator.result().await, None);
    }
}
