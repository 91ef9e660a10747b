//! In-memory `ScannerApi` for unit tests.

use crate::error::{ClientError, ClientResult};
use crate::models::history::{HistoryItem, HistorySummary, ScanType};
use crate::models::scan::{ScanResult, UploadFile};
use crate::services::scanner_api::ScannerApi;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail(u16, String),
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> ClientResult<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail(status, message) => Err(ClientError::Service {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

pub struct FakeScannerApi {
    pub healthy: AtomicBool,
    pub health_calls: AtomicUsize,
    pub scan_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub last_token: Mutex<Option<String>>,
    scan_reply: Mutex<Reply<ScanResult>>,
    history_reply: Mutex<Reply<Vec<HistoryItem>>>,
    scan_gate: Mutex<Option<Arc<Notify>>>,
    history_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeScannerApi {
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            health_calls: AtomicUsize::new(0),
            scan_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
            scan_reply: Mutex::new(Reply::Ok(ScanResult::default())),
            history_reply: Mutex::new(Reply::Ok(Vec::new())),
            scan_gate: Mutex::new(None),
            history_gate: Mutex::new(None),
        }
    }

    pub fn set_scan_reply(&self, reply: Reply<ScanResult>) {
        *self.scan_reply.lock().unwrap() = reply;
    }

    pub fn set_history_reply(&self, reply: Reply<Vec<HistoryItem>>) {
        *self.history_reply.lock().unwrap() = reply;
    }

    /// Scans block until the returned `Notify` is signalled.
    pub fn hold_scans(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.scan_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// The next history fetch captures its reply, then blocks until signalled.
    /// Later fetches are not held.
    pub fn hold_history(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.history_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn network_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
            + self.scan_calls.load(Ordering::SeqCst)
            + self.upload_calls.load(Ordering::SeqCst)
            + self.history_calls.load(Ordering::SeqCst)
    }

    async fn wait_for_gate(&self) {
        let gate = self.scan_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

pub fn history_item(id: i64, target: &str, files_with_secrets: u64) -> HistoryItem {
    HistoryItem {
        id,
        timestamp: Utc::now(),
        scan_type: ScanType::Git,
        target: target.to_string(),
        summary: HistorySummary { files_with_secrets },
        full_result: ScanResult {
            ai_report: format!("report for {}", target),
            ..ScanResult::default()
        },
    }
}

#[async_trait]
impl ScannerApi for FakeScannerApi {
    async fn check_health(&self) -> ClientResult<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ClientError::Service {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        }
    }

    async fn scan_repo(&self, _repo_url: &str, github_token: Option<&str>) -> ClientResult<ScanResult> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = github_token.map(str::to_string);
        self.wait_for_gate().await;
        let reply = self.scan_reply.lock().unwrap().clone();
        reply.get()
    }

    async fn scan_upload(&self, _file: &UploadFile) -> ClientResult<ScanResult> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        let reply = self.scan_reply.lock().unwrap().clone();
        reply.get()
    }

    async fn scan_history(&self) -> ClientResult<Vec<HistoryItem>> {
        let reply = self.history_reply.lock().unwrap().clone();
        let gate = self.history_gate.lock().unwrap().take();
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        reply.get()
    }
}
