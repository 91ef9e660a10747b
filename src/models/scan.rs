use crate::config::Messages;
use crate::error::{ClientError, ClientResult};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Result of one scan as returned by the analysis service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ScanResult {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub ai_report: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScanSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ScanSummary {
    #[serde(default)]
    pub total_files_scanned: u64,
    #[serde(default)]
    pub files_with_secrets: u64,
    #[serde(default)]
    pub files_with_errors: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Finding {
    pub filename: String,
    #[serde(default)]
    pub detectors: BTreeMap<String, DetectorOutcome>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DetectorOutcome {
    #[serde(default = "passed_by_default")]
    pub passed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn passed_by_default() -> bool {
    true
}

impl Finding {
    /// Names of the detectors that flagged this file.
    pub fn failed_detectors(&self) -> Vec<String> {
        self.detectors
            .iter()
            .filter(|(_, outcome)| !outcome.passed)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Row of the findings table.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FindingRow {
    pub filename: String,
    pub failed_detectors: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultView {
    pub issue_count: usize,
    pub is_clean: bool,
    pub rows: Vec<FindingRow>,
    pub ai_report: String,
}

impl From<&ScanResult> for ResultView {
    fn from(result: &ScanResult) -> Self {
        let rows: Vec<FindingRow> = result
            .findings
            .iter()
            .map(|f| FindingRow {
                filename: f.filename.clone(),
                failed_detectors: f.failed_detectors(),
            })
            .collect();

        Self {
            issue_count: rows.len(),
            is_clean: rows.is_empty(),
            rows,
            ai_report: result.ai_report.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanRequest {
    Git {
        repo_url: String,
        token: Option<String>,
    },
    Upload {
        file: Option<UploadFile>,
    },
}

impl ScanRequest {
    pub fn git(repo_url: impl Into<String>, token: Option<String>) -> Self {
        ScanRequest::Git {
            repo_url: repo_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn upload(file: Option<UploadFile>) -> Self {
        ScanRequest::Upload { file }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScanRequest::Git { .. } => "git",
            ScanRequest::Upload { .. } => "upload",
        }
    }

    /// Client-side checks run before anything is sent.
    pub fn validate(&self, max_upload_bytes: u64, messages: &Messages) -> ClientResult<()> {
        match self {
            ScanRequest::Git { repo_url, .. } => {
                if repo_url.trim().is_empty() {
                    return Err(ClientError::Validation(messages.missing_repo_url.clone()));
                }
            }
            ScanRequest::Upload { file } => match file {
                None => return Err(ClientError::Validation(messages.missing_file.clone())),
                Some(file) if file.size() > max_upload_bytes => {
                    return Err(ClientError::Validation(messages.upload_failed.clone()));
                }
                Some(_) => {}
            },
        }
        Ok(())
    }

    /// Message raised when the service call fails.
    pub fn failure_message(&self, err: &ClientError, messages: &Messages) -> String {
        match self {
            ScanRequest::Git { .. } => err.message_or(&messages.unknown_error),
            // the service never echoes the upload back, so its reason is not useful here
            ScanRequest::Upload { .. } => messages.upload_failed.clone(),
        }
    }
}
