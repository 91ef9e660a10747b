use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::history::HistoryItem;
use crate::models::scan::{ScanResult, UploadFile};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// The calls this client makes against the analysis service.
#[async_trait]
pub trait ScannerApi: Send + Sync {
    async fn check_health(&self) -> ClientResult<()>;

    async fn scan_repo(&self, repo_url: &str, github_token: Option<&str>) -> ClientResult<ScanResult>;

    async fn scan_upload(&self, file: &UploadFile) -> ClientResult<ScanResult>;

    async fn scan_history(&self) -> ClientResult<Vec<HistoryItem>>;
}

#[derive(Debug, Serialize)]
struct ScanRepoBody<'a> {
    repo_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    github_token: Option<&'a str>,
}

pub struct HttpScannerClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpScannerClient {
    pub fn new(config: ApiConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("secrets-console"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        error!("Scanner API error {}: {}", status, error_text);
        Err(ClientError::Service {
            status: status.as_u16(),
            message: service_message(status.as_u16(), &error_text),
        })
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Prefers the `{"error": ...}` text the service sends with failures.
fn service_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status))
}

#[async_trait]
impl ScannerApi for HttpScannerClient {
    async fn check_health(&self) -> ClientResult<()> {
        let url = self.url(&self.config.endpoints.health);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn scan_repo(&self, repo_url: &str, github_token: Option<&str>) -> ClientResult<ScanResult> {
        let url = self.url(&self.config.endpoints.scan);
        debug!("POST {}", url);

        let body = ScanRepoBody { repo_url, github_token };
        let response = self.client.post(&url).json(&body).send().await?;
        Self::read_json(response).await
    }

    async fn scan_upload(&self, file: &UploadFile) -> ClientResult<ScanResult> {
        let url = self.url(&self.config.endpoints.upload);
        debug!("POST {} ({} bytes)", url, file.size());

        // `Bytes` clones share the buffer
        let part = Part::stream_with_length(file.content.clone(), file.size())
            .file_name(file.filename.clone());
        let form = Form::new().part("file", part);
        let response = self.client.post(&url).multipart(form).send().await?;
        Self::read_json(response).await
    }

    async fn scan_history(&self) -> ClientResult<Vec<HistoryItem>> {
        let url = self.url(&self.config.endpoints.history);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }
}
