use serde::Serialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub meta: AppMeta,
    pub api: ApiConfig,
    pub ui: UiCopy,
    pub host: String,
    pub port: u16,
    #[serde(with = "millis")]
    pub health_interval: Duration,
    #[serde(with = "millis")]
    pub health_timeout: Duration,
    #[serde(with = "millis")]
    pub error_ttl: Duration,
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppMeta {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Serialize)]
pub struct Endpoints {
    pub health: String,
    pub scan: String,
    pub upload: String,
    pub history: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: "/health".to_string(),
            scan: "/scan-repo".to_string(),
            upload: "/scan-upload".to_string(),
            history: "/scan-history".to_string(),
        }
    }
}

/// Static copy handed to the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct UiCopy {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub indicator_label: String,
    pub history_title: String,
    pub submit_button: String,
    pub scanning_text: String,
    pub upload_label: String,
    pub upload_limit_label: String,
    pub empty_state: String,
    pub empty_history: String,
    pub messages: Messages,
}

/// User-facing error messages raised through the notifier.
#[derive(Debug, Clone, Serialize)]
pub struct Messages {
    pub missing_repo_url: String,
    pub missing_file: String,
    pub upload_failed: String,
    pub history_failed: String,
    pub unknown_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            missing_repo_url: "Please enter a repository URL.".to_string(),
            missing_file: "Please select a file.".to_string(),
            upload_failed: "Upload failed or file is too large.".to_string(),
            history_failed: "Failed to load scan history".to_string(),
            unknown_error: "Unknown error".to_string(),
        }
    }
}

impl Default for UiCopy {
    fn default() -> Self {
        Self {
            hero_title: "Secrets Scanner".to_string(),
            hero_subtitle: "Security analysis tool".to_string(),
            indicator_label: "Backend Status".to_string(),
            history_title: "Scan History".to_string(),
            submit_button: "Start Security Scan".to_string(),
            scanning_text: "Scanning...".to_string(),
            upload_label: "Upload File to Scan".to_string(),
            upload_limit_label: "Max size 10MB".to_string(),
            empty_state: "No secrets detected. Clean code!".to_string(),
            empty_history: "No activity yet. Start by scanning a repository or uploading a file."
                .to_string(),
            messages: Messages::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            meta: AppMeta {
                title: "Secrets Scanner".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                endpoints: Endpoints::default(),
            },
            ui: UiCopy::default(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            health_interval: Duration::from_secs(30),
            health_timeout: Duration::from_secs(10),
            error_ttl: Duration::from_millis(3000),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; missing or unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("SCANNER_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api.base_url);

        let health_interval = lookup("HEALTH_CHECK_INTERVAL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.health_interval);

        let health_timeout = lookup("HEALTH_CHECK_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.health_timeout);

        let error_ttl = lookup("ERROR_DISMISS_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.error_ttl);

        Self {
            api: ApiConfig {
                base_url,
                endpoints: defaults.api.endpoints,
            },
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            health_interval,
            health_timeout,
            error_ttl,
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            ..defaults
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
