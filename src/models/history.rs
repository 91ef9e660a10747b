use crate::models::scan::ScanResult;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

const SERVICE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Git,
    Upload,
    History,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HistorySummary {
    #[serde(default)]
    pub files_with_secrets: u64,
}

/// A completed scan as stored by the service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryItem {
    pub id: i64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub scan_type: ScanType,
    pub target: String,
    #[serde(default)]
    pub summary: HistorySummary,
    pub full_result: ScanResult,
}

impl HistoryItem {
    pub fn has_secrets(&self) -> bool {
        self.summary.files_with_secrets > 0
    }

    pub fn status_label(&self) -> String {
        match self.summary.files_with_secrets {
            0 => "Safe".to_string(),
            1 => "1 Issue".to_string(),
            n => format!("{} Issues", n),
        }
    }
}

/// Parses either RFC 3339 or the service's naive local `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, SERVICE_TIMESTAMP_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|| Some(Utc.from_utc_datetime(&naive)))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s ago", n, unit)
    } else {
        format!("{} {} ago", n, unit)
    }
}

/// Relative age used in the history table.
pub fn age_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);

    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        plural(elapsed.num_minutes(), "min")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 7 {
        plural(elapsed.num_days(), "day")
    } else {
        timestamp.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HistoryRow {
    pub id: i64,
    pub target: String,
    pub scan_type: ScanType,
    pub age: String,
    pub has_secrets: bool,
    pub status: String,
}

impl HistoryRow {
    pub fn new(item: &HistoryItem, now: DateTime<Utc>) -> Self {
        Self {
            id: item.id,
            target: item.target.clone(),
            scan_type: item.scan_type,
            age: age_label(item.timestamp, now),
            has_secrets: item.has_secrets(),
            status: item.status_label(),
        }
    }
}
