use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    #[default]
    Loading,
    Online,
    Offline,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    Submit,
    History,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActiveMode {
    #[default]
    Git,
    Upload,
    History,
}

/// Which view and submission mode are showing. The view always follows the mode.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    active_view: ActiveView,
    active_mode: ActiveMode,
}

impl ViewState {
    pub fn with_mode(mode: ActiveMode) -> Self {
        let active_view = match mode {
            ActiveMode::History => ActiveView::History,
            ActiveMode::Git | ActiveMode::Upload => ActiveView::Submit,
        };
        Self {
            active_view,
            active_mode: mode,
        }
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn active_mode(&self) -> ActiveMode {
        self.active_mode
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_mode(ActiveMode::default())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ErrorState {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}
