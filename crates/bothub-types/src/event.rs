//! Download and clone counters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Download type used when the caller sends none, and the bucket that
/// unrecognized types are counted under
pub const DEFAULT_DOWNLOAD_TYPE: &str = "rdx";

/// The second recognized download type
pub const C3C_DOWNLOAD_TYPE: &str = "c3c";

/// One recorded file download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEvent {
    #[serde(default, deserialize_with = "crate::lenient::opt_string")]
    pub user_id: Option<String>,
    #[serde(
        default = "default_download_type",
        deserialize_with = "crate::lenient::download_type"
    )]
    pub download_type: String,
    #[serde(rename = "download_date")]
    pub date: NaiveDate,
    #[serde(rename = "download_time")]
    pub timestamp: DateTime<Utc>,
}

fn default_download_type() -> String {
    DEFAULT_DOWNLOAD_TYPE.to_string()
}

impl DownloadEvent {
    /// Build an event at `at`. Empty ids become `None` and empty types fall
    /// back to [`DEFAULT_DOWNLOAD_TYPE`].
    pub fn new(user_id: Option<&str>, download_type: Option<&str>, at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.filter(|id| !id.is_empty()).map(str::to_string),
            download_type: download_type
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_DOWNLOAD_TYPE)
                .to_string(),
            date: at.date_naive(),
            timestamp: at,
        }
    }
}

/// One recorded repository clone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneEvent {
    #[serde(rename = "clone_date")]
    pub date: NaiveDate,
    #[serde(rename = "clone_time")]
    pub timestamp: DateTime<Utc>,
}

impl CloneEvent {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            date: at.date_naive(),
            timestamp: at,
        }
    }
}

/// Downloads per recognized type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadCounts {
    pub rdx: usize,
    pub c3c: usize,
}

impl DownloadCounts {
    /// Count one event of `download_type`
    pub fn add(&mut self, download_type: &str) {
        match download_type {
            C3C_DOWNLOAD_TYPE => self.c3c += 1,
            // rdx and everything unrecognized
            _ => self.rdx += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.rdx + self.c3c
    }
}

/// Overall and same-day download totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStats {
    pub total: usize,
    pub today: usize,
}

/// Every counter the store keeps, read under one lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub users: usize,
    pub downloads: DownloadStats,
    pub by_type: DownloadCounts,
    pub clones: usize,
}
