//! Store configuration, read from the environment once at startup

use std::path::PathBuf;
use tracing::info;

/// Snapshot file used when `BOTHUB_DB_PATH` is not set
pub const DEFAULT_SNAPSHOT_PATH: &str = "database.json";

/// Credentials for the remote REST cache
#[derive(Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub token: String,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Local snapshot file
    pub snapshot_path: PathBuf,
    /// Set when running on the hosted deployment (`VERCEL=1`), the only
    /// context where the remote cache is considered
    pub hosted: bool,
    /// Remote cache credentials, if both are configured
    pub remote: Option<RemoteConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            hosted: false,
            remote: None,
        }
    }
}

impl StoreConfig {
    /// Local-only configuration writing to `path`
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: path.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("BOTHUB_DB_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));

        let hosted = lookup("VERCEL").as_deref() == Some("1");

        let url = lookup("UPSTASH_REDIS_REST_URL").filter(|v| !v.is_empty());
        let token = lookup("UPSTASH_REDIS_REST_TOKEN").filter(|v| !v.is_empty());
        let remote = match (url, token) {
            (Some(url), Some(token)) => Some(RemoteConfig { url, token }),
            _ => None,
        };

        info!(
            "Store config: snapshot={}, hosted={}, remote_configured={}",
            snapshot_path.display(),
            hosted,
            remote.is_some()
        );

        Self {
            snapshot_path,
            hosted,
            remote,
        }
    }
}
