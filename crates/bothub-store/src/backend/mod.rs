//! Persistence backends
//!
//! The backend is picked once at startup and never changes afterwards:
//!
//! ```text
//! Unselected ──select()──┬──> RemoteCache    (hosted, credentials set, PING ok)
//!                        └──> LocalSnapshot  (everything else)
//! ```
//!
//! Every load and save goes through [`BackendState`], which logs failures
//! and drops them. Nothing past this module ever sees a persistence error.

pub mod remote;
pub mod snapshot;

pub use remote::RemoteCache;
pub use snapshot::LocalSnapshot;

use crate::config::StoreConfig;
use crate::error::PersistenceResult;
use async_trait::async_trait;
use bothub_types::Document;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    LocalSnapshot,
    RemoteCache,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::LocalSnapshot => write!(f, "local snapshot"),
            BackendKind::RemoteCache => write!(f, "remote cache"),
        }
    }
}

/// Somewhere a whole [`Document`] can be loaded from and saved to
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// `Ok(None)` when nothing has been saved yet
    async fn load(&self) -> PersistenceResult<Option<Document>>;

    /// Replace the stored copy with `doc`
    async fn save(&self, doc: &Document) -> PersistenceResult<()>;
}

pub enum BackendState {
    Unselected,
    LocalSnapshot(LocalSnapshot),
    RemoteCache(RemoteCache),
}

impl BackendState {
    /// Decide the backend from `config`. Only an `Unselected` state moves;
    /// an already selected backend is returned as is.
    pub async fn select(self, config: &StoreConfig) -> Self {
        if !matches!(self, BackendState::Unselected) {
            warn!("Persistence backend already selected, keeping it");
            return self;
        }

        let local = || BackendState::LocalSnapshot(LocalSnapshot::new(&config.snapshot_path));

        if !config.hosted {
            info!("Running locally - using snapshot file {}", config.snapshot_path.display());
            return local();
        }

        let Some(remote) = config.remote.as_ref() else {
            info!("Remote cache not configured - falling back to snapshot file");
            return local();
        };

        match RemoteCache::connect(remote).await {
            Ok(cache) => {
                info!("Connected to remote cache at {}", remote.url);
                BackendState::RemoteCache(cache)
            }
            Err(e) => {
                error!("Remote cache connection failed: {}", e);
                local()
            }
        }
    }

    pub fn kind(&self) -> Option<BackendKind> {
        self.backend().map(|b| b.kind())
    }

    fn backend(&self) -> Option<&dyn SnapshotBackend> {
        match self {
            BackendState::Unselected => None,
            BackendState::LocalSnapshot(b) => Some(b as &dyn SnapshotBackend),
            BackendState::RemoteCache(b) => Some(b as &dyn SnapshotBackend),
        }
    }

    /// Initial document: whatever the backend holds, or empty if it holds
    /// nothing or cannot be read
    pub async fn hydrate(&self) -> Document {
        let Some(backend) = self.backend() else {
            return Document::default();
        };

        match backend.load().await {
            Ok(Some(doc)) => {
                info!(
                    "Loaded {} users, {} downloads, {} clones from {}",
                    doc.users.len(),
                    doc.downloads.len(),
                    doc.github_clones.len(),
                    backend.kind()
                );
                doc
            }
            Ok(None) => {
                info!("No saved data in {}, starting empty", backend.kind());
                Document::default()
            }
            Err(e) => {
                error!("Error loading from {}: {}", backend.kind(), e);
                Document::default()
            }
        }
    }

    /// Save `doc`, logging instead of returning any failure
    pub async fn flush(&self, doc: &Document) {
        let Some(backend) = self.backend() else {
            debug!("No backend selected, skipping flush");
            return;
        };

        if let Err(e) = backend.save(doc).await {
            error!("Error saving to {}: {}", backend.kind(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;

    fn config_in(dir: &tempfile::TempDir) -> StoreConfig {
        StoreConfig::local(dir.path().join("database.json"))
    }

    #[tokio::test]
    async fn test_local_when_not_hosted() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.remote = Some(RemoteConfig {
            url: "http://127.0.0.1:1".to_string(),
            token: "t".to_string(),
        });

        let state = BackendState::Unselected.select(&config).await;
        assert_eq!(state.kind(), Some(BackendKind::LocalSnapshot));
    }

    #[tokio::test]
    async fn test_local_when_hosted_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.hosted = true;

        let state = BackendState::Unselected.select(&config).await;
        assert_eq!(state.kind(), Some(BackendKind::LocalSnapshot));
    }

    #[tokio::test]
    async fn test_falls_back_when_ping_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.hosted = true;
        config.remote = Some(RemoteConfig {
            url: "http://127.0.0.1:1".to_string(),
            token: "t".to_string(),
        });

        // The fallback still hydrates from the local file
        let mut doc = Document::default();
        doc.github_clones.push(bothub_types::CloneEvent::new(chrono::Utc::now()));
        LocalSnapshot::new(&config.snapshot_path)
            .save(&doc)
            .await
            .unwrap();

        let state = BackendState::Unselected.select(&config).await;
        assert_eq!(state.kind(), Some(BackendKind::LocalSnapshot));
        assert_eq!(state.hydrate().await, doc);
    }

    #[tokio::test]
    async fn test_selection_happens_once() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let state = BackendState::Unselected.select(&config_in(&first)).await;
        let state = state.select(&config_in(&second)).await;

        match state {
            BackendState::LocalSnapshot(snapshot) => {
                assert_eq!(snapshot.path(), first.path().join("database.json"));
            }
            _ => panic!("expected local snapshot"),
        }
    }

    #[tokio::test]
    async fn test_unselected_is_inert() {
        let state = BackendState::Unselected;
        assert_eq!(state.kind(), None);
        assert!(state.hydrate().await.is_empty());
        state.flush(&Document::default()).await;
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_hydrates_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.snapshot_path, "]]] definitely not json").unwrap();

        let state = BackendState::Unselected.select(&config).await;
        assert!(state.hydrate().await.is_empty());
    }

    #[tokio::test]
    async fn test_flush_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::local(dir.path().join("nope").join("database.json"));

        let state = BackendState::Unselected.select(&config).await;
        state.flush(&Document::default()).await;
        assert!(!config.snapshot_path.exists());
    }
}
