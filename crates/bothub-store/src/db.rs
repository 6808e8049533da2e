//! Database handle used by the web layer
//!
//! Wraps the in-memory [`DocumentStore`] behind one mutex and pushes a
//! snapshot to the selected backend after every mutation. Flushes run as
//! background tasks; no operation waits for one.
//!
//! Each flush carries a generation number taken under the store lock. Writes
//! are serialized and a flush older than the last one written is dropped, so
//! the backend never goes back to an earlier state.

use crate::backend::{BackendKind, BackendState};
use crate::config::StoreConfig;
use crate::document::DocumentStore;
use crate::error::Result;
use bothub_types::{Document, DownloadCounts, DownloadStats, StoreStats, User, UserSummary};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Database {
    store: Arc<Mutex<DocumentStore>>,
    backend: Arc<BackendState>,
    flushes: TaskTracker,
    generation: Arc<AtomicU64>,
    /// Generation of the last flush handed to the backend
    written: Arc<Mutex<u64>>,
}

impl Database {
    /// Select the backend from `config` and load whatever it holds
    pub async fn open(config: &StoreConfig) -> Self {
        let backend = BackendState::Unselected.select(config).await;
        Self::with_backend(backend).await
    }

    pub async fn with_backend(backend: BackendState) -> Self {
        let doc = backend.hydrate().await;
        info!(
            "Database ready: backend={}, users={}",
            backend
                .kind()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "none".to_string()),
            doc.users.len()
        );

        Self {
            store: Arc::new(Mutex::new(DocumentStore::from_document(doc))),
            backend: Arc::new(backend),
            flushes: TaskTracker::new(),
            generation: Arc::new(AtomicU64::new(0)),
            written: Arc::new(Mutex::new(0)),
        }
    }

    /// Empty database that never persists
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(Mutex::new(DocumentStore::new())),
            backend: Arc::new(BackendState::Unselected),
            flushes: TaskTracker::new(),
            generation: Arc::new(AtomicU64::new(0)),
            written: Arc::new(Mutex::new(0)),
        }
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.kind()
    }

    /// Copy of everything currently held in memory
    pub async fn snapshot(&self) -> Document {
        self.store.lock().await.document().clone()
    }

    /// Wait for every flush issued so far to finish
    pub async fn close(&self) {
        self.flushes.close();
        debug!("Waiting for {} pending flushes", self.flushes.len());
        self.flushes.wait().await;
    }

    /// Must be called while `store` is still locked
    fn schedule_flush(&self, store: &DocumentStore) {
        let doc = store.document().clone();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let backend = self.backend.clone();
        let written = self.written.clone();

        self.flushes.spawn(async move {
            let mut written = written.lock().await;
            if generation <= *written {
                debug!("Skipping stale flush {} (already wrote {})", generation, *written);
                return;
            }
            backend.flush(&doc).await;
            *written = generation;
        });
    }

    // Users

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSummary> {
        let mut store = self.store.lock().await;
        let summary = store.create_user(username, email, password)?;
        self.schedule_flush(&store);

        info!("Created user {} ({})", summary.username, summary.id);
        Ok(summary)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.store
            .lock()
            .await
            .find_user_by_username(username)
            .cloned()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.store.lock().await.find_user_by_email(email).cloned()
    }

    pub async fn find_user_by_login(&self, identifier: &str) -> Option<User> {
        self.store.lock().await.find_user_by_login(identifier).cloned()
    }

    pub async fn find_user_by_id(&self, id: &str) -> Option<User> {
        self.store.lock().await.find_user_by_id(id).cloned()
    }

    pub async fn authenticate(&self, identifier: &str, password: &str) -> Option<UserSummary> {
        self.store.lock().await.authenticate(identifier, password)
    }

    /// Unknown ids change nothing and return `None`
    pub async fn set_verification_code(
        &self,
        user_id: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Option<User> {
        let mut store = self.store.lock().await;
        let user = store
            .set_verification_code(user_id, code, expires_at)
            .cloned()?;
        self.schedule_flush(&store);
        Some(user)
    }

    pub async fn verify_code(&self, user_id: &str, code: &str) -> bool {
        self.store.lock().await.verify_code(user_id, code)
    }

    pub async fn is_user_verified(&self, user_id: &str) -> bool {
        self.store.lock().await.is_user_verified(user_id)
    }

    // Counters

    pub async fn record_download(&self, user_id: Option<&str>, download_type: Option<&str>) {
        let mut store = self.store.lock().await;
        store.record_download(user_id, download_type);
        self.schedule_flush(&store);
    }

    pub async fn record_clone(&self) {
        let mut store = self.store.lock().await;
        store.record_clone();
        self.schedule_flush(&store);
    }

    pub async fn total_downloads(&self) -> usize {
        self.store.lock().await.total_downloads()
    }

    pub async fn today_downloads(&self) -> usize {
        self.store.lock().await.today_downloads()
    }

    pub async fn user_count(&self) -> usize {
        self.store.lock().await.user_count()
    }

    pub async fn clone_count(&self) -> usize {
        self.store.lock().await.clone_count()
    }

    pub async fn downloads_by_type(&self) -> DownloadCounts {
        self.store.lock().await.downloads_by_type()
    }

    pub async fn download_stats(&self) -> DownloadStats {
        self.store.lock().await.download_stats()
    }

    pub async fn stats(&self) -> StoreStats {
        self.store.lock().await.stats()
    }
}
