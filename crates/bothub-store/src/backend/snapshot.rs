//! Local snapshot file
//!
//! The whole document is rewritten on every save. Each write goes to a
//! uniquely named sibling temp file that is then renamed over the target, so
//! concurrent saves leave the last complete snapshot in place.

use super::{BackendKind, SnapshotBackend};
use crate::error::PersistenceResult;
use async_trait::async_trait;
use bothub_types::Document;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct LocalSnapshot {
    path: PathBuf,
}

impl LocalSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("snapshot"));
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotBackend for LocalSnapshot {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalSnapshot
    }

    async fn load(&self) -> PersistenceResult<Option<Document>> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!("No snapshot at {}", self.path.display());
            return Ok(None);
        }

        let data = tokio::fs::read_to_string(&self.path).await?;
        let doc = serde_json::from_str(&data)?;
        Ok(Some(doc))
    }

    async fn save(&self, doc: &Document) -> PersistenceResult<()> {
        let data = serde_json::to_vec_pretty(doc)?;
        let temp = self.temp_path();

        if let Err(e) = tokio::fs::write(&temp, &data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!("Wrote {} bytes to {}", data.len(), self.path.display());
        Ok(())
    }
}
