//! Error types for the BotHub store

use thiserror::Error;

/// Business errors returned to callers of the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("User already exists")]
    AlreadyExists,
}

/// Failures inside a persistence backend.
///
/// These never leave the persistence layer; they are logged and dropped there.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote cache error: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;
