//! BotHub Store
//!
//! Persistence and query layer behind the BotHub website: user accounts,
//! download counters and clone counters, kept in memory and mirrored to a
//! local snapshot file or a remote cache.
//!
//! Passwords are stored and compared as plain text, user verification is
//! never completed, and verification codes never expire. All three are
//! existing behavior that callers rely on; any real deployment needs a
//! password hashing scheme in front of this store.

pub mod backend;
pub mod config;
pub mod db;
pub mod document;
pub mod error;

pub use backend::{BackendKind, BackendState, SnapshotBackend};
pub use config::{RemoteConfig, StoreConfig};
pub use db::Database;
pub use document::DocumentStore;
pub use error::{PersistenceError, Result, StoreError};

pub use bothub_types as types;
