//! User types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account as persisted in the snapshot.
///
/// The password is kept exactly as supplied at registration. No hashing
/// happens anywhere in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", deserialize_with = "crate::lenient::string")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "crate::lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub verification_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::lenient::opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub verification_expires: Option<DateTime<Utc>>,
}

impl User {
    /// Create an unverified user with a fresh id
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            username: username.into(),
            email: email.into(),
            password: password.into(),
            is_verified: false,
            created_at,
            verification_code: None,
            verification_expires: None,
        }
    }

    /// Public view of the account, without the password
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// What callers get back from registration and login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}
