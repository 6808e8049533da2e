//! In-memory document store
//!
//! Holds the three collections and applies every mutation. Lookups are
//! linear scans in insertion order. Nothing here does IO; the caller decides
//! when to flush.

use crate::error::{Result, StoreError};
use bothub_types::{
    CloneEvent, Document, DownloadCounts, DownloadEvent, DownloadStats, StoreStats, User,
    UserSummary,
};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    doc: Document,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    // User operations

    pub fn create_user(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSummary> {
        self.create_user_at(username, email, password, Utc::now())
    }

    /// Reject if either the username or the email is already taken
    pub fn create_user_at(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<UserSummary> {
        let taken = self
            .doc
            .users
            .iter()
            .any(|u| u.username == username || u.email == email);
        if taken {
            return Err(StoreError::AlreadyExists);
        }

        let user = User::new(username, email, password, now);
        let summary = user.summary();
        self.doc.users.push(user);
        Ok(summary)
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.doc.users.iter().find(|u| u.username == username)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.doc.users.iter().find(|u| u.email == email)
    }

    /// Email lookup if the identifier contains `@`, username lookup otherwise
    pub fn find_user_by_login(&self, identifier: &str) -> Option<&User> {
        if identifier.contains('@') {
            self.find_user_by_email(identifier)
        } else {
            self.find_user_by_username(identifier)
        }
    }

    pub fn find_user_by_id(&self, id: &str) -> Option<&User> {
        self.doc.users.iter().find(|u| u.id == id)
    }

    /// Plain-text password comparison against the login lookup
    pub fn authenticate(&self, identifier: &str, password: &str) -> Option<UserSummary> {
        self.find_user_by_login(identifier)
            .filter(|u| u.password == password)
            .map(User::summary)
    }

    /// Returns the updated user, or `None` (and changes nothing) if the id is unknown
    pub fn set_verification_code(
        &mut self,
        user_id: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Option<&User> {
        let user = self.doc.users.iter_mut().find(|u| u.id == user_id)?;
        user.verification_code = Some(code.to_string());
        user.verification_expires = Some(expires_at);
        Some(&*user)
    }

    /// Exact code match only. The expiry is not looked at and
    /// `is_verified` is left untouched.
    pub fn verify_code(&self, user_id: &str, code: &str) -> bool {
        self.find_user_by_id(user_id)
            .map(|u| u.verification_code.as_deref() == Some(code))
            .unwrap_or(false)
    }

    pub fn is_user_verified(&self, user_id: &str) -> bool {
        self.find_user_by_id(user_id)
            .map(|u| u.is_verified)
            .unwrap_or(false)
    }

    // Counters

    pub fn record_download(&mut self, user_id: Option<&str>, download_type: Option<&str>) {
        self.record_download_at(user_id, download_type, Utc::now());
    }

    pub fn record_download_at(
        &mut self,
        user_id: Option<&str>,
        download_type: Option<&str>,
        at: DateTime<Utc>,
    ) {
        self.doc
            .downloads
            .push(DownloadEvent::new(user_id, download_type, at));
    }

    pub fn record_clone(&mut self) {
        self.record_clone_at(Utc::now());
    }

    pub fn record_clone_at(&mut self, at: DateTime<Utc>) {
        self.doc.github_clones.push(CloneEvent::new(at));
    }

    pub fn total_downloads(&self) -> usize {
        self.doc.downloads.len()
    }

    pub fn today_downloads(&self) -> usize {
        self.downloads_on(Utc::now().date_naive())
    }

    pub fn downloads_on(&self, day: NaiveDate) -> usize {
        self.doc.downloads.iter().filter(|d| d.date == day).count()
    }

    pub fn user_count(&self) -> usize {
        self.doc.users.len()
    }

    pub fn clone_count(&self) -> usize {
        self.doc.github_clones.len()
    }

    pub fn downloads_by_type(&self) -> DownloadCounts {
        let mut counts = DownloadCounts::default();
        for event in &self.doc.downloads {
            counts.add(&event.download_type);
        }
        counts
    }

    pub fn download_stats(&self) -> DownloadStats {
        DownloadStats {
            total: self.total_downloads(),
            today: self.today_downloads(),
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            users: self.user_count(),
            downloads: self.download_stats(),
            by_type: self.downloads_by_type(),
            clones: self.clone_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with_alice() -> (DocumentStore, String) {
        let mut store = DocumentStore::new();
        let alice = store
            .create_user("alice", "alice@example.com", "hunter2")
            .unwrap();
        (store, alice.id)
    }

    #[test]
    fn test_create_user_returns_summary() {
        let (store, id) = store_with_alice();
        let user = store.find_user_by_id(&id).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, "hunter2");
        assert!(!user.is_verified);
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (mut store, _) = store_with_alice();
        let result = store.create_user("alice", "other@example.com", "pw");
        assert_eq!(result, Err(StoreError::AlreadyExists));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (mut store, _) = store_with_alice();
        let result = store.create_user("bob", "alice@example.com", "pw");
        assert_eq!(result, Err(StoreError::AlreadyExists));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_uniqueness_is_case_sensitive() {
        let (mut store, _) = store_with_alice();
        assert!(store.create_user("Alice", "Alice@example.com", "pw").is_ok());
        assert_eq!(store.user_count(), 2);
    }

    #[test]
    fn test_login_lookup_by_email_shape() {
        let mut store = DocumentStore::new();
        // A username containing '@' is only reachable through the username lookup
        store.create_user("bob@home", "bob@example.com", "pw").unwrap();
        store.create_user("carol", "carol@example.com", "pw").unwrap();

        assert!(store.find_user_by_login("bob@home").is_none());
        assert_eq!(
            store.find_user_by_login("bob@example.com").unwrap().username,
            "bob@home"
        );
        assert_eq!(store.find_user_by_login("carol").unwrap().username, "carol");
        assert!(store.find_user_by_login("carol@nowhere").is_none());
        assert_eq!(store.find_user_by_username("bob@home").unwrap().email, "bob@example.com");
    }

    #[test]
    fn test_missing_users_are_none() {
        let store = DocumentStore::new();
        assert!(store.find_user_by_id("nope").is_none());
        assert!(store.find_user_by_email("nope@example.com").is_none());
        assert!(store.find_user_by_username("nope").is_none());
        assert!(!store.is_user_verified("nope"));
        assert!(!store.verify_code("nope", "123456"));
    }

    #[test]
    fn test_authenticate_compares_plain_password() {
        let (store, id) = store_with_alice();
        assert_eq!(store.authenticate("alice", "hunter2").unwrap().id, id);
        assert_eq!(
            store.authenticate("alice@example.com", "hunter2").unwrap().id,
            id
        );
        assert!(store.authenticate("alice", "wrong").is_none());
        assert!(store.authenticate("nobody", "hunter2").is_none());
    }

    #[test]
    fn test_set_verification_code_unknown_user_is_noop() {
        let (mut store, _) = store_with_alice();
        let before = store.document().clone();
        assert!(store
            .set_verification_code("missing", "123456", Utc::now())
            .is_none());
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn test_verify_code_exact_match() {
        let (mut store, id) = store_with_alice();
        assert!(!store.verify_code(&id, "123456"));

        let expires = Utc::now() + Duration::minutes(15);
        let user = store.set_verification_code(&id, "123456", expires).unwrap();
        assert_eq!(user.verification_expires, Some(expires));

        assert!(store.verify_code(&id, "123456"));
        assert!(!store.verify_code(&id, "654321"));
        assert!(!store.verify_code(&id, "12345"));

        // Only the last code counts
        store.set_verification_code(&id, "999999", expires);
        assert!(!store.verify_code(&id, "123456"));
        assert!(store.verify_code(&id, "999999"));
    }

    #[test]
    fn test_verify_code_ignores_past_expiry() {
        let (mut store, id) = store_with_alice();
        let expired = Utc::now() - Duration::days(1);
        store.set_verification_code(&id, "123456", expired);

        assert!(store.verify_code(&id, "123456"));
        // Verification never flips the flag either
        assert!(!store.is_user_verified(&id));
    }

    #[test]
    fn test_downloads_by_type() {
        let mut store = DocumentStore::new();
        for _ in 0..3 {
            store.record_download(None, Some("rdx"));
        }
        for _ in 0..2 {
            store.record_download(Some("u1"), Some("c3c"));
        }
        store.record_download(None, Some("Z"));

        let counts = store.downloads_by_type();
        assert_eq!(counts.rdx, 4);
        assert_eq!(counts.c3c, 2);
        assert_eq!(counts.total(), store.total_downloads());
        assert_eq!(store.total_downloads(), 6);
    }

    #[test]
    fn test_today_ignores_yesterday() {
        let mut store = DocumentStore::new();
        let now = Utc::now();
        store.record_download_at(None, None, now);
        store.record_download_at(None, None, now);
        store.record_download_at(None, None, now - Duration::days(1));

        assert_eq!(store.today_downloads(), 2);
        assert_eq!(store.total_downloads(), 3);
        assert_eq!(
            store.downloads_on((now - Duration::days(1)).date_naive()),
            1
        );
    }

    #[test]
    fn test_clone_count_and_stats() {
        let (mut store, _) = store_with_alice();
        store.record_clone();
        store.record_clone();
        store.record_download(None, Some("c3c"));

        let stats = store.stats();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.clones, 2);
        assert_eq!(stats.downloads, DownloadStats { total: 1, today: 1 });
        assert_eq!(stats.by_type.c3c, 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = DocumentStore::new();
        for name in ["a", "b", "c"] {
            store
                .create_user(name, &format!("{name}@example.com"), "pw")
                .unwrap();
        }
        let names: Vec<_> = store
            .document()
            .users
            .iter()
            .map(|u| u.username.as_str())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
