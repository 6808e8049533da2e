//! Persisted document layout

use crate::{CloneEvent, DownloadEvent, User};
use serde::{Deserialize, Serialize};

/// The whole store as written to a backend, one self-contained snapshot.
///
/// Collections missing from an older snapshot load as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub downloads: Vec<DownloadEvent>,
    #[serde(default)]
    pub github_clones: Vec<CloneEvent>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.downloads.is_empty() && self.github_clones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let doc: Document = serde_json::from_str(r#"{"users": []}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_top_level_keys() {
        let json = serde_json::to_value(Document::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("users"));
        assert!(obj.contains_key("downloads"));
        assert!(obj.contains_key("github_clones"));
    }
}
