//! Root index schema (`chat_config.json`)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted conversation order and per-conversation folder selection
///
/// Rewritten in full on every mutating registry operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootIndex {
    /// ISO 8601 UTC time of the last write
    #[serde(default)]
    pub last_accessed: String,

    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,

    /// Conversation selected when the index was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_conversation: Option<String>,
}

/// One conversation in the root index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    /// Folder name
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub current_folder: FolderPointer,

    /// Position in the conversation list
    #[serde(default)]
    pub order: usize,
}

/// Which folder of a conversation is active
///
/// Serialized as `"main"` for the conversation's root folder, or as the
/// slash-joined path of a subfolder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FolderPointer {
    #[default]
    Main,
    Sub(String),
}

impl FolderPointer {
    pub const MAIN: &'static str = "main";

    pub fn is_main(&self) -> bool {
        matches!(self, FolderPointer::Main)
    }

    /// Subfolder path, `None` for the root folder
    pub fn sub_path(&self) -> Option<&str> {
        match self {
            FolderPointer::Main => None,
            FolderPointer::Sub(path) => Some(path),
        }
    }
}

impl From<String> for FolderPointer {
    fn from(value: String) -> Self {
        let trimmed = value.trim_matches('/');
        if trimmed.is_empty() || trimmed == Self::MAIN {
            FolderPointer::Main
        } else {
            FolderPointer::Sub(trimmed.to_string())
        }
    }
}

impl From<&str> for FolderPointer {
    fn from(value: &str) -> Self {
        FolderPointer::from(value.to_string())
    }
}

impl From<FolderPointer> for String {
    fn from(value: FolderPointer) -> Self {
        match value {
            FolderPointer::Main => FolderPointer::MAIN.to_string(),
            FolderPointer::Sub(path) => path,
        }
    }
}

impl fmt::Display for FolderPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderPointer::Main => f.write_str(FolderPointer::MAIN),
            FolderPointer::Sub(path) => f.write_str(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_index_json_shape() {
        let json = r#"{
            "lastAccessed": "2026-02-11T14:30:00.000Z",
            "conversations": [
                {"id": "work", "title": "work", "currentFolder": "main", "order": 0},
                {"id": "trip", "title": "trip", "currentFolder": "photos/day1", "order": 1}
            ]
        }"#;

        let index: RootIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.conversations.len(), 2);
        assert_eq!(index.conversations[0].current_folder, FolderPointer::Main);
        assert_eq!(
            index.conversations[1].current_folder,
            FolderPointer::Sub("photos/day1".to_string())
        );
        assert!(index.active_conversation.is_none());

        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["conversations"][1]["currentFolder"], "photos/day1");
        assert!(value.get("activeConversation").is_none());
    }

    #[test]
    fn test_minimal_legacy_index() {
        // Early files carried only id and title
        let json = r#"{"lastAccessed": "x", "conversations": [{"id": "a", "title": "a"}]}"#;
        let index: RootIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.conversations[0].current_folder, FolderPointer::Main);
        assert_eq!(index.conversations[0].order, 0);
    }

    #[test]
    fn test_folder_pointer_normalizes_slashes() {
        assert_eq!(FolderPointer::from("/a/b/"), FolderPointer::Sub("a/b".into()));
        assert_eq!(FolderPointer::from(""), FolderPointer::Main);
        assert_eq!(FolderPointer::from("main").to_string(), "main");
    }
}
