//! Order index entry schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Suffix of text message payload files
pub const TEXT_SUFFIX: &str = ".txt";

/// One message in a folder's `messages_order.json`
///
/// ```json
/// { "id": "msg-1f0c…", "timestamp": "2026-02-11T14:30:00.000Z", "type": "text" }
/// { "id": "msg-77ab…", "timestamp": "2026-02-11T14:31:00.000Z", "type": "file", "filename": "photo.png" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    /// Unique within the folder; for text messages also the payload file stem
    pub id: String,

    /// ISO 8601 UTC creation time
    pub timestamp: String,

    /// Payload kind, serialized as the `type` tag plus its fields
    #[serde(flatten)]
    pub kind: MessageKind,
}

/// Message payload kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageKind {
    /// Payload is `{id}.txt`
    Text,
    /// Payload is an attachment stored under its own name
    File { filename: String },
}

impl OrderEntry {
    pub fn text(id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            kind: MessageKind::Text,
        }
    }

    pub fn file(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            kind: MessageKind::File {
                filename: filename.into(),
            },
        }
    }

    /// Name of the file holding this entry's payload
    pub fn payload_name(&self) -> String {
        match &self.kind {
            MessageKind::Text => text_payload_name(&self.id),
            MessageKind::File { filename } => filename.clone(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, MessageKind::Text)
    }

    fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

pub(crate) fn text_payload_name(id: &str) -> String {
    format!("{id}{TEXT_SUFFIX}")
}

/// Stable sort by timestamp, oldest first
///
/// Entries whose timestamp does not parse sort before all others; equal
/// timestamps keep their relative order.
pub fn sort_by_timestamp(entries: &mut [OrderEntry]) {
    entries.sort_by_key(|entry| entry.parsed_timestamp());
}
