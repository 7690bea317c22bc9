//! On-disk schema types
//!
//! Two JSON files make up the persisted metadata:
//! - `messages_order.json` in every conversation folder and subfolder: an
//!   array of [`OrderEntry`], array order is display order
//! - `chat_config.json` at the storage root: a [`RootIndex`]

mod order_entry;
mod root_index;

pub use order_entry::{sort_by_timestamp, MessageKind, OrderEntry, TEXT_SUFFIX};
pub(crate) use order_entry::text_payload_name;
pub use root_index::{ConversationRecord, FolderPointer, RootIndex};

use chrono::{SecondsFormat, Utc};

/// Per-folder order index filename
pub const ORDER_INDEX_FILE: &str = "messages_order.json";

/// Storage-root index filename
pub const ROOT_INDEX_FILE: &str = "chat_config.json";

/// Copy of an unparseable root index, kept before it is rebuilt
pub const ROOT_INDEX_BACKUP_FILE: &str = "chat_config.json.bak";

/// Current time as an ISO 8601 UTC timestamp with millisecond precision
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
