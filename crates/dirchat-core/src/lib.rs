//! Core library for dirchat
//!
//! A local-first store for conversations kept as plain directories. Each
//! conversation is a folder holding one file per message plus a
//! `messages_order.json` index; folders may nest. The storage root carries a
//! `chat_config.json` index with conversation order and selection.
//!
//! The directories may be edited by anything outside this crate between
//! sessions. Every folder is therefore reconciled against its index before
//! its messages are trusted, see [`reconcile()`].
//!
//! Layering, leaves first:
//! - [`storage`]: the backend seam (create/read/write/delete, nothing else)
//! - [`scan`]: recursive subfolder discovery
//! - [`reconcile`](mod@reconcile): order-index vs. file-set reconciliation
//! - [`messages`]: append, delete and rename of individual messages
//! - [`relocate`](mod@relocate): copy-then-delete folder rename/move
//! - [`registry`]: the conversation list and root index

pub mod config;
pub mod conversation;
pub mod error;
pub mod hash;
pub mod home;
pub mod logging;
pub mod messages;
pub mod reconcile;
pub mod registry;
pub mod relocate;
pub mod scan;
pub mod schema;
pub mod storage;
pub mod text;

pub use conversation::{Conversation, FolderRef};
pub use error::StoreError;
pub use messages::{MessageStore, TextRename};
pub use reconcile::{reconcile, ReconcileReport};
pub use registry::Registry;
pub use relocate::{relocate, CopiedRelocation, Relocation, RelocationReport};
pub use schema::{
    ConversationRecord, FolderPointer, MessageKind, OrderEntry, RootIndex, ORDER_INDEX_FILE,
    ROOT_INDEX_FILE,
};
pub use storage::{DirEntry, EntryKind, FsBackend, StorageBackend};
