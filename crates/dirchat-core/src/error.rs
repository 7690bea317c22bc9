//! Error types for store operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during store operations
///
/// Variants follow how a caller is expected to react: access problems are
/// surfaced immediately, not-found conditions are distinct from I/O
/// failures, and multi-step folder operations report exactly which side of
/// the copy survived.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage root (or an entry below it) refused access
    #[error("Permission denied on {path}")]
    PermissionDenied { path: PathBuf },

    /// An expected file or directory is missing
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// Destination already exists during a non-merging operation
    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse or serialize JSON
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Copy phase failed; the partial destination was cleaned up and the
    /// source is untouched
    #[error("Copy of {source_dir} to {destination} failed: {cause}")]
    CopyFailed {
        source_dir: PathBuf,
        destination: PathBuf,
        cause: Box<StoreError>,
    },

    /// Copy was verified but the source could not be removed; both trees
    /// are present with identical content
    #[error("Copied {source_dir} to {destination} but could not remove the source: {cause}")]
    SourceRetained {
        source_dir: PathBuf,
        destination: PathBuf,
        cause: Box<StoreError>,
    },

    /// Copied bytes do not hash to the source bytes
    #[error("Verification failed for {path}: expected hash {expected}, found {actual}")]
    VerificationFailed {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Rejected entry name
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Rejected message content
    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },

    /// Rejected folder move (e.g. into its own subtree)
    #[error("Cannot move {source_dir} to {destination}: {reason}")]
    InvalidMove {
        source_dir: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    /// No conversation with this id in the registry
    #[error("Conversation '{id}' not found")]
    UnknownConversation { id: String },

    /// No subfolder with this path in the conversation
    #[error("Folder '{path}' not found in conversation '{conversation}'")]
    UnknownFolder { conversation: String, path: String },

    /// No order entry with this id in the folder
    #[error("Message '{id}' not found in {folder}")]
    UnknownMessage { folder: PathBuf, id: String },

    /// Operation applies to the other message kind
    #[error("Message '{id}' is not a {expected} message")]
    WrongMessageKind { id: String, expected: &'static str },

    /// Reorder request is not a permutation of the current conversations
    #[error("Invalid reorder: {reason}")]
    InvalidReorder { reason: String },
}

impl StoreError {
    /// Wrap an `io::Error` for `path`, mapping the kinds callers distinguish
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => StoreError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied { .. })
    }

    /// True for name collisions on non-merging operations
    pub fn is_collision(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_maps_kinds() {
        let path = Path::new("/tmp/x");
        assert!(StoreError::from_io(path, io::Error::from(io::ErrorKind::NotFound)).is_not_found());
        assert!(
            StoreError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied))
                .is_permission_denied()
        );
        assert!(
            StoreError::from_io(path, io::Error::from(io::ErrorKind::AlreadyExists))
                .is_collision()
        );
        assert!(matches!(
            StoreError::from_io(path, io::Error::other("boom")),
            StoreError::Io { .. }
        ));
    }

    #[test]
    fn test_copy_failed_message_names_both_sides() {
        let err = StoreError::CopyFailed {
            source_dir: PathBuf::from("/root/a"),
            destination: PathBuf::from("/root/b"),
            cause: Box::new(StoreError::NotFound {
                path: PathBuf::from("/root/a/x.txt"),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("/root/a"));
        assert!(msg.contains("/root/b"));
        assert!(msg.contains("x.txt"));
    }
}
