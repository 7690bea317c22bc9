//! Conversation entity

use crate::error::StoreError;
use crate::scan::scan_tree;
use crate::schema::FolderPointer;
use crate::storage::StorageBackend;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A nested folder discovered by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    /// Last path component
    pub name: String,
    /// Directory handle
    pub path: PathBuf,
}

/// Slash-joined relative path -> folder
pub type SubFolders = BTreeMap<String, FolderRef>;

/// A top-level conversation folder with its subfolder index
///
/// `sub_folders` is only ever replaced wholesale by [`Conversation::rescan`],
/// never patched entry by entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    /// Folder name under the storage root
    pub id: String,
    pub title: String,
    /// Directory handle of the conversation folder
    pub root: PathBuf,
    pub sub_folders: SubFolders,
    pub current_folder: FolderPointer,
}

impl Conversation {
    /// Build a conversation by scanning `root` for subfolders
    pub fn discover<B: StorageBackend + ?Sized>(
        backend: &B,
        id: &str,
        root: &Path,
    ) -> Result<Self, StoreError> {
        let conversation = Self {
            id: id.to_string(),
            title: id.to_string(),
            root: root.to_path_buf(),
            sub_folders: scan_tree(backend, root)?,
            current_folder: FolderPointer::Main,
        };
        conversation.warn_reserved_subfolder();
        Ok(conversation)
    }

    /// Whether a top-level subfolder is named `main`. Such a folder exists on
    /// disk but no folder pointer can select it.
    pub fn has_reserved_subfolder(&self) -> bool {
        self.sub_folders.contains_key(FolderPointer::MAIN)
    }

    fn warn_reserved_subfolder(&self) {
        if self.has_reserved_subfolder() {
            warn!(
                "Conversation '{}': subfolder '{}' is reserved and cannot be selected",
                self.id,
                FolderPointer::MAIN
            );
        }
    }

    /// Rebuild `sub_folders` from disk; a pointer to a vanished folder
    /// falls back to the root folder
    pub fn rescan<B: StorageBackend + ?Sized>(&mut self, backend: &B) -> Result<(), StoreError> {
        self.sub_folders = scan_tree(backend, &self.root)?;
        self.warn_reserved_subfolder();
        self.validate_current_folder();
        Ok(())
    }

    /// Reset `current_folder` to main when it names a missing subfolder.
    /// Returns true when the pointer was reset.
    pub fn validate_current_folder(&mut self) -> bool {
        if let FolderPointer::Sub(path) = &self.current_folder
            && !self.sub_folders.contains_key(path)
        {
            tracing::debug!(
                "Conversation '{}': folder '{}' no longer exists, using main",
                self.id,
                path
            );
            self.current_folder = FolderPointer::Main;
            return true;
        }
        false
    }

    /// Directory handle for a pointer
    pub fn folder_path(&self, pointer: &FolderPointer) -> Result<&Path, StoreError> {
        match pointer {
            FolderPointer::Main => Ok(&self.root),
            FolderPointer::Sub(path) => self
                .sub_folders
                .get(path)
                .map(|folder| folder.path.as_path())
                .ok_or_else(|| StoreError::UnknownFolder {
                    conversation: self.id.clone(),
                    path: path.clone(),
                }),
        }
    }

    /// Directory handle of the active folder
    pub fn active_folder(&self) -> Result<&Path, StoreError> {
        self.folder_path(&self.current_folder)
    }
}

/// Rewrite `pointer` after the subfolder at `old` moved to `new`.
/// Covers the folder itself and anything nested below it.
pub(crate) fn rebase_pointer(pointer: &mut FolderPointer, old: &str, new: &str) {
    let FolderPointer::Sub(current) = pointer else {
        return;
    };

    let rebased = if current == old {
        new.to_string()
    } else if let Some(rest) = current
        .strip_prefix(old)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        format!("{new}/{rest}")
    } else {
        return;
    };

    *pointer = FolderPointer::Sub(rebased);
}
