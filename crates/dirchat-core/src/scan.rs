//! Folder tree scanner
//!
//! Read-only discovery of nested directories. Files are ignored here; they
//! belong to the reconciler.

use crate::conversation::{FolderRef, SubFolders};
use crate::error::StoreError;
use crate::storage::{DirEntry, StorageBackend};
use std::path::Path;

/// Index every directory transitively nested below `dir`
///
/// Keys are slash-joined paths relative to `dir` with no leading or trailing
/// slash (`"photos"`, `"photos/day1"`). Any traversal failure fails the
/// whole scan; a partial index is never returned.
pub fn scan_tree<B: StorageBackend + ?Sized>(
    backend: &B,
    dir: &Path,
) -> Result<SubFolders, StoreError> {
    let mut folders = SubFolders::new();
    scan_into(backend, dir, "", &mut folders)?;
    Ok(folders)
}

fn scan_into<B: StorageBackend + ?Sized>(
    backend: &B,
    dir: &Path,
    prefix: &str,
    folders: &mut SubFolders,
) -> Result<(), StoreError> {
    for entry in backend.enumerate(dir)? {
        if !entry.is_dir() {
            continue;
        }

        let key = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };

        scan_into(backend, &entry.path, &key, folders)?;
        folders.insert(
            key,
            FolderRef {
                name: entry.name,
                path: entry.path,
            },
        );
    }
    Ok(())
}

/// Directories directly inside `root`: the conversation folders
pub fn top_level_dirs<B: StorageBackend + ?Sized>(
    backend: &B,
    root: &Path,
) -> Result<Vec<DirEntry>, StoreError> {
    Ok(backend
        .enumerate(root)?
        .into_iter()
        .filter(DirEntry::is_dir)
        .collect())
}
