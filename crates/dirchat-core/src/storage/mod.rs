//! Storage backend seam
//!
//! The store only ever needs six primitives from the directory tree it lives
//! in: enumerate a directory, create a directory, create a file, read a file,
//! overwrite a file, and delete an entry. There is no rename, no lock and no
//! multi-step commit; everything above this module is written against that
//! constraint.
//!
//! [`FsBackend`] is the production implementation. Tests wrap it to inject
//! failures at specific steps.

mod fs;

pub use fs::FsBackend;

use crate::error::StoreError;
use crate::schema::{ORDER_INDEX_FILE, ROOT_INDEX_FILE};
use std::path::{Path, PathBuf};

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry returned by [`StorageBackend::enumerate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name within its parent
    pub name: String,
    pub kind: EntryKind,
    /// Full handle to the entry, usable with the other backend calls
    pub path: PathBuf,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Capability over a directory tree
///
/// Paths act as opaque handles: a path returned by one call may be passed to
/// another, and callers never build handles outside the tree they were given.
/// A denied operation surfaces as [`StoreError::PermissionDenied`]; a missing
/// entry as [`StoreError::NotFound`].
pub trait StorageBackend {
    /// List the files and directories directly inside `dir`, sorted by name
    fn enumerate(&self, dir: &Path) -> Result<Vec<DirEntry>, StoreError>;

    /// Create directory `name` inside `parent`; an existing directory is reused
    fn create_dir(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError>;

    /// Create an empty file `name` inside `parent` unless it already exists
    fn create_file(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError>;

    /// Read a whole file
    fn read_file(&self, file: &Path) -> Result<Vec<u8>, StoreError>;

    /// Replace the whole content of a file
    fn write_file(&self, file: &Path, bytes: &[u8]) -> Result<(), StoreError>;

    /// Delete entry `name` inside `parent`; directories need `recursive`
    /// unless they are empty
    fn delete_entry(&self, parent: &Path, name: &str, recursive: bool) -> Result<(), StoreError>;

    /// Find a single entry by name
    fn lookup(&self, parent: &Path, name: &str) -> Result<Option<DirEntry>, StoreError> {
        Ok(self
            .enumerate(parent)?
            .into_iter()
            .find(|entry| entry.name == name))
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn enumerate(&self, dir: &Path) -> Result<Vec<DirEntry>, StoreError> {
        (**self).enumerate(dir)
    }

    fn create_dir(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError> {
        (**self).create_dir(parent, name)
    }

    fn create_file(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError> {
        (**self).create_file(parent, name)
    }

    fn read_file(&self, file: &Path) -> Result<Vec<u8>, StoreError> {
        (**self).read_file(file)
    }

    fn write_file(&self, file: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write_file(file, bytes)
    }

    fn delete_entry(&self, parent: &Path, name: &str, recursive: bool) -> Result<(), StoreError> {
        (**self).delete_entry(parent, name, recursive)
    }

    fn lookup(&self, parent: &Path, name: &str) -> Result<Option<DirEntry>, StoreError> {
        (**self).lookup(parent, name)
    }
}

/// Reject names that cannot be a single entry inside a folder
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.contains('\0') {
        Some("name contains a null byte")
    } else if name == ORDER_INDEX_FILE || name == ROOT_INDEX_FILE {
        Some("name is reserved for an index file")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Split a handle into `(parent, name)` for [`StorageBackend::delete_entry`]
pub(crate) fn split_handle(path: &Path) -> Result<(&Path, &str), StoreError> {
    let parent = path.parent();
    let name = path.file_name().and_then(|n| n.to_str());
    match (parent, name) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(StoreError::InvalidName {
            name: path.display().to_string(),
            reason: "handle has no parent directory".to_string(),
        }),
    }
}

/// Write `bytes` to a (possibly new) file `name` inside `parent`
pub(crate) fn put_file<B: StorageBackend + ?Sized>(
    backend: &B,
    parent: &Path,
    name: &str,
    bytes: &[u8],
) -> Result<PathBuf, StoreError> {
    let handle = backend.create_file(parent, name)?;
    backend.write_file(&handle, bytes)?;
    Ok(handle)
}
