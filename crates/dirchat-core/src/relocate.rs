//! Copy-then-delete folder relocation
//!
//! The storage backend has no rename, so moving a folder is two phases with
//! a recovery point in between:
//!
//! 1. [`Relocation::copy`] recreates the source tree under the destination
//!    and verifies every copied file by hash. On failure the partial
//!    destination is removed and the source is untouched.
//! 2. [`CopiedRelocation::commit`] deletes the source. If that fails both
//!    trees remain, with identical content, and the caller gets
//!    [`StoreError::SourceRetained`].
//!
//! A destination that already exists is refused during planning. Folders
//! are never merged.

use crate::error::StoreError;
use crate::hash::compute_hash;
use crate::storage::{put_file, split_handle, validate_name, StorageBackend};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Counts for a finished copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    /// Directory handle of the relocated folder
    pub destination: PathBuf,
}

/// A checked, not yet started relocation
#[derive(Debug)]
pub struct Relocation<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
    source: PathBuf,
    dest_parent: PathBuf,
    dest_name: String,
}

impl<'a, B: StorageBackend + ?Sized> Relocation<'a, B> {
    /// Check that `source` can become `dest_parent/dest_name`
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidName`] for an unusable `dest_name`
    /// - [`StoreError::NotFound`] when `source` is not a directory
    /// - [`StoreError::AlreadyExists`] when the destination exists
    /// - [`StoreError::InvalidMove`] when the destination is inside `source`
    pub fn plan(
        backend: &'a B,
        source: &Path,
        dest_parent: &Path,
        dest_name: &str,
    ) -> Result<Self, StoreError> {
        validate_name(dest_name)?;

        let (source_parent, source_name) = split_handle(source)?;
        match backend.lookup(source_parent, source_name)? {
            Some(entry) if entry.is_dir() => {}
            _ => {
                return Err(StoreError::NotFound {
                    path: source.to_path_buf(),
                });
            }
        }

        let destination = dest_parent.join(dest_name);
        if destination.starts_with(source) {
            return Err(StoreError::InvalidMove {
                source_dir: source.to_path_buf(),
                destination,
                reason: "destination is inside the source folder".to_string(),
            });
        }
        if let Some(existing) = backend.lookup(dest_parent, dest_name)? {
            return Err(StoreError::AlreadyExists {
                path: existing.path,
            });
        }

        Ok(Self {
            backend,
            source: source.to_path_buf(),
            dest_parent: dest_parent.to_path_buf(),
            dest_name: dest_name.to_string(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> PathBuf {
        self.dest_parent.join(&self.dest_name)
    }

    /// Phase 1: copy and verify the whole tree
    ///
    /// On failure the partial destination is removed (best effort) and the
    /// error is wrapped in [`StoreError::CopyFailed`].
    pub fn copy(self) -> Result<CopiedRelocation<'a, B>, StoreError> {
        let mut report = RelocationReport::default();

        let copied = self
            .backend
            .create_dir(&self.dest_parent, &self.dest_name)
            .and_then(|destination| {
                report.destination = destination.clone();
                copy_tree(self.backend, &self.source, &destination, &mut report)
            });

        if let Err(cause) = copied {
            if let Err(e) = self
                .backend
                .delete_entry(&self.dest_parent, &self.dest_name, true)
                && !e.is_not_found()
            {
                warn!(
                    "Could not clean up partial copy at {}: {e}",
                    self.destination().display()
                );
            }
            return Err(StoreError::CopyFailed {
                source_dir: self.source.clone(),
                destination: self.destination(),
                cause: Box::new(cause),
            });
        }

        debug!(
            "Copied {} to {} ({} files, {} directories, {} bytes)",
            self.source.display(),
            report.destination.display(),
            report.files,
            report.directories,
            report.bytes
        );

        Ok(CopiedRelocation {
            backend: self.backend,
            source: self.source,
            report,
        })
    }
}

/// Recovery point: source and destination both exist with identical content
#[derive(Debug)]
pub struct CopiedRelocation<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
    source: PathBuf,
    report: RelocationReport,
}

impl<B: StorageBackend + ?Sized> CopiedRelocation<'_, B> {
    pub fn report(&self) -> &RelocationReport {
        &self.report
    }

    /// Phase 2: delete the source tree
    pub fn commit(self) -> Result<RelocationReport, StoreError> {
        let (parent, name) = split_handle(&self.source)?;
        self.backend
            .delete_entry(parent, name, true)
            .map_err(|cause| StoreError::SourceRetained {
                source_dir: self.source.clone(),
                destination: self.report.destination.clone(),
                cause: Box::new(cause),
            })?;
        Ok(self.report)
    }

    /// Drop the copy and keep the source
    pub fn abort(self) -> Result<(), StoreError> {
        let (parent, name) = split_handle(&self.report.destination)?;
        self.backend.delete_entry(parent, name, true)
    }
}

/// Move `source` to `dest_parent/dest_name` through both phases
pub fn relocate<B: StorageBackend + ?Sized>(
    backend: &B,
    source: &Path,
    dest_parent: &Path,
    dest_name: &str,
) -> Result<RelocationReport, StoreError> {
    Relocation::plan(backend, source, dest_parent, dest_name)?
        .copy()?
        .commit()
}

fn copy_tree<B: StorageBackend + ?Sized>(
    backend: &B,
    from: &Path,
    to: &Path,
    report: &mut RelocationReport,
) -> Result<(), StoreError> {
    for entry in backend.enumerate(from)? {
        if entry.is_dir() {
            let child = backend.create_dir(to, &entry.name)?;
            copy_tree(backend, &entry.path, &child, report)?;
            report.directories += 1;
            continue;
        }

        let bytes = backend.read_file(&entry.path)?;
        let handle = put_file(backend, to, &entry.name, &bytes)?;
        let expected = compute_hash(&bytes);
        let actual = compute_hash(&backend.read_file(&handle)?);
        if actual != expected {
            return Err(StoreError::VerificationFailed {
                path: handle,
                expected,
                actual,
            });
        }
        report.files += 1;
        report.bytes += bytes.len() as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DirEntry, FsBackend};
    use std::fs;
    use tempfile::TempDir;

    /// FsBackend with one failing path for a chosen call
    struct Faulty {
        fail_read: Option<PathBuf>,
        fail_delete: Option<PathBuf>,
    }

    impl StorageBackend for Faulty {
        fn enumerate(&self, dir: &Path) -> Result<Vec<DirEntry>, StoreError> {
            FsBackend.enumerate(dir)
        }
        fn create_dir(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError> {
            FsBackend.create_dir(parent, name)
        }
        fn create_file(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError> {
            FsBackend.create_file(parent, name)
        }
        fn read_file(&self, file: &Path) -> Result<Vec<u8>, StoreError> {
            if self.fail_read.as_deref() == Some(file) {
                return Err(StoreError::PermissionDenied {
                    path: file.to_path_buf(),
                });
            }
            FsBackend.read_file(file)
        }
        fn write_file(&self, file: &Path, bytes: &[u8]) -> Result<(), StoreError> {
            FsBackend.write_file(file, bytes)
        }
        fn delete_entry(&self, parent: &Path, name: &str, recursive: bool) -> Result<(), StoreError> {
            if self.fail_delete.as_deref() == Some(parent.join(name).as_path()) {
                return Err(StoreError::PermissionDenied {
                    path: parent.join(name),
                });
            }
            FsBackend.delete_entry(parent, name, recursive)
        }
    }

    fn sample_tree(root: &Path) -> PathBuf {
        let source = root.join("trip");
        fs::create_dir_all(source.join("photos/day1")).unwrap();
        fs::write(source.join("messages_order.json"), "[]").unwrap();
        fs::write(source.join("note.txt"), "hello").unwrap();
        fs::write(source.join("photos/day1/a.jpg"), [0u8, 1, 2, 3]).unwrap();
        source
    }

    #[test]
    fn test_relocate_moves_whole_tree() {
        let temp_dir = TempDir::new().unwrap();
        let source = sample_tree(temp_dir.path());

        let report = relocate(&FsBackend, &source, temp_dir.path(), "vacation").unwrap();

        let dest = temp_dir.path().join("vacation");
        assert_eq!(report.destination, dest);
        assert_eq!(report.files, 3);
        assert_eq!(report.directories, 2);
        assert_eq!(report.bytes, 2 + 5 + 4);
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(dest.join("note.txt")).unwrap(), "hello");
        assert_eq!(fs::read(dest.join("photos/day1/a.jpg")).unwrap(), [0u8, 1, 2, 3]);
    }

    #[test]
    fn test_plan_refuses_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = sample_tree(temp_dir.path());
        fs::create_dir(temp_dir.path().join("taken")).unwrap();

        let err = Relocation::plan(&FsBackend, &source, temp_dir.path(), "taken").unwrap_err();

        assert!(err.is_collision());
        assert!(source.join("note.txt").exists());
        assert_eq!(fs::read_dir(temp_dir.path().join("taken")).unwrap().count(), 0);
    }

    #[test]
    fn test_plan_refuses_move_into_own_subtree() {
        let temp_dir = TempDir::new().unwrap();
        let source = sample_tree(temp_dir.path());

        let err =
            Relocation::plan(&FsBackend, &source, &source.join("photos"), "trip").unwrap_err();
        assert!(matches!(err, StoreError::InvalidMove { .. }));
    }

    #[test]
    fn test_plan_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let err = Relocation::plan(
            &FsBackend,
            &temp_dir.path().join("ghost"),
            temp_dir.path(),
            "x",
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_copy_failure_cleans_destination_and_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = sample_tree(temp_dir.path());
        let backend = Faulty {
            fail_read: Some(source.join("photos/day1/a.jpg")),
            fail_delete: None,
        };

        let err = relocate(&backend, &source, temp_dir.path(), "vacation").unwrap_err();

        assert!(matches!(err, StoreError::CopyFailed { .. }));
        assert!(!temp_dir.path().join("vacation").exists());
        assert_eq!(fs::read_to_string(source.join("note.txt")).unwrap(), "hello");
        assert!(source.join("photos/day1/a.jpg").exists());
    }

    #[test]
    fn test_commit_failure_retains_both_trees() {
        let temp_dir = TempDir::new().unwrap();
        let source = sample_tree(temp_dir.path());
        let backend = Faulty {
            fail_read: None,
            fail_delete: Some(source.clone()),
        };

        let err = relocate(&backend, &source, temp_dir.path(), "vacation").unwrap_err();

        assert!(matches!(err, StoreError::SourceRetained { .. }));
        let dest = temp_dir.path().join("vacation");
        for file in ["messages_order.json", "note.txt", "photos/day1/a.jpg"] {
            assert_eq!(fs::read(source.join(file)).unwrap(), fs::read(dest.join(file)).unwrap());
        }
    }

    #[test]
    fn test_abort_drops_copy() {
        let temp_dir = TempDir::new().unwrap();
        let source = sample_tree(temp_dir.path());

        let copied = Relocation::plan(&FsBackend, &source, temp_dir.path(), "vacation")
            .unwrap()
            .copy()
            .unwrap();
        assert!(temp_dir.path().join("vacation/note.txt").exists());
        copied.abort().unwrap();

        assert!(!temp_dir.path().join("vacation").exists());
        assert!(source.join("note.txt").exists());
    }
}
