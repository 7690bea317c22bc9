//! `std::fs` implementation of the storage backend

use super::{DirEntry, EntryKind, StorageBackend};
use crate::error::StoreError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Backend over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl StorageBackend for FsBackend {
    fn enumerate(&self, dir: &Path) -> Result<Vec<DirEntry>, StoreError> {
        let read_dir = fs::read_dir(dir).map_err(|e| StoreError::from_io(dir, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| StoreError::from_io(dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| StoreError::from_io(&entry.path(), e))?;

            // Symlinks and special files are not part of the store
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping non UTF-8 entry in {}", dir.display());
                continue;
            };

            entries.push(DirEntry {
                name,
                kind,
                path: entry.path(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_dir(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError> {
        let path = parent.join(name);
        match fs::create_dir(&path) {
            Ok(()) => Ok(path),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(path),
            Err(e) => Err(StoreError::from_io(&path, e)),
        }
    }

    fn create_file(&self, parent: &Path, name: &str) -> Result<PathBuf, StoreError> {
        let path = parent.join(name);
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::from_io(&path, e))?;
        Ok(path)
    }

    fn read_file(&self, file: &Path) -> Result<Vec<u8>, StoreError> {
        fs::read(file).map_err(|e| StoreError::from_io(file, e))
    }

    fn write_file(&self, file: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut handle = fs::File::create(file).map_err(|e| StoreError::from_io(file, e))?;
        handle
            .write_all(bytes)
            .map_err(|e| StoreError::from_io(file, e))?;
        handle.sync_all().map_err(|e| StoreError::from_io(file, e))?;
        Ok(())
    }

    fn delete_entry(&self, parent: &Path, name: &str, recursive: bool) -> Result<(), StoreError> {
        let path = parent.join(name);
        let metadata = fs::symlink_metadata(&path).map_err(|e| StoreError::from_io(&path, e))?;

        let result = if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_dir(&path)
            }
        } else {
            fs::remove_file(&path)
        };

        result.map_err(|e| StoreError::from_io(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_enumerate_sorted_with_kinds() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"b").unwrap();
        fs::write(temp_dir.path().join("a.png"), b"a").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let entries = FsBackend.enumerate(temp_dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.txt", "sub"]);
        assert!(entries[0].is_file());
        assert!(entries[2].is_dir());
    }

    #[test]
    fn test_enumerate_missing_dir_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = FsBackend
            .enumerate(&temp_dir.path().join("missing"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_file_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("keep.txt"), b"existing").unwrap();

        let handle = FsBackend.create_file(temp_dir.path(), "keep.txt").unwrap();
        assert_eq!(fs::read(handle).unwrap(), b"existing");
    }

    #[test]
    fn test_write_file_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let handle = FsBackend.create_file(temp_dir.path(), "x.txt").unwrap();
        FsBackend.write_file(&handle, b"first version").unwrap();
        FsBackend.write_file(&handle, b"second").unwrap();
        assert_eq!(FsBackend.read_file(&handle).unwrap(), b"second");
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = FsBackend
            .read_file(&temp_dir.path().join("gone.txt"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_dir_reuses_existing() {
        let temp_dir = TempDir::new().unwrap();
        let first = FsBackend.create_dir(temp_dir.path(), "conv").unwrap();
        let second = FsBackend.create_dir(temp_dir.path(), "conv").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_delete_entry_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("conv");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/a.txt"), b"a").unwrap();

        assert!(FsBackend.delete_entry(temp_dir.path(), "conv", false).is_err());
        FsBackend.delete_entry(temp_dir.path(), "conv", true).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_lookup() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();

        assert!(FsBackend.lookup(temp_dir.path(), "a.txt").unwrap().is_some());
        assert!(FsBackend.lookup(temp_dir.path(), "b.txt").unwrap().is_none());
    }
}
