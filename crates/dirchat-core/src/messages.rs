//! Per-folder message operations
//!
//! Every mutation reads the whole order index, changes it in memory and
//! writes it back in full. Payload files are always written before the index
//! refers to them, so an interrupted append leaves an untracked file that the
//! next [`reconcile`] absorbs.

use crate::error::StoreError;
use crate::reconcile::{mint_message_id, read_order_index, reconcile, write_order_index, ReconcileReport};
use crate::schema::{now_timestamp, text_payload_name, MessageKind, OrderEntry};
use crate::storage::{put_file, validate_name, StorageBackend};
use crate::text::{validate_message_text, DEFAULT_MAX_MESSAGE_BYTES};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Separator placed between merged text bodies
pub const MERGE_SEPARATOR: &str = "\n\n";

/// Outcome of renaming a text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRename {
    /// The message now lives under the new id
    Renamed { entry: OrderEntry },

    /// The destination already existed; its content is now the destination
    /// body, a blank line, then the source body. The source message is gone.
    Merged { into: String, content: String },
}

/// Message operations on one folder
pub struct MessageStore<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
    folder: PathBuf,
    max_message_bytes: usize,
}

impl<'a, B: StorageBackend + ?Sized> MessageStore<'a, B> {
    pub fn new(backend: &'a B, folder: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            folder: folder.into(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Bring the order index in line with the folder contents
    pub fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        reconcile(self.backend, &self.folder)
    }

    /// Current order index, as persisted
    pub fn entries(&self) -> Result<Vec<OrderEntry>, StoreError> {
        read_order_index(self.backend, &self.folder)
    }

    /// Store a new text message
    pub fn append_text(&self, text: &str) -> Result<OrderEntry, StoreError> {
        validate_message_text(text, self.max_message_bytes)
            .map_err(|reason| StoreError::InvalidMessage { reason })?;

        let entries = self.entries()?;
        let files = self.file_names()?;
        let taken: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        let id = mint_message_id(|candidate| {
            taken.contains(candidate) || files.contains(&text_payload_name(candidate))
        });

        put_file(self.backend, &self.folder, &text_payload_name(&id), text.as_bytes())?;

        let entry = OrderEntry::text(id, now_timestamp());
        self.append(entry.clone())?;
        Ok(entry)
    }

    /// Store an attachment and record it
    ///
    /// An existing file with the same name is never overwritten; the
    /// attachment is stored as `stem (N).ext` instead.
    pub fn attach(&self, filename: &str, bytes: &[u8]) -> Result<OrderEntry, StoreError> {
        validate_name(filename)?;

        let entries = self.entries()?;
        let mut taken_names = self.file_names()?;
        taken_names.extend(entries.iter().map(OrderEntry::payload_name));
        let stored_name = free_name(filename, &taken_names);

        put_file(self.backend, &self.folder, &stored_name, bytes)?;

        let taken_ids: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        let id = mint_message_id(|candidate| taken_ids.contains(candidate));
        let entry = OrderEntry::file(id, now_timestamp(), stored_name);
        self.append(entry.clone())?;
        Ok(entry)
    }

    /// Record an entry whose payload is already written
    pub fn append(&self, entry: OrderEntry) -> Result<(), StoreError> {
        self.update_order(|entries| {
            if entries.iter().any(|existing| existing.id == entry.id) {
                return Err(StoreError::AlreadyExists {
                    path: self.folder.join(entry.payload_name()),
                });
            }
            debug!("Appending message {} to {}", entry.id, self.folder.display());
            entries.push(entry);
            Ok(())
        })
    }

    /// Remove a message
    ///
    /// A payload that cannot be deleted is logged and left behind; the index
    /// is updated regardless.
    pub fn delete(&self, id: &str) -> Result<OrderEntry, StoreError> {
        self.update_order(|entries| {
            let index = self.position(entries, id)?;
            let removed = entries.remove(index);

            let payload = removed.payload_name();
            if let Err(e) = self.backend.delete_entry(&self.folder, &payload, false) {
                warn!("Could not delete payload {payload} of message {id}: {e}");
            }
            Ok(removed)
        })
    }

    /// Rename a text message to `new_id`, merging into an existing
    /// `{new_id}.txt` instead of overwriting it
    pub fn rename_text(&self, id: &str, new_id: &str) -> Result<TextRename, StoreError> {
        validate_name(new_id)?;
        let dest_name = text_payload_name(new_id);
        validate_name(&dest_name)?;

        let mut entries = self.entries()?;
        let index = self.position(&entries, id)?;
        if !entries[index].is_text() {
            return Err(StoreError::WrongMessageKind {
                id: id.to_string(),
                expected: "text",
            });
        }
        if new_id == id {
            return Ok(TextRename::Renamed {
                entry: entries[index].clone(),
            });
        }

        let source_name = text_payload_name(id);
        let source_content = self.backend.read_file(&self.folder.join(&source_name))?;

        let outcome = match self.backend.lookup(&self.folder, &dest_name)? {
            Some(dest) if dest.is_file() => {
                let dest_recorded = entries.iter().any(|e| e.payload_name() == dest_name);
                if !dest_recorded && entries.iter().any(|e| e.id == new_id) {
                    return Err(StoreError::AlreadyExists { path: dest.path });
                }

                let mut merged = self.backend.read_file(&dest.path)?;
                merged.extend_from_slice(MERGE_SEPARATOR.as_bytes());
                merged.extend_from_slice(&source_content);
                self.backend.write_file(&dest.path, &merged)?;

                if dest_recorded {
                    entries.remove(index);
                } else {
                    entries[index].id = new_id.to_string();
                }
                debug!("Merged message {id} into {new_id}");

                TextRename::Merged {
                    into: new_id.to_string(),
                    content: String::from_utf8_lossy(&merged).into_owned(),
                }
            }
            Some(dest) => {
                return Err(StoreError::AlreadyExists { path: dest.path });
            }
            None => {
                if entries.iter().any(|e| e.id == new_id) {
                    return Err(StoreError::AlreadyExists {
                        path: self.folder.join(&dest_name),
                    });
                }
                put_file(self.backend, &self.folder, &dest_name, &source_content)?;
                entries[index].id = new_id.to_string();
                TextRename::Renamed {
                    entry: entries[index].clone(),
                }
            }
        };

        write_order_index(self.backend, &self.folder, &entries)?;
        if let Err(e) = self.backend.delete_entry(&self.folder, &source_name, false) {
            warn!("Could not delete renamed payload {source_name}: {e}");
        }
        Ok(outcome)
    }

    /// Rename an attachment file; refuses to overwrite an existing file
    pub fn rename_attachment(
        &self,
        filename: &str,
        new_name: &str,
    ) -> Result<OrderEntry, StoreError> {
        validate_name(new_name)?;

        let mut entries = self.entries()?;
        let index = entries
            .iter()
            .position(|e| matches!(&e.kind, MessageKind::File { filename: f } if f == filename))
            .ok_or_else(|| StoreError::UnknownMessage {
                folder: self.folder.clone(),
                id: filename.to_string(),
            })?;
        if new_name == filename {
            return Ok(entries[index].clone());
        }
        if let Some(existing) = self.backend.lookup(&self.folder, new_name)? {
            return Err(StoreError::AlreadyExists {
                path: existing.path,
            });
        }
        if entries.iter().any(|e| e.payload_name() == new_name) {
            return Err(StoreError::AlreadyExists {
                path: self.folder.join(new_name),
            });
        }

        let bytes = self.backend.read_file(&self.folder.join(filename))?;
        put_file(self.backend, &self.folder, new_name, &bytes)?;

        entries[index].kind = MessageKind::File {
            filename: new_name.to_string(),
        };
        write_order_index(self.backend, &self.folder, &entries)?;

        if let Err(e) = self.backend.delete_entry(&self.folder, filename, false) {
            warn!("Could not delete renamed attachment {filename}: {e}");
        }
        Ok(entries[index].clone())
    }

    /// Body of a text message
    pub fn read_text(&self, id: &str) -> Result<String, StoreError> {
        let name = text_payload_name(id);
        validate_name(&name)?;
        let bytes = self.backend.read_file(&self.folder.join(name))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Bytes of an attachment
    pub fn read_attachment(&self, filename: &str) -> Result<Vec<u8>, StoreError> {
        validate_name(filename)?;
        self.backend.read_file(&self.folder.join(filename))
    }

    /// Read-modify-write of the order index
    fn update_order<T>(
        &self,
        modify_fn: impl FnOnce(&mut Vec<OrderEntry>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut entries = self.entries()?;
        let result = modify_fn(&mut entries)?;
        write_order_index(self.backend, &self.folder, &entries)?;
        Ok(result)
    }

    fn position(&self, entries: &[OrderEntry], id: &str) -> Result<usize, StoreError> {
        entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::UnknownMessage {
                folder: self.folder.clone(),
                id: id.to_string(),
            })
    }

    fn file_names(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .backend
            .enumerate(&self.folder)?
            .into_iter()
            .filter(|entry| entry.is_file())
            .map(|entry| entry.name)
            .collect())
    }
}

/// `name` if free, else the first free `stem (N).ext`
fn free_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };

    (1..)
        .map(|n| format!("{stem} ({n}){ext}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ORDER_INDEX_FILE;
    use crate::storage::FsBackend;
    use std::fs;
    use tempfile::TempDir;

    fn write_index(dir: &Path, entries: &[OrderEntry]) {
        fs::write(
            dir.join(ORDER_INDEX_FILE),
            serde_json::to_string_pretty(entries).unwrap(),
        )
        .unwrap();
    }

    fn store(dir: &TempDir) -> MessageStore<'static, FsBackend> {
        static BACKEND: FsBackend = FsBackend;
        MessageStore::new(&BACKEND, dir.path())
    }

    #[test]
    fn test_append_text_writes_payload_and_index() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let entry = store.append_text("hello there").unwrap();

        assert!(entry.is_text());
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(format!("{}.txt", entry.id))).unwrap(),
            "hello there"
        );
        assert_eq!(store.entries().unwrap(), vec![entry]);
    }

    #[test]
    fn test_append_text_rejects_null_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let err = store(&temp_dir).append_text("bad\0text").unwrap_err();
        assert!(matches!(err, StoreError::InvalidMessage { .. }));
        assert!(!temp_dir.path().join(ORDER_INDEX_FILE).exists());
    }

    #[test]
    fn test_append_text_respects_size_limit() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir).with_max_message_bytes(4);
        assert!(store.append_text("12345").is_err());
        assert!(store.append_text("1234").is_ok());
    }

    #[test]
    fn test_append_duplicate_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let entry = store.append_text("one").unwrap();

        let err = store.append(entry).unwrap_err();
        assert!(err.is_collision());
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_attach_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let first = store.attach("photo.png", b"first").unwrap();
        let second = store.attach("photo.png", b"second").unwrap();

        assert_eq!(first.payload_name(), "photo.png");
        assert_eq!(second.payload_name(), "photo (1).png");
        assert_eq!(store.read_attachment("photo.png").unwrap(), b"first");
        assert_eq!(store.read_attachment("photo (1).png").unwrap(), b"second");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_delete_removes_entry_and_payload() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let keep = store.append_text("keep").unwrap();
        let gone = store.append_text("gone").unwrap();

        let removed = store.delete(&gone.id).unwrap();

        assert_eq!(removed.id, gone.id);
        assert!(!temp_dir.path().join(format!("{}.txt", gone.id)).exists());
        assert_eq!(store.entries().unwrap(), vec![keep]);
    }

    #[test]
    fn test_delete_tolerates_missing_payload() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let entry = store.append_text("soon missing").unwrap();
        fs::remove_file(temp_dir.path().join(format!("{}.txt", entry.id))).unwrap();

        store.delete(&entry.id).unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_id() {
        let temp_dir = TempDir::new().unwrap();
        let err = store(&temp_dir).delete("nope").unwrap_err();
        assert!(matches!(err, StoreError::UnknownMessage { .. }));
    }

    #[test]
    fn test_rename_text_plain() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let entry = store.append_text("body").unwrap();

        let outcome = store.rename_text(&entry.id, "greeting").unwrap();

        let TextRename::Renamed { entry: renamed } = outcome else {
            panic!("expected plain rename");
        };
        assert_eq!(renamed.id, "greeting");
        assert_eq!(renamed.timestamp, entry.timestamp);
        assert_eq!(store.read_text("greeting").unwrap(), "body");
        assert!(!temp_dir.path().join(format!("{}.txt", entry.id)).exists());
        assert_eq!(store.entries().unwrap(), vec![renamed]);
    }

    #[test]
    fn test_rename_text_merges_on_collision() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let a = store.append_text("foo").unwrap();
        store.rename_text(&a.id, "a").unwrap();
        let b = store.append_text("bar").unwrap();

        let outcome = store.rename_text(&b.id, "a").unwrap();

        assert_eq!(
            outcome,
            TextRename::Merged {
                into: "a".to_string(),
                content: "foo\n\nbar".to_string()
            }
        );
        assert_eq!(store.read_text("a").unwrap(), "foo\n\nbar");
        assert!(!temp_dir.path().join(format!("{}.txt", b.id)).exists());
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a");
    }

    #[test]
    fn test_rename_text_adopts_unrecorded_destination() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let entry = store.append_text("second").unwrap();
        fs::write(temp_dir.path().join("stray.txt"), "first").unwrap();

        store.rename_text(&entry.id, "stray").unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "stray");
        assert_eq!(store.read_text("stray").unwrap(), "first\n\nsecond");
        assert!(!store.reconcile().unwrap().wrote_index);
    }

    #[test]
    fn test_rename_text_missing_payload_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let entry = store.append_text("x").unwrap();
        fs::remove_file(temp_dir.path().join(format!("{}.txt", entry.id))).unwrap();

        assert!(store.rename_text(&entry.id, "y").unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_text_on_attachment_is_wrong_kind() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let entry = store.attach("clip.mp4", b"mp4").unwrap();

        let err = store.rename_text(&entry.id, "clip").unwrap_err();
        assert!(matches!(err, StoreError::WrongMessageKind { .. }));
    }

    #[test]
    fn test_rename_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let entry = store.attach("IMG_0001.jpg", b"jpeg").unwrap();

        let renamed = store.rename_attachment("IMG_0001.jpg", "beach.jpg").unwrap();

        assert_eq!(renamed.id, entry.id);
        assert_eq!(renamed.payload_name(), "beach.jpg");
        assert_eq!(store.read_attachment("beach.jpg").unwrap(), b"jpeg");
        assert!(!temp_dir.path().join("IMG_0001.jpg").exists());
    }

    #[test]
    fn test_rename_attachment_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.attach("a.png", b"a").unwrap();
        store.attach("b.png", b"b").unwrap();

        let err = store.rename_attachment("a.png", "b.png").unwrap_err();
        assert!(err.is_collision());
        assert_eq!(store.read_attachment("a.png").unwrap(), b"a");
        assert_eq!(store.read_attachment("b.png").unwrap(), b"b");
    }

    #[test]
    fn test_rename_text_refuses_id_held_by_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_index(
            dir,
            &[
                OrderEntry::file("x", "2026-02-11T10:00:00.000Z", "photo.png"),
                OrderEntry::text("m1", "2026-02-11T11:00:00.000Z"),
            ],
        );
        fs::write(dir.join("photo.png"), b"png").unwrap();
        fs::write(dir.join("m1.txt"), "source").unwrap();
        fs::write(dir.join("x.txt"), "stray").unwrap();
        let store = store(&temp_dir);

        let err = store.rename_text("m1", "x").unwrap_err();

        assert!(err.is_collision());
        assert_eq!(fs::read_to_string(dir.join("x.txt")).unwrap(), "stray");
        assert_eq!(fs::read_to_string(dir.join("m1.txt")).unwrap(), "source");
        let ids: Vec<_> = store.entries().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["x", "m1"]);
    }

    #[test]
    fn test_rename_attachment_refuses_name_recorded_by_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_index(
            dir,
            &[
                OrderEntry::file("a", "2026-02-11T10:00:00.000Z", "p.png"),
                OrderEntry::file("b", "2026-02-11T11:00:00.000Z", "q.png"),
            ],
        );
        fs::write(dir.join("p.png"), b"p").unwrap();
        let store = store(&temp_dir);

        let err = store.rename_attachment("p.png", "q.png").unwrap_err();

        assert!(err.is_collision());
        assert!(dir.join("p.png").exists());
        assert!(!dir.join("q.png").exists());
        let payloads: Vec<_> = store.entries().unwrap().iter().map(OrderEntry::payload_name).collect();
        assert_eq!(payloads, vec!["p.png", "q.png"]);
    }

    #[test]
    fn test_delete_never_touches_files_outside_folder() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("chat");
        fs::create_dir(&folder).unwrap();
        fs::write(temp_dir.path().join("victim.bin"), b"keep me").unwrap();
        write_index(
            &folder,
            &[OrderEntry::file("a", "2026-02-11T10:00:00.000Z", "../victim.bin")],
        );
        static BACKEND: FsBackend = FsBackend;
        let store = MessageStore::new(&BACKEND, &folder);

        let err = store.delete("a").unwrap_err();

        assert!(matches!(err, StoreError::UnknownMessage { .. }));
        assert!(temp_dir.path().join("victim.bin").exists());
    }

    #[test]
    fn test_read_text_rejects_path_ids() {
        let temp_dir = TempDir::new().unwrap();
        let err = store(&temp_dir).read_text("../secret").unwrap_err();
        assert!(matches!(err, StoreError::InvalidName { .. }));
    }

    #[test]
    fn test_free_name() {
        let taken: HashSet<String> = ["a.png", "a (1).png", "README"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(free_name("b.png", &taken), "b.png");
        assert_eq!(free_name("a.png", &taken), "a (2).png");
        assert_eq!(free_name("README", &taken), "README (1)");
    }
}
