//! Conversation registry
//!
//! Holds the ordered conversation list and the active selection for one
//! storage root, and keeps `chat_config.json` in step with it. Every
//! mutating operation ends by rewriting the whole root index.
//!
//! Disk is the source of truth for which conversations and subfolders exist;
//! the root index only contributes order, titles and folder pointers, and
//! only for entries that are still present.

use crate::conversation::{rebase_pointer, Conversation};
use crate::error::StoreError;
use crate::messages::MessageStore;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::relocate::{relocate, RelocationReport};
use crate::scan::top_level_dirs;
use crate::schema::{
    now_timestamp, ConversationRecord, FolderPointer, RootIndex, ROOT_INDEX_BACKUP_FILE,
    ROOT_INDEX_FILE,
};
use crate::storage::{put_file, split_handle, validate_name, StorageBackend};
use crate::text::DEFAULT_MAX_MESSAGE_BYTES;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default prefix for generated conversation names
pub const DEFAULT_CONVERSATION_PREFIX: &str = "chat";

/// Conversations under one storage root
#[derive(Debug)]
pub struct Registry<B: StorageBackend> {
    backend: B,
    root: PathBuf,
    conversations: Vec<Conversation>,
    active: Option<String>,
    conversation_prefix: String,
    max_message_bytes: usize,
}

impl<B: StorageBackend> Registry<B> {
    /// Scan `root` and restore order and selection from the root index
    ///
    /// Conversations listed in the index keep their stored order; folders
    /// the index does not know are appended by name. Folder pointers to
    /// subfolders that no longer exist fall back to `main`. The index is
    /// rewritten when it was absent or disagreed with disk.
    pub fn load(backend: B, root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();

        let mut found = Vec::new();
        for dir in top_level_dirs(&backend, &root)? {
            found.push(Conversation::discover(&backend, &dir.name, &dir.path)?);
        }

        let index = read_root_index(&backend, &root)?;
        let mut stale = index.is_none();
        let index = index.unwrap_or_default();

        let mut records: Vec<&ConversationRecord> = index.conversations.iter().collect();
        records.sort_by_key(|record| record.order);

        let mut conversations = Vec::with_capacity(found.len());
        for record in records {
            let Some(pos) = found.iter().position(|c| c.id == record.id) else {
                debug!("Dropping indexed conversation '{}': folder is gone", record.id);
                stale = true;
                continue;
            };
            let mut conversation = found.remove(pos);
            conversation.title = record.title.clone();
            conversation.current_folder = record.current_folder.clone();
            if conversation.validate_current_folder() {
                stale = true;
            }
            conversations.push(conversation);
        }
        if !found.is_empty() {
            stale = true;
            conversations.extend(found);
        }

        let active = index
            .active_conversation
            .filter(|id| conversations.iter().any(|c| &c.id == id))
            .or_else(|| conversations.last().map(|c| c.id.clone()));

        let registry = Self {
            backend,
            root,
            conversations,
            active,
            conversation_prefix: DEFAULT_CONVERSATION_PREFIX.to_string(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        };
        if stale {
            registry.persist()?;
        }
        Ok(registry)
    }

    pub fn with_conversation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.conversation_prefix = prefix.into();
        self
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<&Conversation> {
        let id = self.active.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Conversation, StoreError> {
        self.conversations
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownConversation { id: id.to_string() })
    }

    /// Message store for the current folder of conversation `id`
    pub fn messages(&self, id: &str) -> Result<MessageStore<'_, B>, StoreError> {
        let folder = self.get(id)?.active_folder()?;
        Ok(MessageStore::new(&self.backend, folder).with_max_message_bytes(self.max_message_bytes))
    }

    /// Overwrite the root index with the current state
    pub fn persist(&self) -> Result<(), StoreError> {
        let index = RootIndex {
            last_accessed: now_timestamp(),
            conversations: self
                .conversations
                .iter()
                .enumerate()
                .map(|(order, c)| ConversationRecord {
                    id: c.id.clone(),
                    title: c.title.clone(),
                    current_folder: c.current_folder.clone(),
                    order,
                })
                .collect(),
            active_conversation: self.active.clone(),
        };

        let index_path = self.root.join(ROOT_INDEX_FILE);
        let content = serde_json::to_vec_pretty(&index).map_err(|e| StoreError::Json {
            path: index_path,
            source: e,
        })?;
        put_file(&self.backend, &self.root, ROOT_INDEX_FILE, &content)?;
        Ok(())
    }

    /// Create a conversation folder and make it active
    ///
    /// Without a name, one is generated from the configured prefix and the
    /// current time.
    ///
    /// # Errors
    ///
    /// [`StoreError::PermissionDenied`] when the root is not writable and
    /// [`StoreError::AlreadyExists`] when the name is taken.
    pub fn create_conversation(&mut self, name: Option<&str>) -> Result<&Conversation, StoreError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.generated_name()?,
        };
        validate_name(&name)?;
        if let Some(existing) = self.backend.lookup(&self.root, &name)? {
            return Err(StoreError::AlreadyExists {
                path: existing.path,
            });
        }

        let dir = self.backend.create_dir(&self.root, &name)?;
        let conversation = Conversation::discover(&self.backend, &name, &dir)?;
        info!("Created conversation '{name}'");

        self.conversations.push(conversation);
        self.active = Some(name);
        self.persist()?;

        let index = self.conversations.len() - 1;
        Ok(&self.conversations[index])
    }

    /// Make `id` the active conversation and reconcile its current folder
    pub fn open(&mut self, id: &str) -> Result<ReconcileReport, StoreError> {
        let folder = self.get(id)?.active_folder()?.to_path_buf();
        self.active = Some(id.to_string());
        self.persist()?;
        reconcile(&self.backend, &folder)
    }

    /// Point conversation `id` at another folder and reconcile it
    pub fn select_folder(
        &mut self,
        id: &str,
        pointer: FolderPointer,
    ) -> Result<ReconcileReport, StoreError> {
        let index = self.position(id)?;
        let conversation = &mut self.conversations[index];
        let folder = conversation.folder_path(&pointer)?.to_path_buf();
        conversation.current_folder = pointer;
        self.persist()?;
        reconcile(&self.backend, &folder)
    }

    /// Replace the conversation order; `ids` must name every conversation
    /// exactly once
    pub fn reorder<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<(), StoreError> {
        if ids.len() != self.conversations.len() {
            return Err(StoreError::InvalidReorder {
                reason: format!(
                    "expected {} conversations, got {}",
                    self.conversations.len(),
                    ids.len()
                ),
            });
        }

        let mut seen = HashSet::new();
        let mut reordered = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            if !seen.insert(id) {
                return Err(StoreError::InvalidReorder {
                    reason: format!("'{id}' appears more than once"),
                });
            }
            reordered.push(self.get(id)?.clone());
        }

        self.conversations = reordered;
        self.persist()
    }

    /// Remove a conversation and its folder
    ///
    /// When the active conversation goes, the last remaining one becomes
    /// active; when none remain a fresh conversation is created.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self.position(id)?;
        self.backend.delete_entry(&self.root, id, true)?;
        self.conversations.remove(index);
        info!("Deleted conversation '{id}'");

        if self.active.as_deref() == Some(id) {
            self.active = self.conversations.last().map(|c| c.id.clone());
        }
        if self.conversations.is_empty() {
            self.create_conversation(None)?;
            return Ok(());
        }
        self.persist()
    }

    /// Rename a conversation folder (copy, verify, delete)
    pub fn rename_conversation(
        &mut self,
        id: &str,
        new_name: &str,
    ) -> Result<RelocationReport, StoreError> {
        let index = self.position(id)?;
        if id == new_name {
            return Err(StoreError::AlreadyExists {
                path: self.conversations[index].root.clone(),
            });
        }

        let report = relocate(
            &self.backend,
            &self.conversations[index].root,
            &self.root,
            new_name,
        )?;

        let conversation = &mut self.conversations[index];
        conversation.id = new_name.to_string();
        conversation.title = new_name.to_string();
        conversation.root = report.destination.clone();
        conversation.rescan(&self.backend)?;
        if self.active.as_deref() == Some(id) {
            self.active = Some(new_name.to_string());
        }
        info!("Renamed conversation '{id}' to '{new_name}'");

        self.persist()?;
        Ok(report)
    }

    /// Rename subfolder `path` of conversation `id` within its parent
    pub fn rename_subfolder(
        &mut self,
        id: &str,
        path: &str,
        new_name: &str,
    ) -> Result<RelocationReport, StoreError> {
        let index = self.position(id)?;
        let source = self.sub_folder_path(index, path)?;
        let (parent, _) = split_handle(&source)?;
        let parent = parent.to_path_buf();

        let new_path = match path.rsplit_once('/') {
            Some((parent_key, _)) => format!("{parent_key}/{new_name}"),
            None => {
                reject_main_name(new_name)?;
                new_name.to_string()
            }
        };

        let report = relocate(&self.backend, &source, &parent, new_name)?;
        self.after_subfolder_move(index, path, &new_path)?;
        Ok(report)
    }

    /// Move subfolder `path` of conversation `id` under `new_parent`
    pub fn move_subfolder(
        &mut self,
        id: &str,
        path: &str,
        new_parent: &FolderPointer,
    ) -> Result<RelocationReport, StoreError> {
        let index = self.position(id)?;
        let source = self.sub_folder_path(index, path)?;
        let name = self.conversations[index].sub_folders[path].name.clone();
        let dest_parent = self.conversations[index]
            .folder_path(new_parent)?
            .to_path_buf();

        let new_path = match new_parent.sub_path() {
            Some(parent_key) => format!("{parent_key}/{name}"),
            None => {
                reject_main_name(&name)?;
                name.clone()
            }
        };

        let report = relocate(&self.backend, &source, &dest_parent, &name)?;
        self.after_subfolder_move(index, path, &new_path)?;
        Ok(report)
    }

    /// Create folder `name` under `parent` in conversation `id`; returns
    /// the new folder's path key
    pub fn create_subfolder(
        &mut self,
        id: &str,
        parent: &FolderPointer,
        name: &str,
    ) -> Result<String, StoreError> {
        validate_name(name)?;
        let index = self.position(id)?;
        let parent_dir = self.conversations[index].folder_path(parent)?.to_path_buf();

        let key = match parent.sub_path() {
            Some(parent_key) => format!("{parent_key}/{name}"),
            None => {
                reject_main_name(name)?;
                name.to_string()
            }
        };

        if let Some(existing) = self.backend.lookup(&parent_dir, name)? {
            return Err(StoreError::AlreadyExists {
                path: existing.path,
            });
        }
        self.backend.create_dir(&parent_dir, name)?;
        self.conversations[index].rescan(&self.backend)?;
        debug!("Created folder '{key}' in conversation '{id}'");
        Ok(key)
    }

    /// Delete subfolder `path` and everything below it
    pub fn delete_subfolder(&mut self, id: &str, path: &str) -> Result<(), StoreError> {
        let index = self.position(id)?;
        let dir = self.sub_folder_path(index, path)?;
        let (parent, name) = split_handle(&dir)?;
        self.backend.delete_entry(parent, name, true)?;

        self.conversations[index].rescan(&self.backend)?;
        debug!("Deleted folder '{path}' in conversation '{id}'");
        self.persist()
    }

    fn after_subfolder_move(
        &mut self,
        index: usize,
        old_path: &str,
        new_path: &str,
    ) -> Result<(), StoreError> {
        let conversation = &mut self.conversations[index];
        rebase_pointer(&mut conversation.current_folder, old_path, new_path);
        conversation.rescan(&self.backend)?;
        debug!(
            "Moved folder '{old_path}' to '{new_path}' in conversation '{}'",
            conversation.id
        );
        self.persist()
    }

    fn sub_folder_path(&self, index: usize, path: &str) -> Result<PathBuf, StoreError> {
        let conversation = &self.conversations[index];
        conversation
            .folder_path(&FolderPointer::Sub(path.to_string()))
            .map(Path::to_path_buf)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.conversations
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownConversation { id: id.to_string() })
    }

    fn generated_name(&self) -> Result<String, StoreError> {
        let stamp = now_timestamp().replace([':', '.'], "-");
        let base = format!("{}_{stamp}", self.conversation_prefix);
        if self.backend.lookup(&self.root, &base)?.is_none() {
            return Ok(base);
        }
        for n in 2.. {
            let candidate = format!("{base}_{n}");
            if self.backend.lookup(&self.root, &candidate)?.is_none() {
                return Ok(candidate);
            }
        }
        Ok(base)
    }
}

/// A top-level subfolder named `main` could not be told apart from the root
/// folder pointer
fn reject_main_name(name: &str) -> Result<(), StoreError> {
    if name == FolderPointer::MAIN {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: "'main' is reserved for the conversation's root folder".to_string(),
        });
    }
    Ok(())
}

/// Load the root index; `None` when absent, empty or unreadable as JSON
///
/// Unreadable content is saved to [`ROOT_INDEX_BACKUP_FILE`] first, since the
/// caller rebuilds the index from disk and overwrites it.
fn read_root_index<B: StorageBackend>(
    backend: &B,
    root: &Path,
) -> Result<Option<RootIndex>, StoreError> {
    let index_path = root.join(ROOT_INDEX_FILE);
    let content = match backend.read_file(&index_path) {
        Ok(content) => content,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice(&content) {
        Ok(index) => Ok(Some(index)),
        Err(e) => {
            let backup = put_file(backend, root, ROOT_INDEX_BACKUP_FILE, &content)?;
            warn!(
                "Ignoring unreadable {}: {e}. Previous content saved to {}",
                index_path.display(),
                backup.display()
            );
            Ok(None)
        }
    }
}
