//! Message log reconciliation
//!
//! Makes a folder's `messages_order.json` an exact, duplicate-free reflection
//! of the files in that folder. Any file the index does not know about is
//! taken to be a new message:
//!
//! - `*.txt` files are orphaned text messages. Their content moves to a file
//!   named after a freshly minted id and the original is deleted.
//! - Anything else is an attachment and is recorded under its existing name.
//!
//! The index is only rewritten when something changed, so reconciling an
//! unchanged folder twice performs no writes the second time.

use crate::error::StoreError;
use crate::schema::{
    now_timestamp, sort_by_timestamp, text_payload_name, OrderEntry, ORDER_INDEX_FILE, TEXT_SUFFIX,
};
use crate::storage::{put_file, validate_name, StorageBackend};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of reconciling one folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Final order list, oldest first
    pub entries: Vec<OrderEntry>,

    /// Orphaned `.txt` files absorbed as text messages
    pub absorbed_text: usize,

    /// Untracked files absorbed as attachments
    pub absorbed_files: usize,

    /// Later occurrences of a repeated id removed from the index
    pub duplicates_dropped: usize,

    /// Recorded payload names with no file on disk. Reported, not removed.
    pub missing: Vec<String>,

    /// Recorded payload names that are not a plain name inside the folder.
    /// Dropped from the index; no file is touched.
    pub rejected: Vec<String>,

    /// Whether the order index was rewritten
    pub wrote_index: bool,
}

impl ReconcileReport {
    pub fn absorbed(&self) -> usize {
        self.absorbed_text + self.absorbed_files
    }
}

/// Reconcile `folder` and return its order list
///
/// # Errors
///
/// Fails on unreadable folders or payloads and on an order index that is not
/// valid JSON. An absent index is not an error.
pub fn reconcile<B: StorageBackend + ?Sized>(
    backend: &B,
    folder: &Path,
) -> Result<ReconcileReport, StoreError> {
    let (mut entries, rejected) = load_order_index(backend, folder)?;

    // Step 1: file set (directories are subfolders, not messages)
    let files: BTreeSet<String> = backend
        .enumerate(folder)?
        .into_iter()
        .filter(|entry| entry.is_file() && entry.name != ORDER_INDEX_FILE)
        .map(|entry| entry.name)
        .collect();

    // Step 2: drop repeated ids, first occurrence wins
    let before = entries.len();
    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.id.clone()));
    let duplicates_dropped = before - entries.len();

    // Step 3: recorded set
    let recorded: HashSet<String> = entries.iter().map(OrderEntry::payload_name).collect();
    let missing: Vec<String> = entries
        .iter()
        .map(OrderEntry::payload_name)
        .filter(|name| !files.contains(name))
        .collect();

    let mut report = ReconcileReport {
        duplicates_dropped,
        missing,
        rejected,
        ..Default::default()
    };

    // Step 4: absorb untracked files
    let mut taken: HashSet<String> = entries.iter().map(|entry| entry.id.clone()).collect();
    for name in files.iter().filter(|name| !recorded.contains(*name)) {
        if name.ends_with(TEXT_SUFFIX) {
            let content = backend.read_file(&folder.join(name))?;
            let id = mint_message_id(|candidate| {
                taken.contains(candidate) || files.contains(&text_payload_name(candidate))
            });
            put_file(backend, folder, &text_payload_name(&id), &content)?;
            backend.delete_entry(folder, name, false)?;

            debug!("Absorbed orphaned text file {name} as message {id}");
            taken.insert(id.clone());
            entries.push(OrderEntry::text(id, now_timestamp()));
            report.absorbed_text += 1;
        } else {
            let id = mint_message_id(|candidate| taken.contains(candidate));

            debug!("Absorbed untracked file {name} as message {id}");
            taken.insert(id.clone());
            entries.push(OrderEntry::file(id, now_timestamp(), name.clone()));
            report.absorbed_files += 1;
        }
    }

    // Step 5: timestamp order
    sort_by_timestamp(&mut entries);

    // Step 6: persist only on change
    if report.absorbed() > 0 || report.duplicates_dropped > 0 || !report.rejected.is_empty() {
        write_order_index(backend, folder, &entries)?;
        report.wrote_index = true;
    }

    report.entries = entries;
    Ok(report)
}

/// Load a folder's order index; an absent or empty index is an empty list
///
/// Entries whose payload name could resolve outside `folder` are skipped.
pub fn read_order_index<B: StorageBackend + ?Sized>(
    backend: &B,
    folder: &Path,
) -> Result<Vec<OrderEntry>, StoreError> {
    load_order_index(backend, folder).map(|(entries, _)| entries)
}

/// Parsed index entries, plus the payload names of entries that were skipped
fn load_order_index<B: StorageBackend + ?Sized>(
    backend: &B,
    folder: &Path,
) -> Result<(Vec<OrderEntry>, Vec<String>), StoreError> {
    let index_path = folder.join(ORDER_INDEX_FILE);
    let content = match backend.read_file(&index_path) {
        Ok(content) => content,
        Err(e) if e.is_not_found() => return Ok((Vec::new(), Vec::new())),
        Err(e) => return Err(e),
    };

    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut entries: Vec<OrderEntry> =
        serde_json::from_slice(&content).map_err(|e| StoreError::Json {
            path: index_path,
            source: e,
        })?;

    let mut rejected = Vec::new();
    entries.retain(|entry| {
        let name = entry.payload_name();
        match validate_name(&name) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring message {} in {}: {e}", entry.id, folder.display());
                rejected.push(name);
                false
            }
        }
    });
    Ok((entries, rejected))
}

/// Overwrite a folder's order index with `entries`
pub fn write_order_index<B: StorageBackend + ?Sized>(
    backend: &B,
    folder: &Path,
    entries: &[OrderEntry],
) -> Result<(), StoreError> {
    let content = serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Json {
        path: folder.join(ORDER_INDEX_FILE),
        source: e,
    })?;
    put_file(backend, folder, ORDER_INDEX_FILE, &content)?;
    Ok(())
}

/// Mint a message id for which `taken` returns false
pub(crate) fn mint_message_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = format!("msg-{}", Uuid::new_v4().simple());
        if !taken(&id) {
            return id;
        }
    }
}
