//! Show command implementation

use anyhow::Result;
use clap::Args;
use dirchat_core::config::OutputFormat;
use dirchat_core::text::{looks_like_code, truncate_chars};
use dirchat_core::{MessageKind, MessageStore, OrderEntry, StorageBackend};
use serde_json::json;

use super::GlobalArgs;
use crate::util::session::Session;
use crate::util::time::format_timestamp;

/// Show the messages of a conversation's current folder
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Conversation (default: active)
    #[arg(long)]
    conversation: Option<String>,

    /// Show only the last N messages
    #[arg(long)]
    limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the show command
pub fn execute(args: ShowArgs, global: &GlobalArgs) -> Result<()> {
    let format = args.json.then_some(OutputFormat::Json);
    let session = Session::open_with_format(global, format)?;
    let id = session.conversation_id(args.conversation.as_deref())?;
    let conversation = session.registry.get(&id)?;
    let store = session.registry.messages(&id)?;

    let report = store.reconcile()?;
    let mut entries = report.entries.as_slice();
    if let Some(limit) = args.limit {
        entries = &entries[entries.len().saturating_sub(limit)..];
    }

    if session.settings.json_output() {
        let mut output = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut value = serde_json::to_value(entry)?;
            if entry.is_text() {
                value["text"] = json!(read_text_or_missing(&store, entry));
            }
            output.push(value);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} / {}", conversation.id, conversation.current_folder);
    if report.absorbed() > 0 {
        println!("(picked up {} new file(s))", report.absorbed());
    }
    println!();

    let timestamps = session.settings.config.display.timestamps;
    for entry in entries {
        let when = format_timestamp(&entry.timestamp, timestamps);
        match &entry.kind {
            MessageKind::Text => {
                println!("[{when}] {}", entry.id);
                let body = read_text_or_missing(&store, entry);
                if looks_like_code(&body) {
                    for line in body.lines() {
                        println!("    {line}");
                    }
                } else {
                    println!("{body}");
                }
            }
            MessageKind::File { filename } => {
                println!("[{when}] {} file: {}", entry.id, truncate_chars(filename, 80, "..."));
            }
        }
        println!();
    }
    println!("Total: {} message(s)", entries.len());
    Ok(())
}

fn read_text_or_missing<B: StorageBackend + ?Sized>(
    store: &MessageStore<'_, B>,
    entry: &OrderEntry,
) -> String {
    store
        .read_text(&entry.id)
        .unwrap_or_else(|e| format!("[unreadable: {e}]"))
}
