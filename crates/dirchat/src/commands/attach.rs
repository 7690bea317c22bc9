//! Attach command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::GlobalArgs;
use crate::util::session::Session;

/// Copy a file into the current folder as an attachment message
#[derive(Args, Debug)]
pub struct AttachArgs {
    /// File to attach
    path: PathBuf,

    /// Store under this name instead of the file's own
    #[arg(long)]
    name: Option<String>,

    /// Target conversation (default: active)
    #[arg(long)]
    conversation: Option<String>,
}

/// Execute the attach command
pub fn execute(args: AttachArgs, global: &GlobalArgs) -> Result<()> {
    let filename = match args.name {
        Some(name) => name,
        None => args
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .with_context(|| format!("Cannot take a file name from {}", args.path.display()))?,
    };
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("Cannot read {}", args.path.display()))?;

    let session = Session::open(global)?;
    let store = session.messages(args.conversation.as_deref())?;
    let entry = store.attach(&filename, &bytes)?;
    println!("Attached {} as {}", entry.payload_name(), entry.id);
    Ok(())
}
