//! Attachment rename command implementation

use anyhow::Result;
use clap::Args;

use super::GlobalArgs;
use crate::util::session::Session;

/// Rename an attachment
#[derive(Args, Debug)]
pub struct RenameFileArgs {
    /// Current file name
    name: String,

    /// New file name
    new: String,

    /// Target conversation (default: active)
    #[arg(long)]
    conversation: Option<String>,
}

/// Execute the rename-file command
pub fn execute(args: RenameFileArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let store = session.messages(args.conversation.as_deref())?;
    let entry = store.rename_attachment(&args.name, &args.new)?;
    println!("Renamed {} to {}", args.name, entry.payload_name());
    Ok(())
}
