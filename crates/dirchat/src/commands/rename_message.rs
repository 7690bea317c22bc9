//! Text message rename command implementation

use anyhow::Result;
use clap::Args;
use dirchat_core::TextRename;

use super::GlobalArgs;
use crate::util::session::Session;

/// Rename a text message
#[derive(Args, Debug)]
pub struct RenameMessageArgs {
    /// Current message id
    id: String,

    /// New id (the file becomes NEW.txt)
    new: String,

    /// Target conversation (default: active)
    #[arg(long)]
    conversation: Option<String>,
}

/// Execute the rename-message command
pub fn execute(args: RenameMessageArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let store = session.messages(args.conversation.as_deref())?;

    match store.rename_text(&args.id, &args.new)? {
        TextRename::Renamed { entry } => println!("Renamed {} to {}", args.id, entry.id),
        TextRename::Merged { into, .. } => {
            println!("Merged {} into existing message {into}", args.id)
        }
    }
    Ok(())
}
