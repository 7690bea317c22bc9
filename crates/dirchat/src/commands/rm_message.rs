//! Message delete command implementation

use anyhow::Result;
use clap::Args;

use super::GlobalArgs;
use crate::util::session::Session;

/// Delete a message from the current folder
#[derive(Args, Debug)]
pub struct RmMessageArgs {
    /// Message id
    id: String,

    /// Target conversation (default: active)
    #[arg(long)]
    conversation: Option<String>,
}

/// Execute the rm-message command
pub fn execute(args: RmMessageArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let store = session.messages(args.conversation.as_deref())?;
    let removed = store.delete(&args.id)?;
    println!("Deleted {}", removed.id);
    Ok(())
}
