//! New command implementation

use anyhow::Result;
use clap::Args;

use super::GlobalArgs;
use crate::util::session::Session;

/// Create a conversation
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Folder name; generated from the configured prefix and the time when omitted
    name: Option<String>,
}

/// Execute the new command
pub fn execute(args: NewArgs, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    let conversation = session.registry.create_conversation(args.name.as_deref())?;
    println!("Created conversation '{}'", conversation.id);
    Ok(())
}
