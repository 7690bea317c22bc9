//! Conversation delete command implementation

use anyhow::Result;
use clap::Args;

use super::GlobalArgs;
use crate::util::session::Session;

/// Delete a conversation folder
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Conversation id
    id: String,
}

/// Execute the delete command
pub fn execute(args: DeleteArgs, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    session.registry.delete(&args.id)?;
    println!("Deleted conversation '{}'", args.id);
    if let Some(active) = session.registry.active() {
        println!("Active conversation: {}", active.id);
    }
    Ok(())
}
