//! Conversation rename command implementation

use anyhow::Result;
use clap::Args;

use super::GlobalArgs;
use crate::util::session::Session;

/// Rename a conversation folder
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Current conversation id
    id: String,

    /// New name
    new: String,
}

/// Execute the rename command
pub fn execute(args: RenameArgs, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    let report = session.registry.rename_conversation(&args.id, &args.new)?;
    println!(
        "Renamed '{}' to '{}' ({} file(s), {} folder(s), {} bytes copied)",
        args.id, args.new, report.files, report.directories, report.bytes
    );
    Ok(())
}
