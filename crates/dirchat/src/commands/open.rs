//! Open command implementation

use anyhow::Result;
use clap::Args;

use super::GlobalArgs;
use crate::util::session::Session;

/// Make a conversation active
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Conversation id
    id: String,
}

/// Execute the open command
pub fn execute(args: OpenArgs, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    let report = session.registry.open(&args.id)?;
    let folder = &session.registry.get(&args.id)?.current_folder;

    println!(
        "Opened '{}' (folder: {folder}, {} message(s))",
        args.id,
        report.entries.len()
    );
    if report.absorbed() > 0 {
        println!("Picked up {} new file(s)", report.absorbed());
    }
    for missing in &report.missing {
        eprintln!("Warning: {missing} is listed but missing");
    }
    Ok(())
}
