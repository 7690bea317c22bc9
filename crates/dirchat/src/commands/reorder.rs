//! Reorder command implementation

use anyhow::Result;
use clap::Args;

use super::GlobalArgs;
use crate::util::session::Session;

/// Set the conversation order
#[derive(Args, Debug)]
pub struct ReorderArgs {
    /// Every conversation id, in the new order
    #[arg(required = true)]
    ids: Vec<String>,
}

/// Execute the reorder command
pub fn execute(args: ReorderArgs, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    session.registry.reorder(&args.ids)?;
    println!("Order: {}", args.ids.join(", "));
    Ok(())
}
