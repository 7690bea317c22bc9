//! Send command implementation

use anyhow::{bail, Result};
use clap::Args;
use dirchat_core::text::preview_line;
use std::io::Read;

use super::GlobalArgs;
use crate::util::session::Session;

/// Add a text message to the current folder
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message text
    #[arg(conflicts_with = "stdin")]
    text: Option<String>,

    /// Read the message text from stdin
    #[arg(long)]
    stdin: bool,

    /// Target conversation (default: active)
    #[arg(long)]
    conversation: Option<String>,
}

/// Execute the send command
pub fn execute(args: SendArgs, global: &GlobalArgs) -> Result<()> {
    let text = match (args.text, args.stdin) {
        (Some(text), _) => text,
        (None, true) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        (None, false) => bail!("Provide the message text or pass --stdin"),
    };

    let session = Session::open(global)?;
    let store = session.messages(args.conversation.as_deref())?;
    let entry = store.append_text(&text)?;
    println!("Sent {}: {}", entry.id, preview_line(&text, 60));
    Ok(())
}
