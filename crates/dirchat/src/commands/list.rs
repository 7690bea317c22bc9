//! List command implementation

use anyhow::Result;
use clap::Args;
use dirchat_core::config::OutputFormat;
use serde_json::json;

use super::GlobalArgs;
use crate::util::session::Session;

/// List conversations
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the list command
pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_with_format(global, args.json.then_some(OutputFormat::Json))?;
    let registry = &session.registry;
    let active = registry.active().map(|c| c.id.as_str());

    if session.settings.json_output() {
        let conversations: Vec<_> = registry
            .conversations()
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "title": c.title,
                    "currentFolder": c.current_folder.to_string(),
                    "subFolders": c.sub_folders.keys().collect::<Vec<_>>(),
                    "active": Some(c.id.as_str()) == active,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if registry.conversations().is_empty() {
        println!("No conversations in {}", registry.root().display());
        return Ok(());
    }

    for conversation in registry.conversations() {
        let marker = if Some(conversation.id.as_str()) == active {
            "*"
        } else {
            " "
        };
        let folders = conversation.sub_folders.len();
        println!(
            "{marker} {} (folder: {}, {folders} subfolder(s))",
            conversation.id, conversation.current_folder
        );
    }
    Ok(())
}
