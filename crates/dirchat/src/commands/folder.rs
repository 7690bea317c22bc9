//! Folder command implementation

use anyhow::Result;
use clap::{Args, Subcommand};
use dirchat_core::FolderPointer;

use super::GlobalArgs;
use crate::util::session::Session;

/// Manage the subfolders of a conversation
#[derive(Args, Debug)]
pub struct FolderArgs {
    /// Target conversation (default: active)
    #[arg(long, global = true)]
    conversation: Option<String>,

    #[command(subcommand)]
    command: FolderCommand,
}

#[derive(Subcommand, Debug)]
enum FolderCommand {
    /// Create a folder, e.g. `photos` or `photos/day1`
    New {
        /// Slash-separated folder path
        path: String,
    },

    /// Make a folder current (`main` for the conversation root)
    Select {
        path: String,
    },

    /// Rename a folder in place
    Rename {
        path: String,
        /// New last path component
        new: String,
    },

    /// Move a folder under another folder (`main` for the conversation root)
    Move {
        path: String,
        new_parent: String,
    },

    /// Delete a folder and everything in it
    Rm {
        path: String,
    },
}

/// Execute the folder command
pub fn execute(args: FolderArgs, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.conversation_id(args.conversation.as_deref())?;
    let registry = &mut session.registry;

    match args.command {
        FolderCommand::New { path } => {
            let pointer = FolderPointer::from(path);
            let full = pointer.to_string();
            let (parent, name) = match full.rsplit_once('/') {
                Some((parent, name)) => (FolderPointer::from(parent), name),
                None => (FolderPointer::Main, full.as_str()),
            };
            let key = registry.create_subfolder(&id, &parent, name)?;
            println!("Created folder '{key}' in '{id}'");
        }
        FolderCommand::Select { path } => {
            let pointer = FolderPointer::from(path);
            let report = registry.select_folder(&id, pointer.clone())?;
            println!(
                "Selected '{pointer}' in '{id}' ({} message(s))",
                report.entries.len()
            );
        }
        FolderCommand::Rename { path, new } => {
            registry.rename_subfolder(&id, &path, &new)?;
            println!("Renamed folder '{path}' to '{new}' in '{id}'");
        }
        FolderCommand::Move { path, new_parent } => {
            let parent = FolderPointer::from(new_parent);
            registry.move_subfolder(&id, &path, &parent)?;
            println!("Moved folder '{path}' under '{parent}' in '{id}'");
        }
        FolderCommand::Rm { path } => {
            registry.delete_subfolder(&id, &path)?;
            println!("Deleted folder '{path}' from '{id}'");
        }
    }
    Ok(())
}
