//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dirchat_core::config::OutputFormat;
use std::path::PathBuf;

mod attach;
mod config_cmd;
mod delete;
mod folder;
mod list;
mod new;
mod open;
mod rename;
mod rename_file;
mod rename_message;
mod reorder;
mod rm_message;
mod send;
mod show;

/// dirchat - conversations kept as plain directories
#[derive(Parser, Debug)]
#[command(
    name = "dirchat",
    version,
    about = "Conversations kept as plain directories",
    long_about = "A local-first message store: each conversation is a folder of text and \
                  attachment files, with nested subfolders and a per-folder order index"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Storage root (overrides DIRCHAT_ROOT and config files)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, global = true, value_parser = parse_format)]
    pub format: Option<OutputFormat>,
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    match value.to_ascii_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(format!("unknown format '{other}', expected text or json")),
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List conversations
    List(list::ListArgs),

    /// Create a conversation and make it active
    New(new::NewArgs),

    /// Make a conversation active and reconcile its current folder
    Open(open::OpenArgs),

    /// Show the messages of the current folder
    Show(show::ShowArgs),

    /// Add a text message
    Send(send::SendArgs),

    /// Add a file as an attachment message
    Attach(attach::AttachArgs),

    /// Delete a message
    RmMessage(rm_message::RmMessageArgs),

    /// Rename a text message, merging into an existing one of the same name
    RenameMessage(rename_message::RenameMessageArgs),

    /// Rename an attachment
    RenameFile(rename_file::RenameFileArgs),

    /// Rename a conversation
    Rename(rename::RenameArgs),

    /// Delete a conversation and everything in it
    Delete(delete::DeleteArgs),

    /// Set the conversation order
    Reorder(reorder::ReorderArgs),

    /// Manage subfolders
    Folder(folder::FolderArgs),

    /// Show effective configuration
    Config(config_cmd::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let global = self.global;
        match self.command {
            Commands::List(args) => list::execute(args, &global),
            Commands::New(args) => new::execute(args, &global),
            Commands::Open(args) => open::execute(args, &global),
            Commands::Show(args) => show::execute(args, &global),
            Commands::Send(args) => send::execute(args, &global),
            Commands::Attach(args) => attach::execute(args, &global),
            Commands::RmMessage(args) => rm_message::execute(args, &global),
            Commands::RenameMessage(args) => rename_message::execute(args, &global),
            Commands::RenameFile(args) => rename_file::execute(args, &global),
            Commands::Rename(args) => rename::execute(args, &global),
            Commands::Delete(args) => delete::execute(args, &global),
            Commands::Reorder(args) => reorder::execute(args, &global),
            Commands::Folder(args) => folder::execute(args, &global),
            Commands::Config(args) => config_cmd::execute(args, &global),
        }
    }
}
