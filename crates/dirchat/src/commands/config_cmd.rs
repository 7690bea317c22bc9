//! Config command implementation

use anyhow::Result;
use clap::Args;
use dirchat_core::config::{PREFIX_ENV, ROOT_ENV};
use serde_json::json;

use super::GlobalArgs;
use crate::util::session::Settings;

/// Show effective configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the config command
pub fn execute(args: ConfigArgs, global: &GlobalArgs) -> Result<()> {
    let settings = Settings::resolve(global, None)?;
    let config = &settings.config;

    let global_config_path = settings.home_dir.join(".config/dirchat/config.toml");
    let repo_config_path = settings.current_dir.join(".dirchat.toml");
    let global_exists = global_config_path.exists();
    let repo_exists = repo_config_path.exists();

    let file_source = if repo_exists {
        "repo_config"
    } else if global_exists {
        "global_config"
    } else {
        "default"
    };
    let root_source = if global.root.is_some() {
        "cli"
    } else if env_is_set(ROOT_ENV) {
        "env"
    } else {
        file_source
    };
    let prefix_source = if env_is_set(PREFIX_ENV) {
        "env"
    } else {
        file_source
    };

    let root = settings.storage_root();

    if args.json || settings.json_output() {
        let output = json!({
            "root": {
                "value": root.display().to_string(),
                "source": root_source,
            },
            "conversationPrefix": {
                "value": config.core.conversation_prefix,
                "source": prefix_source,
            },
            "display": config.display,
            "store": config.store,
            "configFiles": {
                "global": {
                    "path": global_config_path.display().to_string(),
                    "exists": global_exists,
                },
                "repo": {
                    "path": repo_config_path.display().to_string(),
                    "exists": repo_exists,
                }
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Configuration:");
        println!("  root: {} (from {})", root.display(), format_source(root_source));
        println!(
            "  conversation_prefix: {} (from {})",
            config.core.conversation_prefix,
            format_source(prefix_source)
        );
        println!("  max_message_bytes: {}", config.store.max_message_bytes);
        println!();
        println!("Config files:");
        let global_status = if global_exists { "(found)" } else { "(not found)" };
        println!("  Global: {} {global_status}", global_config_path.display());
        let repo_status = if repo_exists { "(found)" } else { "(not found)" };
        println!("  Repo: {} {repo_status}", repo_config_path.display());
    }

    Ok(())
}

fn env_is_set(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| !v.trim().is_empty())
}

/// Format source name for display
fn format_source(source: &str) -> String {
    match source {
        "cli" => "--root".to_string(),
        "env" => "environment".to_string(),
        "repo_config" => "repo .dirchat.toml".to_string(),
        "global_config" => "~/.config/dirchat/config.toml".to_string(),
        _ => source.to_string(),
    }
}
