//! Configuration discovery and resolution

use super::types::{Config, OutputFormat, TimestampFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Environment variable overriding the storage root
pub const ROOT_ENV: &str = "DIRCHAT_ROOT";

/// Environment variable overriding the generated-name prefix
pub const PREFIX_ENV: &str = "DIRCHAT_PREFIX";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// One config file; only the keys it sets take part in the merge
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    core: CoreLayer,
    display: DisplayLayer,
    store: StoreLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoreLayer {
    root: Option<PathBuf>,
    conversation_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DisplayLayer {
    format: Option<OutputFormat>,
    timestamps: Option<TimestampFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreLayer {
    max_message_bytes: Option<usize>,
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override storage root
    pub root: Option<PathBuf>,
    /// Override output format
    pub format: Option<OutputFormat>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables
/// 3. Repo-local config (.dirchat.toml in current dir or up to git root)
/// 4. Global config (~/.config/dirchat/config.toml)
/// 5. Defaults
///
/// A config file that fails to parse is logged and skipped. A relative
/// `root` in a config file is taken relative to that file's directory.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    // 4. Global config
    let global_config_path = home_dir.join(".config/dirchat/config.toml");
    if global_config_path.exists() {
        match load_config_file(&global_config_path) {
            Ok(file_config) => merge_config(&mut config, file_config, &global_config_path),
            Err(e) => warn!("Failed to parse global config at {global_config_path:?}: {e}"),
        }
    }

    // 3. Repo-local config
    if let Some(repo_config) = find_repo_local_config(current_dir) {
        match load_config_file(&repo_config) {
            Ok(file_config) => merge_config(&mut config, file_config, &repo_config),
            Err(e) => warn!("Failed to parse repo config at {repo_config:?}: {e}"),
        }
    }

    // 2. Environment
    apply_env_overrides(&mut config, current_dir);

    // 1. Command line
    apply_cli_overrides(&mut config, overrides, current_dir);

    Ok(config)
}

/// Find repo-local config file
///
/// Searches current directory and parent directories up to git root
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(".dirchat.toml");
        if config_path.exists() {
            return Some(config_path);
        }

        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

fn load_config_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let layer: ConfigLayer = toml::from_str(&contents)?;
    Ok(layer)
}

/// Merge the keys a config file sets into base config
fn merge_config(base: &mut Config, file: ConfigLayer, file_path: &Path) {
    if let Some(root) = file.core.root {
        let base_dir = file_path.parent().unwrap_or(Path::new(""));
        base.core.root = Some(absolutize(base_dir, root));
    }
    if let Some(prefix) = file.core.conversation_prefix {
        base.core.conversation_prefix = prefix;
    }

    if let Some(format) = file.display.format {
        base.display.format = format;
    }
    if let Some(timestamps) = file.display.timestamps {
        base.display.timestamps = timestamps;
    }

    if let Some(max_message_bytes) = file.store.max_message_bytes {
        base.store.max_message_bytes = max_message_bytes;
    }
}

fn apply_env_overrides(config: &mut Config, current_dir: &Path) {
    if let Ok(root) = std::env::var(ROOT_ENV)
        && !root.trim().is_empty()
    {
        config.core.root = Some(absolutize(current_dir, PathBuf::from(root.trim())));
    }

    if let Ok(prefix) = std::env::var(PREFIX_ENV)
        && !prefix.trim().is_empty()
    {
        config.core.conversation_prefix = prefix.trim().to_string();
    }
}

fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides, current_dir: &Path) {
    if let Some(ref root) = overrides.root {
        config.core.root = Some(absolutize(current_dir, root.clone()));
    }

    if let Some(format) = overrides.format {
        config.display.format = format;
    }
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
