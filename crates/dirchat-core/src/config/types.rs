//! Configuration types

use crate::registry::DEFAULT_CONVERSATION_PREFIX;
use crate::text::DEFAULT_MAX_MESSAGE_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core configuration
    #[serde(default)]
    pub core: CoreConfig,
    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,
    /// Store limits
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Storage root, defaulting to `<home>/.dirchat`
    pub fn storage_root(&self, home_dir: &Path) -> PathBuf {
        self.core
            .root
            .clone()
            .unwrap_or_else(|| home_dir.join(".dirchat"))
    }
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding the conversation folders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Prefix for generated conversation names
    pub conversation_prefix: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            conversation_prefix: DEFAULT_CONVERSATION_PREFIX.to_string(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Output format
    pub format: OutputFormat,
    /// Timestamp format
    pub timestamps: TimestampFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            timestamps: TimestampFormat::Relative,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
}

/// Timestamp display format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// Relative (e.g., "2 minutes ago")
    Relative,
    /// Absolute (e.g., "2:30 PM")
    Absolute,
    /// ISO 8601 (e.g., "2026-02-10T14:30:00.000Z")
    Iso8601,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Largest text message accepted, in bytes
    pub max_message_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}
