//! Home directory resolution
//!
//! The home directory anchors the global config file
//! (`~/.config/dirchat/config.toml`) and the default storage root
//! (`~/.dirchat`).
//!
//! # Precedence
//!
//! 1. `DIRCHAT_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Integration tests set `DIRCHAT_HOME` to a temporary directory so they
//! never read or write the real home:
//!
//! ```ignore
//! let temp_dir = TempDir::new().unwrap();
//! let mut cmd = cargo::cargo_bin_cmd!("dirchat");
//! cmd.env("DIRCHAT_HOME", temp_dir.path());
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable overriding the home directory
pub const HOME_ENV: &str = "DIRCHAT_HOME";

/// Get the home directory for dirchat
///
/// # Errors
///
/// Returns an error if `DIRCHAT_HOME` is unset or blank and the platform
/// home directory cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}
