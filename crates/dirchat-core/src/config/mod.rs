//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables
//! 3. Repo-local config (.dirchat.toml)
//! 4. Global config (~/.config/dirchat/config.toml)
//! 5. Defaults

mod discovery;
mod types;

pub use discovery::{resolve_config, ConfigError, ConfigOverrides, PREFIX_ENV, ROOT_ENV};
pub use types::{Config, CoreConfig, DisplayConfig, OutputFormat, StoreConfig, TimestampFormat};
