//! Config resolution and registry loading shared by all commands

use anyhow::{Context, Result};
use dirchat_core::config::{resolve_config, Config, ConfigOverrides, OutputFormat};
use dirchat_core::home::get_home_dir;
use dirchat_core::{FsBackend, MessageStore, Registry};
use std::path::PathBuf;

use crate::commands::GlobalArgs;

/// Resolved configuration plus the directories it was resolved from
pub struct Settings {
    pub config: Config,
    pub home_dir: PathBuf,
    pub current_dir: PathBuf,
}

impl Settings {
    pub fn resolve(global: &GlobalArgs, format: Option<OutputFormat>) -> Result<Self> {
        let home_dir = get_home_dir()?;
        let current_dir = std::env::current_dir()?;

        let overrides = ConfigOverrides {
            root: global.root.clone(),
            format: format.or(global.format),
        };
        let config = resolve_config(&overrides, &current_dir, &home_dir)?;

        Ok(Self {
            config,
            home_dir,
            current_dir,
        })
    }

    pub fn storage_root(&self) -> PathBuf {
        self.config.storage_root(&self.home_dir)
    }

    pub fn json_output(&self) -> bool {
        self.config.display.format == OutputFormat::Json
    }
}

/// A loaded registry for the configured storage root
pub struct Session {
    pub registry: Registry<FsBackend>,
    pub settings: Settings,
}

impl Session {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        Self::open_with_format(global, None)
    }

    pub fn open_with_format(global: &GlobalArgs, format: Option<OutputFormat>) -> Result<Self> {
        let settings = Settings::resolve(global, format)?;
        let root = settings.storage_root();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Cannot create storage root {}", root.display()))?;

        let registry = Registry::load(FsBackend, &root)?
            .with_conversation_prefix(settings.config.core.conversation_prefix.clone())
            .with_max_message_bytes(settings.config.store.max_message_bytes);

        Ok(Self { registry, settings })
    }

    /// `requested`, or the active conversation when none was named
    pub fn conversation_id(&self, requested: Option<&str>) -> Result<String> {
        if let Some(id) = requested {
            return Ok(self.registry.get(id)?.id.clone());
        }
        self.registry
            .active()
            .map(|c| c.id.clone())
            .context("No conversations yet. Create one with `dirchat new`.")
    }

    /// Message store for the current folder of a conversation
    pub fn messages(&self, requested: Option<&str>) -> Result<MessageStore<'_, FsBackend>> {
        let id = self.conversation_id(requested)?;
        Ok(self.registry.messages(&id)?)
    }
}
