//! Configuration
//!
//! Settings are read from `~/.config/zapconnect/config.toml`. A missing file
//! is created with defaults; missing sections or fields fall back to their
//! defaults so older files keep working.

use crate::composer::ComposerSettings;
use crate::history::DEFAULT_STORAGE_KEY;
use crate::link::{LinkBuilder, DEFAULT_BASE_URL};
use crate::templates::default_templates;
use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default display format for history timestamps
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Deep-link configuration
    #[serde(default)]
    pub link: LinkConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Quick templates
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Storage paths
    #[serde(default)]
    pub paths: PathConfig,
}

/// Deep-link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Base URL links are built against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// History configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Storage slot holding the log
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// strftime-style format for entry timestamps
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

/// Quick template configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_templates")]
    pub items: Vec<String>,
}

/// Storage paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory for persisted state
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("zapconnect")
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            items: default_templates(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("zapconnect")
            .join("config.toml")
    }

    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, creating a default file if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Check values that would otherwise fail at use time
    pub fn validate(&self) -> Result<()> {
        if self.link.base_url.trim().is_empty() {
            anyhow::bail!("link.base_url must not be empty");
        }

        if self.history.storage_key.trim().is_empty() {
            anyhow::bail!("history.storage_key must not be empty");
        }

        if StrftimeItems::new(&self.history.timestamp_format).any(|item| matches!(item, Item::Error))
        {
            anyhow::bail!(
                "history.timestamp_format is not a valid format: {:?}",
                self.history.timestamp_format
            );
        }

        Ok(())
    }

    /// Composer settings derived from this configuration
    pub fn composer_settings(&self) -> ComposerSettings {
        ComposerSettings {
            link: LinkBuilder::new(self.link.base_url.clone()),
            timestamp_format: self.history.timestamp_format.clone(),
            templates: self.templates.items.clone(),
        }
    }
}
