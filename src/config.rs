//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sentitrack.toml` files.

use crate::cli::OutputFormat;
use crate::models::InputMode;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sentitrack.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Analyzer session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Output settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the analysis service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Unset means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Analyzer session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Input mode used at startup.
    #[serde(default)]
    pub mode: InputMode,

    /// Number of text analyses kept in history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Longest accepted text, in characters.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::default(),
            history_limit: default_history_limit(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

fn default_history_limit() -> usize {
    10
}

fn default_max_text_chars() -> usize {
    2000
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum comments printed for a post analysis.
    #[serde(default = "default_max_comments")]
    pub max_comments: usize,

    /// Result format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_comments: default_max_comments(),
            format: OutputFormat::default(),
        }
    }
}

fn default_max_comments() -> usize {
    20
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.sentitrack.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref api_url) = args.api_url {
            self.api.base_url = api_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = Some(timeout);
        }
        if let Some(mode) = args.mode {
            self.session.mode = mode;
        }
        if let Some(format) = args.format {
            self.display.format = format;
        }
        if let Some(max_comments) = args.max_comments {
            self.display.max_comments = max_comments;
        }
    }

    /// Check values that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("API URL must start with 'http://' or 'https://': {}", url);
        }
        if self.session.history_limit == 0 {
            bail!("History limit must be at least 1");
        }
        if self.session.max_text_chars == 0 {
            bail!("Maximum text length must be at least 1 character");
        }
        if self.api.timeout_seconds == Some(0) {
            bail!("Timeout must be at least 1 second");
        }
        Ok(())
    }

    /// Batch requests only exist for free text.
    pub fn validate_batch(&self) -> Result<()> {
        if self.session.mode == InputMode::Url {
            bail!("--batch only works in text mode, but the configured mode is url");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
