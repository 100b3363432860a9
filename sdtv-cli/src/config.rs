use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

const APP_NAME: &str = "sdtv";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default output format
    pub default_output_format: OutputFormat,

    /// Default request timeout in seconds
    pub default_timeout: u64,

    /// User agent string for requests
    pub user_agent: Option<String>,

    /// Enable colored output
    pub colored_output: bool,

    /// Default proxy URL (supports http, https, socks5)
    pub default_proxy: Option<String>,

    /// Default proxy username (if proxy requires authentication)
    pub default_proxy_username: Option<String>,

    /// Default proxy password (if proxy requires authentication)
    pub default_proxy_password: Option<String>,

    /// Alternative API host, e.g. a staging mirror
    pub api_base: Option<String>,

    /// Alternative host for token gated HLS playlists
    pub stream_base: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_output_format: OutputFormat::Pretty,
            default_timeout: 30,
            user_agent: None,
            colored_output: true,
            default_proxy: None,
            default_proxy_username: None,
            default_proxy_password: None,
            api_base: None,
            stream_base: None,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("default_output_format", &self.default_output_format)
            .field("default_timeout", &self.default_timeout)
            .field("user_agent", &self.user_agent)
            .field("colored_output", &self.colored_output)
            .field("default_proxy", &self.default_proxy)
            .field("default_proxy_username", &self.default_proxy_username)
            .field(
                "default_proxy_password",
                &self.default_proxy_password.as_ref().map(|_| "<redacted>"),
            )
            .field("api_base", &self.api_base)
            .field("stream_base", &self.stream_base)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                if path.exists() {
                    let content = std::fs::read_to_string(path)
                        .context("Failed to read configuration file")?;
                    toml::from_str(&content).context("Failed to parse configuration file")
                } else {
                    Ok(Self::default())
                }
            }
            None => confy::load(APP_NAME, None).context("Failed to load configuration"),
        }
    }

    /// Get default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, None).ok()
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, toml_string).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Reset configuration to defaults and save
    pub fn reset(config_path: Option<&Path>) -> Result<()> {
        let path = config_path
            .map(|p| p.to_path_buf())
            .or_else(Self::default_config_path)
            .context("No configuration path available")?;

        Self::default().save(&path)
    }

    /// Show current configuration as a formatted string
    pub fn show(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration for display")
    }

    /// Endpoint overrides handed to the extractor as extras.
    pub fn extractor_extras(&self) -> Option<serde_json::Value> {
        if self.api_base.is_none() && self.stream_base.is_none() {
            return None;
        }
        let mut extras = serde_json::Map::new();
        if let Some(api_base) = &self.api_base {
            extras.insert("api_base".to_string(), api_base.clone().into());
        }
        if let Some(stream_base) = &self.stream_base {
            extras.insert("stream_base".to_string(), stream_base.clone().into());
        }
        Some(serde_json::Value::Object(extras))
    }
}
