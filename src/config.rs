use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::style::{self, AspectRatio, StylePreset};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(skip)]
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_style_id")]
    pub style: String,
    #[serde(default = "default_aspect_ratio_id")]
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub auto_download: bool,
    #[serde(default = "default_display")]
    pub display: DisplayMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Terminal,
    Viewer,
    None,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Terminal => "terminal",
            DisplayMode::Viewer => "viewer",
            DisplayMode::None => "none",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "terminal" => DisplayMode::Terminal,
            "viewer" => DisplayMode::Viewer,
            "none" => DisplayMode::None,
            _ => DisplayMode::Terminal,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["terminal", "viewer", "none"]
    }
}

// Default value functions
fn default_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_style_id() -> String {
    style::default_style().id.to_string()
}

fn default_aspect_ratio_id() -> String {
    style::default_aspect_ratio().id.to_string()
}

fn default_output_directory() -> String {
    "./studio-output".to_string()
}

fn default_true() -> bool {
    true
}

fn default_display() -> DisplayMode {
    DisplayMode::Terminal
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            style: default_style_id(),
            aspect_ratio: default_aspect_ratio_id(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            auto_download: true,
            display: DisplayMode::Terminal,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            defaults: DefaultsConfig::default(),
            output: OutputConfig::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "studiophoto", "studio-cli")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file or create default
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        // The environment variable takes precedence over the stored key
        let env_key = std::env::var("GEMINI_API_KEY").ok();

        if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&content).context("Failed to parse config file")?;
            config.config_path = config_path;

            if let Some(key) = env_key {
                config.api.key = Some(key);
            }

            Ok(config)
        } else {
            let mut config = Config::default();
            config.config_path = config_path;

            if let Some(key) = env_key {
                config.api.key = Some(key);
            }

            config.save()?;
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get API key (from config or environment)
    pub fn api_key(&self) -> Option<&str> {
        self.api.key.as_deref()
    }

    /// Resolve the configured default style against the catalog.
    pub fn default_style(&self) -> StylePreset {
        style::style_by_id(&self.defaults.style).unwrap_or_else(style::default_style)
    }

    /// Resolve the configured default aspect ratio against the catalog.
    pub fn default_aspect_ratio(&self) -> AspectRatio {
        style::aspect_ratio_by_id(&self.defaults.aspect_ratio)
            .unwrap_or_else(style::default_aspect_ratio)
    }

    /// Set a config value by key path (e.g., "api.key", "defaults.style")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.key" => self.api.key = Some(value.to_string()),
            "api.model" => self.api.model = value.to_string(),
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.timeout_secs" => {
                self.api.timeout_secs = value.parse().context("Invalid timeout value")?;
            }
            "defaults.style" => {
                if let Some(preset) = style::style_by_id(value) {
                    self.defaults.style = preset.id.to_string();
                } else {
                    anyhow::bail!(
                        "Invalid style. Valid values: {}",
                        style::style_ids().join(", ")
                    );
                }
            }
            "defaults.aspect_ratio" => {
                if let Some(ratio) = style::aspect_ratio_by_id(value) {
                    self.defaults.aspect_ratio = ratio.id.to_string();
                } else {
                    anyhow::bail!(
                        "Invalid aspect ratio. Valid values: {}",
                        style::aspect_ratio_ids().join(", ")
                    );
                }
            }
            "output.directory" => self.output.directory = value.to_string(),
            "output.auto_download" => {
                self.output.auto_download = value.parse().context("Invalid boolean value")?;
            }
            "output.display" => {
                self.output.display = DisplayMode::from_str(value);
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.key" => self.api.key.clone().map(|_| "****".to_string()), // Mask API key
            "api.model" => Some(self.api.model.clone()),
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.timeout_secs" => Some(self.api.timeout_secs.to_string()),
            "defaults.style" => Some(self.defaults.style.clone()),
            "defaults.aspect_ratio" => Some(self.defaults.aspect_ratio.clone()),
            "output.directory" => Some(self.output.directory.clone()),
            "output.auto_download" => Some(self.output.auto_download.to_string()),
            "output.display" => Some(self.output.display.as_str().to_string()),
            _ => None,
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "api.key",
            "api.model",
            "api.base_url",
            "api.timeout_secs",
            "defaults.style",
            "defaults.aspect_ratio",
            "output.directory",
            "output.auto_download",
            "output.display",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_setting_is_validated_against_the_catalog() {
        let mut config = Config::default();
        assert!(config.set("defaults.style", "monochrome").is_ok());
        assert!(config.set("defaults.style", "vaporwave").is_err());
    }

    #[test]
    fn aspect_ratio_accepts_id_or_token() {
        let mut config = Config::default();
        config.set("defaults.aspect_ratio", "16:9").unwrap();
        assert_eq!(config.defaults.aspect_ratio, "widescreen");
        assert!(config.set("defaults.aspect_ratio", "7:5").is_err());
    }

    #[test]
    fn api_key_is_masked_on_get() {
        let mut config = Config::default();
        config.set("api.key", "secret-key").unwrap();
        assert_eq!(config.get("api.key").as_deref(), Some("****"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut config = Config::default();
        assert!(config.set("tui.theme", "dark").is_err());
        assert!(config.get("tui.theme").is_none());
    }

    #[test]
    fn resolved_defaults_fall_back_to_catalog_heads() {
        let mut config = Config::default();
        config.defaults.style = "deleted-style".to_string();
        assert_eq!(config.default_style().id, "neutral");
        assert_eq!(config.default_aspect_ratio().value, "1:1");
    }
}
