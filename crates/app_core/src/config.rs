//! Application configuration

use crate::error::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub server: ServerSettings,
    pub polling: PollingConfig,
    pub browser: BrowserConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub language: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

/// Where the image server lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: String,
    /// Base directory assumed when `/get_config` fails
    pub fallback_base_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            fallback_base_dir: "/data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub task_interval_ms: u64,
    pub progress_interval_ms: u64,
    pub quick_poll_interval_ms: u64,
    pub quick_poll_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            task_interval_ms: 500,
            progress_interval_ms: 1000,
            quick_poll_interval_ms: 200,
            quick_poll_attempts: 10,
        }
    }
}

impl PollingConfig {
    pub fn task_interval(&self) -> Duration {
        Duration::from_millis(self.task_interval_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn quick_poll_interval(&self) -> Duration {
        Duration::from_millis(self.quick_poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub history_limit: usize,
    pub restore_last_path: bool,
    pub current_file_label_max: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            restore_last_path: true,
            current_file_label_max: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub hover_delay_ms: u64,
    /// Extensions downloaded instead of previewed
    pub download_extensions: Vec<String>,
    /// Extensions previewed through server-side conversion
    pub transcode_extensions: Vec<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: 1500,
            download_extensions: vec!["pdf".into(), "heic".into(), "heif".into()],
            transcode_extensions: vec!["tiff".into(), "tif".into()],
        }
    }
}

impl PreviewConfig {
    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.hover_delay_ms)
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `config_path`, defaults when it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "ImageDeck", "ImageDeck")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Directory for user-supplied `.ftl` overrides
    pub fn locales_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "ImageDeck", "ImageDeck").map(|dirs| dirs.config_dir().join("locales"))
    }
}
