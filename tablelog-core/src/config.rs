//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tablelog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tablelog/` (~/.config/tablelog/)
//! - Data: `$XDG_DATA_HOME/tablelog/` (~/.local/share/tablelog/)
//! - State/Logs: `$XDG_STATE_HOME/tablelog/` (~/.local/state/tablelog/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Log library settings
    #[serde(default)]
    pub library: LibraryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where settings live and which files count as logs
#[derive(Debug, Deserialize, Clone)]
pub struct LibraryConfig {
    /// Override for the global `setting.json` location
    pub settings_path: Option<PathBuf>,

    /// File name of the per-directory overlay document
    #[serde(default = "default_modifier_file")]
    pub modifier_file: String,

    /// Log file extensions, matched case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            settings_path: None,
            modifier_file: default_modifier_file(),
            extensions: default_extensions(),
        }
    }
}

impl LibraryConfig {
    /// Resolved `setting.json` path
    pub fn settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| Config::data_dir().join("setting.json"))
    }

    /// Reject values that would make every directory lookup fail.
    pub fn validate(&self) -> Result<()> {
        let name = Path::new(&self.modifier_file);
        if self.modifier_file.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(Error::Config(format!(
                "library.modifier_file must be a bare file name, got {:?}",
                self.modifier_file
            )));
        }
        if self.extensions.is_empty() {
            return Err(Error::Config(
                "library.extensions must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_modifier_file() -> String {
    "modifier.json".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["htm".to_string(), "html".to_string()]
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.library.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tablelog/config.toml` (~/.config/tablelog/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tablelog").join("config.toml")
    }

    /// Returns the data directory path (for `setting.json`)
    ///
    /// `$XDG_DATA_HOME/tablelog/` (~/.local/share/tablelog/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("tablelog")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tablelog/` (~/.local/state/tablelog/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tablelog")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
