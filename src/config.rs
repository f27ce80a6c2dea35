//! Configuration for conwin.
//!
//! Loaded from `~/.conwin/config.toml`; every field is optional:
//!
//! ```toml
//! # Log filter when RUST_LOG is not set
//! log_level = "debug"
//!
//! # Log file (default: ~/.conwin/conwin.log)
//! log_file = "C:/temp/conwin.log"
//!
//! [window]
//! # single, double, rounded
//! border_style = "double"
//!
//! [input]
//! # auto, win32, term
//! backend = "term"
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ui::BoxGlyphs;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default log filter
    pub log_level: String,
    /// Log file path
    pub log_file: Option<PathBuf>,
    /// Window settings
    pub window: WindowConfig,
    /// Input device settings
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            window: WindowConfig::default(),
            input: InputConfig::default(),
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub border_style: String, // "single", "double", "rounded"
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            border_style: "single".to_string(),
        }
    }
}

/// Which device backend drives the console
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Win32 console on Windows, terminal elsewhere
    #[default]
    Auto,
    Win32,
    Term,
}

/// Input configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub backend: BackendKind,
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = Self::from_toml(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Configured log file, or `~/.conwin/conwin.log`
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join("conwin.log")))
            .unwrap_or_else(|| PathBuf::from("conwin.log"))
    }

    /// Glyphs for window borders
    pub fn border_glyphs(&self) -> BoxGlyphs {
        BoxGlyphs::by_name(&self.window.border_style)
    }
}

fn config_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".conwin"))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
