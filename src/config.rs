//! Configuration file support for sheetmark.
//!
//! Preferences and keybindings are stored as versioned JSON in the user's
//! config directory and turned into [`EditorSettings`] when an editor is built.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HISTORY_LIMIT, region::DEFAULT_OPTIONS};
use crate::editor::EditorSettings;
use crate::history::HistoryConfig;
use crate::keybindings::KeyBindings;
use crate::model::RegionType;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Type given to newly drawn regions
    pub default_region_type: RegionType,

    /// Options string for new multiple choice regions
    pub default_options: String,

    pub show_grid: bool,
    pub show_ruler: bool,

    /// Snapshots kept for undo; `null` keeps all of them
    pub history_limit: Option<usize>,

    /// Drop zero-area rectangles instead of creating regions
    pub discard_degenerate_regions: bool,

    /// Log verbosity level
    pub log_level: LogLevel,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_region_type: RegionType::default(),
            default_options: DEFAULT_OPTIONS.to_string(),
            show_grid: false,
            show_ruler: false,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            discard_degenerate_regions: false,
            log_level: LogLevel::default(),
        }
    }
}

impl From<&EditorConfig> for EditorSettings {
    fn from(config: &EditorConfig) -> Self {
        let prefs = &config.preferences;
        Self {
            history: HistoryConfig {
                max_history: prefs.history_limit,
            },
            discard_degenerate_regions: prefs.discard_degenerate_regions,
            keybindings: config.keybindings.clone(),
            default_region_type: prefs.default_region_type,
            default_options: prefs.default_options.clone(),
            show_grid: prefs.show_grid,
            show_ruler: prefs.show_ruler,
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "sheetmark-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
        Some(base.join("sheetmark").join(Self::default_filename()))
    }

    /// Read and parse a config file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Write configuration to `path`, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path and return that path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<std::path::PathBuf, ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)?;
        Ok(path)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
