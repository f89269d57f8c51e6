//! Configuration file support for the editor.
//!
//! This module provides serialization and deserialization of editor settings,
//! so interaction tolerances, zoom limits, default style and keybindings can be
//! tuned per user.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{self, zoom};
use crate::keybindings::{KeyBindings, KeyCode, MAX_LABEL_HOTKEYS};
use crate::model::Style;

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
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
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

    /// Interaction preferences
    #[serde(default)]
    pub preferences: EditorPreferences,

    /// Style given to new annotations before the label color is applied
    #[serde(default)]
    pub default_style: Style,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindingsConfig,
}

/// Interaction preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Pen tool closes the polygon within this distance of the first vertex (canvas units)
    pub close_radius: f64,

    /// Shape hit tolerance (screen pixels)
    pub hit_tolerance: f64,

    /// Resize/endpoint handle hit radius (screen pixels)
    pub handle_radius: f64,

    /// Radius for picking an existing skeleton joint (screen pixels)
    pub skeleton_point_radius: f64,

    /// Advance to the next label after each skeleton joint
    pub skeleton_auto_advance: bool,

    /// Number of undo steps kept
    pub max_history: usize,

    /// Smallest zoom, in percent
    pub min_zoom_percent: f64,

    /// Largest zoom, in percent
    pub max_zoom_percent: f64,

    /// Multiplicative zoom in/out step
    pub zoom_step: f64,

    /// Log verbosity level
    pub log_level: LogLevel,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            close_radius: constants::POLYGON_CLOSE_RADIUS,
            hit_tolerance: constants::HIT_TOLERANCE,
            handle_radius: constants::HANDLE_HIT_RADIUS,
            skeleton_point_radius: constants::SKELETON_POINT_RADIUS,
            skeleton_auto_advance: false,
            max_history: constants::DEFAULT_MAX_HISTORY,
            min_zoom_percent: zoom::MIN_PERCENT,
            max_zoom_percent: zoom::MAX_PERCENT,
            zoom_step: zoom::STEP_FACTOR,
            log_level: LogLevel::default(),
        }
    }
}

impl EditorPreferences {
    /// Check that the values make sense together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("close_radius", self.close_radius),
            ("hit_tolerance", self.hit_tolerance),
            ("handle_radius", self.handle_radius),
            ("skeleton_point_radius", self.skeleton_point_radius),
            ("min_zoom_percent", self.min_zoom_percent),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.max_zoom_percent < self.min_zoom_percent {
            return Err(ConfigError::invalid(format!(
                "max_zoom_percent {} is below min_zoom_percent {}",
                self.max_zoom_percent, self.min_zoom_percent
            )));
        }
        if self.zoom_step <= 1.0 {
            return Err(ConfigError::invalid("zoom_step must be greater than 1"));
        }
        if self.max_history == 0 {
            return Err(ConfigError::invalid("max_history must be at least 1"));
        }
        Ok(())
    }
}

/// Keybinding configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindingsConfig {
    pub tool_move: KeyCode,
    pub tool_rectangle: KeyCode,
    pub tool_line: KeyCode,
    pub tool_brush: KeyCode,
    pub tool_path: KeyCode,
    pub tool_pen: KeyCode,
    pub tool_text: KeyCode,
    pub tool_point: KeyCode,
    pub tool_skeleton: KeyCode,

    /// Hotkeys for label selection (indices 0-8 map to labels 1-9)
    #[serde(default = "default_label_hotkeys")]
    pub label_hotkeys: Vec<Option<KeyCode>>,
}

fn default_label_hotkeys() -> Vec<Option<KeyCode>> {
    KeyBindings::default().label_hotkeys.to_vec()
}

impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self::from(&KeyBindings::default())
    }
}

impl From<&KeyBindings> for KeyBindingsConfig {
    fn from(bindings: &KeyBindings) -> Self {
        Self {
            tool_move: bindings.tool_move,
            tool_rectangle: bindings.tool_rectangle,
            tool_line: bindings.tool_line,
            tool_brush: bindings.tool_brush,
            tool_path: bindings.tool_path,
            tool_pen: bindings.tool_pen,
            tool_text: bindings.tool_text,
            tool_point: bindings.tool_point,
            tool_skeleton: bindings.tool_skeleton,
            label_hotkeys: bindings.label_hotkeys.to_vec(),
        }
    }
}

impl KeyBindingsConfig {
    /// Convert back to KeyBindings, filling missing slots with None.
    pub fn to_keybindings(&self) -> KeyBindings {
        let mut label_hotkeys: [Option<KeyCode>; MAX_LABEL_HOTKEYS] = [None; MAX_LABEL_HOTKEYS];

        for (i, hotkey) in self
            .label_hotkeys
            .iter()
            .take(MAX_LABEL_HOTKEYS)
            .enumerate()
        {
            label_hotkeys[i] = *hotkey;
        }

        KeyBindings {
            tool_move: self.tool_move,
            tool_rectangle: self.tool_rectangle,
            tool_line: self.tool_line,
            tool_brush: self.tool_brush,
            tool_path: self.tool_path,
            tool_pen: self.tool_pen,
            tool_text: self.tool_text,
            tool_point: self.tool_point,
            tool_skeleton: self.tool_skeleton,
            label_hotkeys,
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: EditorPreferences::default(),
            default_style: Style::default(),
            keybindings: KeyBindingsConfig::default(),
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
        config.preferences.validate()?;

        Ok(config)
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the configuration, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "colabel-config.json"
    }

    /// Get the default config file path for auto-load/save.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("colabel").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("colabel")
                    .join(Self::default_filename())
            })
        }
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

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)
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
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let mut config = EditorConfig::new();
        config.preferences.close_radius = 14.0;
        config.preferences.log_level = LogLevel::Debug;
        config.keybindings.tool_pen = KeyCode::G;

        let json = config.to_json().unwrap();
        let back = EditorConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.keybindings.to_keybindings().tool_pen, KeyCode::G);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = EditorConfig::from_json(r#"{ "version": 1 }"#).unwrap();
        assert_eq!(config, EditorConfig::default());

        let config =
            EditorConfig::from_json(r#"{ "version": 1, "preferences": { "max_history": 5 } }"#)
                .unwrap();
        assert_eq!(config.preferences.max_history, 5);
        assert_eq!(config.preferences.close_radius, constants::POLYGON_CLOSE_RADIUS);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            EditorConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
    }

    #[test]
    fn test_invalid_preferences_rejected() {
        let json = r#"{ "version": 1, "preferences": { "min_zoom_percent": 500, "max_zoom_percent": 50 } }"#;
        assert!(matches!(EditorConfig::from_json(json), Err(ConfigError::Invalid(_))));

        let json = r#"{ "version": 1, "preferences": { "zoom_step": 1.0 } }"#;
        assert!(matches!(EditorConfig::from_json(json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_short_label_hotkeys_padded() {
        let config = KeyBindingsConfig {
            label_hotkeys: vec![Some(KeyCode::Q)],
            ..KeyBindingsConfig::default()
        };
        let bindings = config.to_keybindings();
        assert_eq!(bindings.label_hotkeys[0], Some(KeyCode::Q));
        assert_eq!(bindings.label_hotkeys[1], None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("colabel-config-{}", std::process::id()));
        let path = dir.join("nested").join(EditorConfig::default_filename());
        let config = EditorConfig::default();
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
