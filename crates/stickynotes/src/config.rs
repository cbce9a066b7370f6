//! Configuration management for stickynotes.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::note::ResizePreset;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "stickynotes";

/// Directory under the data dir that holds note records.
const NOTES_DIR_NAME: &str = "notes";

/// Dark tint given to new notes.
pub const DEFAULT_NOTE_COLOR: &str = "#2b2b2b";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `STICKYNOTES_`, sections split on `__`)
/// 2. TOML config file at `~/.config/stickynotes/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Note store configuration.
    pub store: StoreConfig,
    /// Note window configuration.
    pub note: NoteWindowConfig,
    /// Manager window configuration.
    pub manager: ManagerWindowConfig,
    /// Window chrome shared by every surface.
    pub window: WindowConfig,
}

/// Store-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one `<id>.json` file per note.
    /// Defaults to `~/.local/share/stickynotes/notes`
    pub directory: Option<PathBuf>,
}

/// Note window defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteWindowConfig {
    /// Tint given to newly created notes.
    pub default_color: String,
    /// Initial width of a new note.
    pub width: u32,
    /// Initial height of a new note.
    pub height: u32,
    /// Minimum width the host may shrink a note to.
    pub min_width: u32,
    /// Minimum height the host may shrink a note to.
    pub min_height: u32,
}

/// Manager window dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerWindowConfig {
    /// Initial width.
    pub width: u32,
    /// Initial height.
    pub height: u32,
    /// Minimum width.
    pub min_width: u32,
    /// Minimum height.
    pub min_height: u32,
}

/// Window chrome. These vary per platform and never affect the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Draw windows without the OS title bar and borders.
    pub frameless: bool,
    /// Request a transparent window background.
    pub transparent: bool,
    /// Show note windows in the taskbar / dock.
    pub show_in_taskbar: bool,
    /// Window icon. Platform default when unset.
    pub icon: Option<PathBuf>,
}

impl Default for NoteWindowConfig {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_NOTE_COLOR.to_string(),
            width: 300,
            height: 300,
            min_width: 200,
            min_height: 150,
        }
    }
}

impl Default for ManagerWindowConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 600,
            min_width: 300,
            min_height: 300,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            frameless: true,
            transparent: true,
            show_in_taskbar: true,
            icon: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("STICKYNOTES_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let note = &self.note;
        check_floor("note.width", note.width, "note.min_width", note.min_width)?;
        check_floor("note.height", note.height, "note.min_height", note.min_height)?;

        let manager = &self.manager;
        check_floor(
            "manager.width",
            manager.width,
            "manager.min_width",
            manager.min_width,
        )?;
        check_floor(
            "manager.height",
            manager.height,
            "manager.min_height",
            manager.min_height,
        )?;

        // Resizing to a preset must never undercut the window's own floor.
        for preset in ResizePreset::ALL {
            if preset.height() < note.min_height {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "note.min_height ({}) exceeds the '{preset}' preset height ({})",
                        note.min_height,
                        preset.height()
                    ),
                });
            }
        }

        if note.default_color.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "note.default_color must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the note store directory, resolving defaults if not set.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        self.store
            .directory
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(NOTES_DIR_NAME))
    }
}

fn check_floor(name: &str, value: u32, floor_name: &str, floor: u32) -> Result<()> {
    if value < floor {
        return Err(Error::ConfigValidation {
            message: format!("{name} ({value}) cannot be smaller than {floor_name} ({floor})"),
        });
    }
    Ok(())
}
