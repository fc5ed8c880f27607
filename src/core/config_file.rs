//! User configuration file handling
//!
//! Manages settings from ~/.config/iconpress/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// User configuration from ~/.config/iconpress/settings.json
///
/// These settings override built-in defaults but are overridden by CLI arguments
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    /// Icon directory used when `--icons` is not given
    pub icons_dir: Option<PathBuf>,
    /// Output root used when `--output-dir` is not given
    pub output_root: Option<PathBuf>,
    /// First codepoint, written like the CLI flag (`"E000"`)
    pub start_codepoint: Option<String>,
    pub font_height: Option<f64>,
    pub descent: Option<f64>,
    pub normalize: Option<bool>,
    pub fontc_command: Option<PathBuf>,
    pub open_preview: Option<bool>,
    pub stable_codepoints: Option<bool>,
}

impl ConfigFile {
    /// Get the path to the iconpress config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join("iconpress")
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Load configuration from the user config file
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or `None` when it is missing or unreadable
    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded user settings from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse settings.json: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read settings.json: {}", e);
                None
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Settings file content written by `init-config`
    pub fn example() -> Self {
        Self {
            icons_dir: Some(PathBuf::from("svg")),
            output_root: Some(PathBuf::from(".")),
            start_codepoint: Some("E000".to_string()),
            font_height: Some(crate::font::FontMetadata::DEFAULT_FONT_HEIGHT),
            descent: Some(crate::font::FontMetadata::DEFAULT_DESCENT),
            normalize: Some(true),
            fontc_command: Some(PathBuf::from("fontc")),
            open_preview: Some(true),
            stable_codepoints: Some(false),
        }
    }

    /// Initialize the user configuration directory
    ///
    /// This creates:
    /// 1. The ~/.config/iconpress directory with a logs/ subdirectory
    /// 2. A settings.json file with default values, unless one exists
    pub fn initialize_config_directory() -> anyhow::Result<()> {
        let config_dir = Self::config_dir();
        fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {:?}", config_dir);

        let logs_dir = crate::logging::logs_dir();
        fs::create_dir_all(&logs_dir)?;
        println!("Created logs directory: {:?}", logs_dir);

        let settings_path = Self::config_path();
        if !settings_path.exists() {
            Self::example().save_to(&settings_path)?;
            println!("Created settings file: {:?}", settings_path);
        } else {
            println!("Settings file already exists: {:?}", settings_path);
        }

        println!("\nConfiguration initialized successfully!");
        println!("You can now:");
        println!("  - Edit settings at: {:?}", settings_path);
        println!("  - View build logs in: {:?}", logs_dir);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_the_rest_with_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "start_codepoint": "F000", "open_preview": false }"#).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.start_codepoint.as_deref(), Some("F000"));
        assert_eq!(config.open_preview, Some(false));
        assert!(config.icons_dir.is_none());
    }

    #[test]
    fn broken_settings_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(ConfigFile::load_from(&path).is_none());
        assert!(ConfigFile::load_from(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn example_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        ConfigFile::example().save_to(&path).unwrap();
        assert_eq!(ConfigFile::load_from(&path), Some(ConfigFile::example()));
    }
}
