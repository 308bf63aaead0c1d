//! # Configuration Module
//!
//! Persistent settings for EchoMood, stored as JSON in the platform config
//! directory:
//! - Linux: `~/.config/echomood/settings.json`
//! - macOS: `~/Library/Application Support/echomood/settings.json`
//! - Windows: `%APPDATA%\echomood\settings.json`
//!
//! A missing file means defaults. Command-line flags and environment
//! variables take precedence over anything stored here.

use crate::familiarity::FamiliarityFallback;
use crate::mood::DEFAULT_TOLERANCE;
use crate::publisher::{DEFAULT_DESCRIPTION, DEFAULT_MAX_PLAYLIST_SIZE};
use crate::spotify::{DEFAULT_API_BASE, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "echomood";
const SETTINGS_FILE: &str = "settings.json";

/// Returns the platform-appropriate config directory for EchoMood, creating it
/// if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system config directory cannot be determined
/// - The echomood subdirectory cannot be created due to permissions
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Please ensure your platform supports standard config directories."
        )
    })?;

    let app_dir = config_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create EchoMood config directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Path of the settings file (which may not exist yet).
///
/// # Errors
///
/// See [`get_config_dir`].
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(SETTINGS_FILE))
}

/// Stored settings. Every field has a default, so partial files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the Web API.
    pub api_base: String,
    /// Bearer token. Usually supplied through the environment instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
    /// Mood tolerance used when none is given on the command line.
    pub default_tolerance: f64,
    /// Upper bound on tracks added in one playlist.
    pub max_playlist_size: usize,
    pub familiarity_fallback: FamiliarityFallback,
    pub playlist_description: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            default_tolerance: DEFAULT_TOLERANCE,
            max_playlist_size: DEFAULT_MAX_PLAYLIST_SIZE,
            familiarity_fallback: FamiliarityFallback::default(),
            playlist_description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the standard location, falling back to defaults
    /// when no file exists.
    ///
    /// # Errors
    ///
    /// The config directory is unavailable, or the file exists but cannot be
    /// read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_settings_path()?)
    }

    /// # Errors
    ///
    /// The file exists but cannot be read or is not valid settings JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Writes the settings as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Directory creation or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_playlist_size, 50);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            access_token: Some("token".to_string()),
            max_playlist_size: 30,
            familiarity_fallback: FamiliarityFallback::Neutral(50),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"default_tolerance": 0.2, "familiarity_fallback": {"kind": "neutral", "value": 40}}"#)
            .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.default_tolerance, 0.2);
        assert_eq!(settings.familiarity_fallback, FamiliarityFallback::Neutral(40));
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"), "got: {err}");
    }

    #[test]
    fn test_token_is_not_written_when_absent() {
        let text = serde_json::to_string(&Settings::default()).unwrap();
        assert!(!text.contains("access_token"));
    }
}
