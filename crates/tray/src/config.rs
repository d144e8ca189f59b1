use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::errors::CodedError;

/// Settings file name, looked up under the user's Documents directory by
/// default so it is easy to find and edit by hand.
pub const SETTINGS_FILE_NAME: &str = "hotspot-tray.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("could not determine the user home directory")]
    NoHomeDir,
}

impl CodedError for SettingsError {
    fn code(&self) -> &str {
        match self {
            SettingsError::Io { .. } => "[HT-SET-001]",
            SettingsError::Parse { .. } => "[HT-SET-002]",
            SettingsError::Invalid(_) => "[HT-SET-003]",
            SettingsError::NoHomeDir => "[HT-SET-004]",
        }
    }
}

/// User settings, loaded once at startup. Hotspots can be tracked through
/// whole accounts, individual addresses, or both.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Minutes between refresh cycles, at least 1.
    pub refresh_minutes: u64,
    #[serde(default)]
    pub account_addresses: Vec<String>,
    #[serde(default)]
    pub hotspot_addresses: Vec<String>,
}

impl Settings {
    /// Load and validate settings from a JSON document.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Io { path: path.to_path_buf(), source })?;
        let settings: Settings = serde_json::from_str(&raw)
            .map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.refresh_minutes < 1 {
            return Err(SettingsError::Invalid(
                "refresh_minutes must be at least 1".into(),
            ));
        }
        if self.account_addresses.is_empty() && self.hotspot_addresses.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one account_addresses or hotspot_addresses entry is required".into(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_minutes * 60)
    }

    /// Default on-disk location: `~/Documents/hotspot-tray.json`.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let home = dirs::home_dir().ok_or(SettingsError::NoHomeDir)?;
        Ok(home.join("Documents").join(SETTINGS_FILE_NAME))
    }
}
