use crate::error::StorageError;
use deen_domain::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
    /// Encoding used to turn text arguments into bytes.
    pub input_encoding: Encoding,
    /// Plugin names or aliases hidden from every driver.
    pub disabled_plugins: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
            input_encoding: Encoding::Utf8,
            disabled_plugins: Vec::new(),
        }
    }
}

impl Preferences {
    pub fn is_disabled(&self, key: &str) -> bool {
        self.disabled_plugins.iter().any(|d| d == key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    preferences: Preferences,
}

pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/deen/config.toml`.
    pub fn default_path() -> Result<PathBuf, StorageError> {
        dirs::config_dir()
            .map(|dir| dir.join("deen").join("config.toml"))
            .ok_or(StorageError::NoConfigDir)
    }

    pub fn at_default_location() -> Result<Self, StorageError> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_file(&self) -> Result<ConfigFile, StorageError> {
        if !self.path.exists() {
            debug!("No config at {}, using defaults", self.path.display());
            return Ok(ConfigFile::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        let config: ConfigFile = toml::from_str(&data)?;
        Ok(config)
    }

    fn save_file(&self, config: &ConfigFile) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, data)?;
        debug!("Wrote config to {}", self.path.display());
        Ok(())
    }

    pub fn load_preferences(&self) -> Result<Preferences, StorageError> {
        Ok(self.load_file()?.preferences)
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<(), StorageError> {
        let mut config = self.load_file()?;
        config.preferences = prefs.clone();
        self.save_file(&config)
    }
}
