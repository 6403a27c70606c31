//! Configuration management for murmur.
//!
//! Everything the binary needs to know that is not the input file: the API
//! credential, model overrides, and where the two output files go.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{API_KEY_ENV, APP_NAME};

const DEFAULT_TRANSCRIPT_PATH: &str = "transcription.txt";
const DEFAULT_CORRECTED_PATH: &str = "corrected_transcription.txt";

/// On-disk configuration.
///
/// Every field is optional; accessors fall back to built-in defaults so a
/// freshly created file works as-is once a credential is available.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// API key for both endpoints. The environment variable takes precedence
    /// over this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Transcription model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Chat model used for the correction pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_model: Option<String>,

    /// Domain vocabulary passed to the recognizer as a biasing prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<String>,

    /// Where the transcription is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<PathBuf>,

    /// Where the corrected transcription is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_path: Option<PathBuf>,
}

impl Config {
    /// Resolve the API key: environment first, config file second.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// Get the transcription model override
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Get the correction model override
    pub fn correction_model(&self) -> Option<&str> {
        self.correction_model.as_deref()
    }

    /// Get the vocabulary hint override
    pub fn vocabulary(&self) -> Option<&str> {
        self.vocabulary.as_deref()
    }

    /// Path for the transcription output file
    pub fn transcript_path(&self) -> PathBuf {
        self.transcript_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT_PATH))
    }

    /// Path for the corrected-transcription output file
    pub fn corrected_path(&self) -> PathBuf {
        self.corrected_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CORRECTED_PATH))
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration path.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager reading and writing an explicit file.
    pub fn with_config_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        if config.api_key().is_none() {
            warn!(
                "No API key configured. Set {} or add `api_key` to {:?}.",
                API_KEY_ENV, self.config_path
            );
        }

        Ok(config)
    }

    /// Saves the configuration to the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(config.model.is_none());
        assert_eq!(config.transcript_path(), PathBuf::from("transcription.txt"));
        assert_eq!(
            config.corrected_path(),
            PathBuf::from("corrected_transcription.txt")
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            api_key: Some("test-key".to_string()),
            model: Some("whisper-1".to_string()),
            corrected_path: Some(PathBuf::from("out/fixed.txt")),
            ..Default::default()
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.api_key, deserialized.api_key);
        assert_eq!(config.model, deserialized.model);
        assert_eq!(config.corrected_path, deserialized.corrected_path);
    }

    #[test]
    fn test_config_manager_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();

        let manager =
            ConfigManager::with_config_path(temp_dir.path().join(format!("{}.toml", APP_NAME)));

        let config = Config {
            api_key: Some("test-key".to_string()),
            vocabulary: Some("PULSE, RAPT".to_string()),
            ..Default::default()
        };

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(config.api_key, loaded.api_key);
        assert_eq!(config.vocabulary, loaded.vocabulary);
    }

    #[test]
    fn test_missing_file_loads_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_config_path(temp_dir.path().join("absent.toml"));

        let loaded = manager.load().unwrap();
        assert!(loaded.model.is_none());
    }
}
