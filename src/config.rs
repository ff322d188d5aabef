//! Configuration management for notecore.
//!
//! This module handles loading and saving configuration to/from a JSON file
//! (`config.json`) inside a config directory. Missing fields take their
//! defaults; an unreadable or malformed file falls back to defaults entirely.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::database::DEFAULT_BUSY_TIMEOUT_MS;
use crate::error::{NoteError, NoteResult};
use crate::validation::DEFAULT_MIN_PASSWORD_LENGTH;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigData {
    /// Path to the database file
    #[serde(default)]
    pub database_file: String,
    /// Minimum password length accepted at registration
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// How long a write waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_min_password_length() -> usize {
    DEFAULT_MIN_PASSWORD_LENGTH
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            database_file: String::new(),
            min_password_length: default_min_password_length(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl ConfigData {
    fn defaults_in(config_dir: &Path) -> Self {
        Self {
            database_file: config_dir.join("notes.db").to_string_lossy().to_string(),
            ..Self::default()
        }
    }
}

/// Configuration manager
pub struct Config {
    config_dir: PathBuf,
    config_file: PathBuf,
    data: ConfigData,
}

impl Config {
    /// Create a new configuration manager
    ///
    /// Without the `desktop` feature, `config_dir` is required.
    pub fn new(config_dir: Option<PathBuf>) -> NoteResult<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => {
                #[cfg(feature = "desktop")]
                {
                    dirs::config_dir()
                        .unwrap_or_else(|| PathBuf::from("."))
                        .join("notecore")
                }
                #[cfg(not(feature = "desktop"))]
                {
                    return Err(NoteError::Config(
                        "config_dir is required on mobile platforms".to_string(),
                    ));
                }
            }
        };

        fs::create_dir_all(&config_dir)?;
        let config_file = config_dir.join("config.json");

        let data = if config_file.exists() {
            match fs::read_to_string(&config_file) {
                Ok(content) => {
                    let mut data: ConfigData = serde_json::from_str(&content).unwrap_or_else(|e| {
                        tracing::warn!("Ignoring malformed {}: {}", config_file.display(), e);
                        ConfigData::defaults_in(&config_dir)
                    });
                    if data.database_file.is_empty() {
                        data.database_file = ConfigData::defaults_in(&config_dir).database_file;
                    }
                    data
                }
                Err(e) => {
                    tracing::warn!("Cannot read {}: {}", config_file.display(), e);
                    ConfigData::defaults_in(&config_dir)
                }
            }
        } else {
            ConfigData::defaults_in(&config_dir)
        };

        let config = Self {
            config_dir,
            config_file,
            data,
        };

        // Save default config if it doesn't exist
        if !config.config_file.exists() {
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> NoteResult<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the database file path
    pub fn database_file(&self) -> &str {
        &self.data.database_file
    }

    pub fn min_password_length(&self) -> usize {
        self.data.min_password_length
    }

    pub fn set_min_password_length(&mut self, length: usize) -> NoteResult<()> {
        self.data.min_password_length = length;
        self.save()
    }

    pub fn busy_timeout_ms(&self) -> u64 {
        self.data.busy_timeout_ms
    }

    /// Get a configuration value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "database_file" => Some(self.data.database_file.clone()),
            "min_password_length" => Some(self.data.min_password_length.to_string()),
            "busy_timeout_ms" => Some(self.data.busy_timeout_ms.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value
    pub fn set(&mut self, key: &str, value: &str) -> NoteResult<()> {
        match key {
            "database_file" => self.data.database_file = value.to_string(),
            "min_password_length" => self.data.min_password_length = parse_number(key, value)?,
            "busy_timeout_ms" => self.data.busy_timeout_ms = parse_number(key, value)?,
            _ => return Err(NoteError::Config(format!("Unknown config key: {}", key))),
        }
        self.save()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> NoteResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| NoteError::Config(format!("{} must be a non-negative integer, got {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();

        assert_eq!(
            PathBuf::from(config.database_file()),
            temp_dir.path().join("notes.db")
        );
        assert_eq!(config.min_password_length(), 8);
        assert_eq!(config.busy_timeout_ms(), 5_000);
        assert!(temp_dir.path().join("config.json").exists());
    }

    #[test]
    fn test_config_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
            config.set_min_password_length(12).unwrap();
            config.set("busy_timeout_ms", "250").unwrap();
        }

        {
            let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
            assert_eq!(config.min_password_length(), 12);
            assert_eq!(config.busy_timeout_ms(), 250);
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.json"),
            r#"{"min_password_length": 10}"#,
        )
        .unwrap();

        let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(config.min_password_length(), 10);
        assert_eq!(config.busy_timeout_ms(), 5_000);
        assert!(config.database_file().ends_with("notes.db"));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.json"), "{ not json").unwrap();

        let config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(config.min_password_length(), 8);
    }

    #[test]
    fn test_get_set() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(Some(temp_dir.path().to_path_buf())).unwrap();

        config.set("database_file", "/data/other.db").unwrap();
        assert_eq!(config.get("database_file"), Some("/data/other.db".to_string()));
        assert_eq!(config.get("min_password_length"), Some("8".to_string()));
        assert!(config.get("unknown").is_none());

        assert!(config.set("unknown", "x").is_err());
        assert!(config.set("busy_timeout_ms", "-5").is_err());
    }

    #[cfg(not(feature = "desktop"))]
    #[test]
    fn test_config_dir_required_without_desktop() {
        assert!(matches!(Config::new(None), Err(NoteError::Config(_))));
    }
}
