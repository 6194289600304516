//! Configuration file
//!
//! Stored in ~/.config/strandpress/config.json. A missing file means
//! defaults; command line flags take precedence over anything loaded here.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default ledger file name
pub const DEFAULT_LEDGER_PATH: &str = "ledger.strand";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger file used when none is given
    pub ledger_path: PathBuf,
    /// Key file used by `release` when none is given
    pub key_path: Option<PathBuf>,
    /// Default tracing filter
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            key_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?;
        Ok(config_dir.join("strandpress").join("config.json"))
    }

    /// Load from the default location
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path()?)
    }

    /// Load from `path`, or defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            ledger_path: PathBuf::from("/tmp/x.strand"),
            key_path: Some(PathBuf::from("/tmp/key.json")),
            log_level: "debug".into(),
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level":"warn"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.ledger_path, PathBuf::from(DEFAULT_LEDGER_PATH));
    }

    #[test]
    fn test_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }
}
