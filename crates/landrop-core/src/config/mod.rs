//! Configuration management for LANdrop.
//!
//! Configuration is a small TOML file; every field has a default so a
//! missing file (the common case) just means defaults.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/landrop/config.toml` |
//! | macOS | `~/Library/Application Support/LANdrop/config.toml` |
//! | Windows | `%APPDATA%\LANdrop\config.toml` |

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for LANdrop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web server settings
    pub web: WebConfig,
    /// Upload storage settings
    pub storage: StorageConfig,
}

/// Web server configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind to localhost only instead of all interfaces
    pub localhost_only: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            localhost_only: false,
        }
    }
}

/// Upload storage configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory uploaded files are persisted under
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(crate::DEFAULT_UPLOAD_DIR),
        }
    }
}

impl Config {
    /// Load configuration from the platform config directory.
    ///
    /// A missing file yields defaults; an unreadable or unparsable file is
    /// an error so typos do not silently revert settings.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to the platform config directory.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "landrop", "LANdrop").map_or_else(
            || PathBuf::from("config.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.web.port, crate::DEFAULT_PORT);
        assert!(!config.web.localhost_only);
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[web]\nport = 8080\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.web.port, 8080);
        assert!(!config.web.localhost_only);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "web = \"not a table\"").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config {
            web: WebConfig {
                port: 9000,
                localhost_only: true,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("/tmp/drop"),
            },
        };

        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed, config);
    }
}
