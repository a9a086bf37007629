//! Configuration file loading for the archive.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Archive settings, read from `archive.toml` by default.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// SQLite database file. Defaults to `data/archive.db`.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Import worker threads. Unset means one per core.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Whether games cut short by an unresolvable move are stored with the
    /// moves that did resolve. Defaults to true.
    #[serde(default = "default_store_partial_games")]
    pub store_partial_games: bool,
}

fn default_database() -> PathBuf {
    PathBuf::from("data/archive.db")
}

fn default_store_partial_games() -> bool {
    true
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            threads: None,
            store_partial_games: default_store_partial_games(),
        }
    }
}

impl ArchiveConfig {
    /// Loads the configuration from [`Self::config_path()`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads the configuration at `path`, or the defaults if there is no
    /// file there.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("archive.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ArchiveConfig::from_toml("").unwrap();
        assert_eq!(config, ArchiveConfig::default());
        assert_eq!(config.database, PathBuf::from("data/archive.db"));
        assert_eq!(config.threads, None);
        assert!(config.store_partial_games);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = ArchiveConfig::from_toml(
            r#"
database = "/var/lib/games.db"
threads = 4
store_partial_games = false
"#,
        )
        .unwrap();
        assert_eq!(config.database, PathBuf::from("/var/lib/games.db"));
        assert_eq!(config.threads, Some(4));
        assert!(!config.store_partial_games);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = ArchiveConfig::from_toml("threads = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ArchiveConfig::load_from(Path::new("/nonexistent/archive.toml")).unwrap();
        assert_eq!(config, ArchiveConfig::default());
    }
}
