use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::Dialect;

const APP_DIR_NAME: &str = "sqlscope";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not find config directory")]
    NoConfigDir,
}

/// Settings read from `config.toml`.
///
/// ```toml
/// dialect = "postgres"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub dialect: Dialect,
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads `path` when given. Otherwise loads the default file if present,
    /// falling back to defaults when it is absent.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                debug!(error = %e, "using default config");
                return Ok(Self::default());
            }
        };
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    mod load {
        use super::*;

        #[test]
        fn reads_dialect() {
            let temp_dir = TempDir::new().unwrap();
            let path = write_config(&temp_dir, "dialect = \"sqlserver\"\n");

            let config = AnalyzerConfig::load(&path).unwrap();

            assert_eq!(config.dialect, Dialect::SqlServer);
        }

        #[test]
        fn empty_file_gives_defaults() {
            let temp_dir = TempDir::new().unwrap();
            let path = write_config(&temp_dir, "");

            let config = AnalyzerConfig::load(&path).unwrap();

            assert_eq!(config, AnalyzerConfig::default());
            assert_eq!(config.dialect, Dialect::Ansi);
        }

        #[test]
        fn unknown_dialect_is_a_parse_error() {
            let temp_dir = TempDir::new().unwrap();
            let path = write_config(&temp_dir, "dialect = \"oracle\"\n");

            let result = AnalyzerConfig::load(&path);

            assert!(matches!(result, Err(ConfigError::Parse { .. })));
        }

        #[test]
        fn missing_file_is_an_io_error() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("absent.toml");

            let result = AnalyzerConfig::load(&path);

            assert!(matches!(result, Err(ConfigError::Io { .. })));
        }
    }

    mod load_or_default {
        use super::*;

        #[test]
        fn explicit_missing_path_is_an_error() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("absent.toml");

            let result = AnalyzerConfig::load_or_default(Some(&path));

            assert!(result.is_err());
        }

        #[test]
        fn explicit_path_is_loaded() {
            let temp_dir = TempDir::new().unwrap();
            let path = write_config(&temp_dir, "dialect = \"mysql\"\n");

            let config = AnalyzerConfig::load_or_default(Some(&path)).unwrap();

            assert_eq!(config.dialect, Dialect::MySql);
        }
    }

    #[test]
    fn default_path_ends_with_app_config_file() {
        if let Ok(path) = AnalyzerConfig::default_path() {
            assert!(path.ends_with("sqlscope/config.toml"));
        }
    }
}
