//! Configuration for the shirokuma knowledge base.
//!
//! Resolution order: built-in defaults, then `config.yaml` in the data
//! directory, then `SHIROKUMA_*` environment variables. The data directory
//! itself is found by an explicit flag, `SHIROKUMA_DATA_DIR`, or walking up
//! from the current directory looking for `.shirokuma/`.

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the data directory discovered by walking up.
pub const DATA_DIR_NAME: &str = ".shirokuma";
/// Name of the config file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Resolved configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data root: the projection tree and index live here.
    pub data_dir: PathBuf,

    /// Where `export` writes its timestamped directories.
    pub export_dir: PathBuf,

    /// Environment profile name (free-form label, e.g. "default", "test").
    pub env: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_DIR_NAME),
            export_dir: PathBuf::from(DATA_DIR_NAME).join("exports"),
            env: "default".to_owned(),
        }
    }
}

impl Config {
    /// Loads configuration for the given data directory: defaults, then
    /// `<data_dir>/config.yaml`, then `SHIROKUMA_*` env vars.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let defaults = Config {
            data_dir: data_dir.to_owned(),
            export_dir: data_dir.join("exports"),
            env: "default".to_owned(),
        };
        let figment = Figment::from(Serialized::defaults(defaults))
            .merge(Yaml::file(data_dir.join(CONFIG_FILE_NAME)))
            .merge(Env::prefixed("SHIROKUMA_"));
        figment.extract().map_err(|e| ConfigError::Extract(Box::new(e)))
    }

    /// Saves the config file into the data directory.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(self.data_dir.join(CONFIG_FILE_NAME), yaml)?;
        Ok(())
    }
}

/// Resolves the data directory: explicit flag value, `SHIROKUMA_DATA_DIR`,
/// the nearest `.shirokuma/` walking up from the current directory, or the
/// default (`.shirokuma` in the current directory).
pub fn resolve_data_dir(flag_value: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag_value {
        return dir.to_owned();
    }
    if let Some(dir) = env::var_os("SHIROKUMA_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    find_data_dir().unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

/// Walks up from the current directory looking for `.shirokuma/`.
pub fn find_data_dir() -> Option<PathBuf> {
    let mut dir = env::current_dir().ok()?;
    loop {
        let candidate = dir.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.data_dir, tmp.path());
        assert_eq!(config.export_dir, tmp.path().join("exports"));
        assert_eq!(config.env, "default");
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "export_dir: /tmp/elsewhere\nenv: staging\n",
        )
        .unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.env, "staging");
    }

    #[test]
    fn save_then_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            data_dir: tmp.path().to_owned(),
            export_dir: tmp.path().join("out"),
            env: "test".to_owned(),
        };
        config.save().unwrap();
        let loaded = Config::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn explicit_flag_wins() {
        let dir = resolve_data_dir(Some(Path::new("/explicit")));
        assert_eq!(dir, PathBuf::from("/explicit"));
    }
}
