use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::loader::RemoteSource;

pub const APP_DIR: &str = "folio";
pub const CONFIG_FILE: &str = "config.toml";

pub const ENV_CONFIG: &str = "FOLIO_CONFIG";
pub const ENV_DATA_DIR: &str = "FOLIO_DATA_DIR";
pub const ENV_REMOTE_URL: &str = "FOLIO_REMOTE_URL";
pub const ENV_ACCESS_KEY: &str = "FOLIO_ACCESS_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no data directory is configured and none could be determined")]
    NoDataDir,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub access_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub remote: RemoteConfig,
}

impl Config {
    /// `<config dir>/folio/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(target: "folio", event = "config_missing", path = %path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` (or `FOLIO_CONFIG`, or the default location) and apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
            .or_else(Self::default_path);
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = var(ENV_REMOTE_URL).filter(|v| !v.is_empty()) {
            self.remote.url = Some(url);
        }
        if let Some(key) = var(ENV_ACCESS_KEY).filter(|v| !v.is_empty()) {
            self.remote.access_key = Some(key);
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .ok_or(ConfigError::NoDataDir)
    }

    pub fn remote_source(&self) -> Option<RemoteSource> {
        let url = self.remote.url.as_ref()?;
        Some(RemoteSource {
            url: url.clone(),
            access_key: self.remote.access_key.clone(),
            timeout: self.remote.timeout_secs.map(Duration::from_secs),
        })
    }
}
