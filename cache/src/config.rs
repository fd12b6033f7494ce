//! Cache configuration, read from a TOML file.
//!
//! ```toml
//! [cache]
//! dir = "/var/cache/hoard"
//! schema = "v4"
//! max_depth = 256
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hoard_codec::{DEFAULT_MAX_DEPTH, SchemaVersion};
use serde::Deserialize;
use thiserror::Error;

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

#[derive(Debug, Default, Deserialize)]
pub struct HoardConfig {
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Where the cache file lives. Defaults to the platform cache directory.
    pub dir: Option<PathBuf>,
    /// Data-model version used for new records.
    #[serde(default)]
    pub schema: SchemaVersion,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            schema: SchemaVersion::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CacheConfig {
    /// The configured directory, or `<platform cache dir>/hoard`.
    #[must_use]
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("hoard")))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl HoardConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        toml::from_str(&content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    /// Load from [`config_path`], or the defaults when there is no home for it.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hoard").join("config.toml"))
}
