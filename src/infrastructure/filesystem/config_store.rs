use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::common::templates::get_config_template;
use crate::domain::entities::SyncConfig;

/// Default configuration file name, looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "sdksync.yaml";

const USERNAME_ENV: &str = "GITHUB_USERNAME";
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file read failed: {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file write failed: {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("YAML parsing failed: {0}")]
    YamlParsingFailed(#[from] serde_yaml::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Token based credentials for https remotes, taken from the environment only
#[derive(Clone, PartialEq, Eq)]
pub struct GitCredentials {
    pub username: String,
    pub token: String,
}

impl GitCredentials {
    /// `GITHUB_USERNAME` and `GITHUB_TOKEN`, when both are set and non-empty
    pub fn from_env() -> Option<Self> {
        let username = std::env::var(USERNAME_ENV).ok()?;
        let token = std::env::var(TOKEN_ENV).ok()?;
        Self::from_parts(username, token)
    }

    fn from_parts(username: String, token: String) -> Option<Self> {
        if username.trim().is_empty() || token.trim().is_empty() {
            return None;
        }
        Some(Self { username, token })
    }
}

impl fmt::Debug for GitCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitCredentials")
            .field("username", &self.username)
            .field("token", &"***")
            .finish()
    }
}

/// Reads and writes `sdksync.yaml`
#[derive(Debug, Clone, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load the configuration at `config_path`.
    ///
    /// A missing file yields the built-in defaults. Relative directories are resolved
    /// against the directory holding the configuration file.
    pub fn load(&self, config_path: &Path) -> Result<SyncConfig, ConfigStoreError> {
        let base_dir = config_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = if config_path.exists() {
            let contents =
                fs::read_to_string(config_path).map_err(|source| ConfigStoreError::ReadFailed {
                    path: config_path.to_path_buf(),
                    source,
                })?;
            debug!(path = %config_path.display(), "loaded configuration");
            self.parse(&contents)?
        } else {
            debug!(path = %config_path.display(), "configuration file not found, using defaults");
            SyncConfig::default()
        };

        Ok(config.rooted_at(&base_dir))
    }

    /// Parse and validate configuration text
    pub fn parse(&self, contents: &str) -> Result<SyncConfig, ConfigStoreError> {
        let config: SyncConfig = if contents.trim().is_empty() {
            SyncConfig::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        self.validate(&config)?;
        Ok(config)
    }

    fn validate(&self, config: &SyncConfig) -> Result<(), ConfigStoreError> {
        config
            .validate()
            .map_err(|e| ConfigStoreError::ValidationFailed(e.to_string()))?;

        config
            .default_branch()
            .map_err(|e| ConfigStoreError::ValidationFailed(format!("default_branch: {}", e)))?;

        url::Url::parse(&config.remote_base)
            .map_err(|e| ConfigStoreError::ValidationFailed(format!("remote_base: {}", e)))?;

        for (module, url) in &config.downloads {
            url::Url::parse(url).map_err(|e| {
                ConfigStoreError::ValidationFailed(format!("downloads.{}: {}", module, e))
            })?;
        }

        Ok(())
    }

    /// Write the commented default configuration
    pub fn write_default(&self, config_path: &Path, force: bool) -> Result<(), ConfigStoreError> {
        if config_path.exists() && !force {
            return Err(ConfigStoreError::AlreadyExists(config_path.to_path_buf()));
        }

        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigStoreError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(config_path, get_config_template()).map_err(|source| {
            ConfigStoreError::WriteFailed {
                path: config_path.to_path_buf(),
                source,
            }
        })
    }
}
