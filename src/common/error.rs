use std::path::PathBuf;
use thiserror::Error;

use crate::application::use_cases::download_specs::DownloadSpecsError;
use crate::application::use_cases::sync_modules::SyncModulesError;
use crate::domain::entities::CatalogError;
use crate::infrastructure::filesystem::{ConfigStoreError, SpecStoreError};
use crate::infrastructure::scm::ScmError;

#[derive(Error, Debug)]
pub enum SdkSyncError {
    #[error("Git operation failed: {message}")]
    GitError {
        message: String,
        #[source]
        source: Option<ScmError>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Specification error: {message}")]
    SpecificationError {
        message: String,
        file_path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unknown module '{name}', available modules are: {}", available.join(" , "))]
    ModuleNotFound { name: String, available: Vec<String> },

    #[error("{failed} of {total} modules failed")]
    ModulesFailed { failed: usize, total: usize },

    #[error("Network operation failed: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        field: String,
        message: String,
        value: Option<String>,
    },
}

impl SdkSyncError {
    pub fn git_error_with_source(message: impl Into<String>, source: ScmError) -> Self {
        Self::GitError {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn specification_error(message: impl Into<String>, file_path: Option<PathBuf>) -> Self {
        Self::SpecificationError {
            message: message.into(),
            file_path,
            source: None,
        }
    }

    pub fn specification_error_with_source(
        message: impl Into<String>,
        file_path: Option<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SpecificationError {
            message: message.into(),
            file_path,
            source: Some(Box::new(source)),
        }
    }

    pub fn module_not_found(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::ModuleNotFound {
            name: name.into(),
            available,
        }
    }

    pub fn modules_failed(failed: usize, total: usize) -> Self {
        Self::ModulesFailed { failed, total }
    }

    pub fn network_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    /// Input errors are raised before any side effect on a repository.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::ModuleNotFound { .. }
                | Self::ConfigError { .. }
                | Self::ValidationError { .. }
                | Self::SpecificationError { .. }
        )
    }

    /// Process exit status: 2 for input errors, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_input_error() {
            2
        } else {
            1
        }
    }
}

impl From<CatalogError> for SdkSyncError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::UnknownModule { name, available } => {
                Self::module_not_found(name, available)
            }
        }
    }
}

impl From<ConfigStoreError> for SdkSyncError {
    fn from(error: ConfigStoreError) -> Self {
        match error {
            ConfigStoreError::WriteFailed { path, source } => Self::filesystem_error_with_source(
                "Failed to write configuration",
                Some(path),
                source,
            ),
            ConfigStoreError::AlreadyExists(path) => Self::config_error(format!(
                "File {} already exists. Use --force to overwrite.",
                path.display()
            )),
            other => Self::config_error_with_source("Failed to load configuration", other),
        }
    }
}

impl From<SpecStoreError> for SdkSyncError {
    fn from(error: SpecStoreError) -> Self {
        let path = error.path().map(PathBuf::from);
        match error {
            SpecStoreError::DirectoryNotFound(dir) => Self::specification_error(
                format!("Specification directory not found: {}", dir.display()),
                Some(dir),
            ),
            other => Self::specification_error_with_source(other.to_string(), path, other),
        }
    }
}

impl From<SyncModulesError> for SdkSyncError {
    fn from(error: SyncModulesError) -> Self {
        match error {
            SyncModulesError::UnknownModule(e) => e.into(),
            SyncModulesError::Catalog(e) => e.into(),
            SyncModulesError::InvalidBranch(e) => {
                Self::validation_error("branch", e.to_string(), None)
            }
        }
    }
}

impl From<DownloadSpecsError> for SdkSyncError {
    fn from(error: DownloadSpecsError) -> Self {
        match error {
            DownloadSpecsError::UnknownModule(e) => e.into(),
            DownloadSpecsError::NothingConfigured => {
                Self::config_error("No specification downloads are configured")
            }
            other @ DownloadSpecsError::Download { .. } => {
                Self::network_error_with_source(other.to_string(), other)
            }
        }
    }
}
