use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

use crate::domain::entities::{CatalogEntry, Module, ModuleCatalog};
use crate::domain::value_objects::ModuleId;

/// Specification store related errors
#[derive(Debug, Error)]
pub enum SpecStoreError {
    #[error("Specification directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Specification directory scan failed: {0}")]
    ScanFailed(#[from] walkdir::Error),

    #[error("Specification file read failed: {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Specification file is not valid JSON: {path}: {source}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Specification file declares no info.version: {0}")]
    MissingVersion(PathBuf),
}

impl SpecStoreError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::DirectoryNotFound(path) | Self::MissingVersion(path) => Some(path),
            Self::ReadFailed { path, .. } | Self::InvalidDocument { path, .. } => Some(path),
            Self::ScanFailed(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpecHeader {
    info: Option<SpecInfo>,
}

#[derive(Debug, Deserialize)]
struct SpecInfo {
    version: Option<serde_json::Value>,
    title: Option<String>,
}

/// Metadata read from a specification document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMetadata {
    pub version: String,
    pub title: Option<String>,
}

/// Directory of `<module>.json` specification documents
#[derive(Debug, Clone)]
pub struct SpecStore {
    spec_dir: PathBuf,
}

impl SpecStore {
    pub fn new(spec_dir: impl Into<PathBuf>) -> Self {
        Self {
            spec_dir: spec_dir.into(),
        }
    }

    pub fn spec_dir(&self) -> &Path {
        &self.spec_dir
    }

    /// Where the document of `module` is stored
    pub fn spec_path(&self, module: &str) -> PathBuf {
        self.spec_dir.join(format!("{}.json", module))
    }

    /// Every `*.json` file directly inside the specification directory
    pub fn discover(&self) -> Result<ModuleCatalog, SpecStoreError> {
        if !self.spec_dir.is_dir() {
            return Err(SpecStoreError::DirectoryNotFound(self.spec_dir.clone()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.spec_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("json")
            {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            match ModuleId::new(stem) {
                Ok(id) => entries.push(CatalogEntry {
                    id,
                    spec_path: path.to_path_buf(),
                }),
                Err(e) => warn!(path = %path.display(), "skipping specification: {}", e),
            }
        }

        Ok(ModuleCatalog::new(entries))
    }

    /// Read `info.version` and `info.title`
    pub fn read_metadata(&self, spec_path: &Path) -> Result<SpecMetadata, SpecStoreError> {
        let contents = fs::read_to_string(spec_path).map_err(|source| SpecStoreError::ReadFailed {
            path: spec_path.to_path_buf(),
            source,
        })?;

        let header: SpecHeader =
            serde_json::from_str(&contents).map_err(|source| SpecStoreError::InvalidDocument {
                path: spec_path.to_path_buf(),
                source,
            })?;

        let info = header
            .info
            .ok_or_else(|| SpecStoreError::MissingVersion(spec_path.to_path_buf()))?;

        let version = match info.version {
            Some(serde_json::Value::String(version)) if !version.trim().is_empty() => version,
            // Some documents declare the version as a bare number
            Some(serde_json::Value::Number(number)) => number.to_string(),
            _ => return Err(SpecStoreError::MissingVersion(spec_path.to_path_buf())),
        };

        Ok(SpecMetadata {
            version,
            title: info.title.filter(|title| !title.trim().is_empty()),
        })
    }

    /// Build the run-scoped [`Module`] for a catalog entry
    pub fn load_module(
        &self,
        entry: &CatalogEntry,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Module, SpecStoreError> {
        let metadata = self.read_metadata(&entry.spec_path)?;
        let module = Module::new(
            entry.id.clone(),
            entry.spec_path.clone(),
            metadata.version,
            working_dir,
        );

        Ok(match metadata.title {
            Some(title) => module.with_title(title),
            None => module,
        })
    }
}
