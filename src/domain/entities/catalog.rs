use std::path::PathBuf;
use thiserror::Error;

use crate::domain::value_objects::ModuleId;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Unknown module '{name}', available modules are: {}", available.join(" , "))]
    UnknownModule { name: String, available: Vec<String> },
}

/// A discovered specification document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ModuleId,
    pub spec_path: PathBuf,
}

/// All modules available for synchronization, ordered by identifier
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModuleCatalog {
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries.dedup_by(|a, b| a.id == b.id);
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn module_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.to_string()).collect()
    }

    /// Every module when `filter` is `None`, otherwise exactly the named one
    pub fn select(&self, filter: Option<&str>) -> Result<Vec<&CatalogEntry>, CatalogError> {
        match filter {
            None => Ok(self.entries.iter().collect()),
            Some(name) => self
                .entries
                .iter()
                .find(|entry| entry.id.as_str() == name)
                .map(|entry| vec![entry])
                .ok_or_else(|| CatalogError::UnknownModule {
                    name: name.to_string(),
                    available: self.module_names(),
                }),
        }
    }
}
