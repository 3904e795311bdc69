use std::path::PathBuf;

use crate::domain::value_objects::{ModuleId, PackageVersion};

/// One independently versioned API surface, fixed for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,

    /// Specification document the package is generated from
    pub spec_path: PathBuf,

    /// Version as declared by the specification document
    pub raw_version: String,

    /// Human readable title of the specification, if any
    pub title: Option<String>,

    /// Generated tree, which is also the module's git working copy
    pub working_dir: PathBuf,
}

impl Module {
    pub fn new(
        id: ModuleId,
        spec_path: impl Into<PathBuf>,
        raw_version: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id,
            spec_path: spec_path.into(),
            raw_version: raw_version.into(),
            title: None,
            working_dir: working_dir.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn normalized_version(&self) -> PackageVersion {
        PackageVersion::normalize(&self.raw_version)
    }

    /// Description used in package metadata
    pub fn description(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_version_and_description() {
        let module = Module::new(
            ModuleId::new("sell-feed").unwrap(),
            "/specs/sell-feed.json",
            "v1.3.1",
            "/work/sell-feed",
        );

        assert_eq!(module.normalized_version().as_str(), "1.3.1");
        assert_eq!(module.description(), "sell-feed");

        let module = module.with_title("Feed API");
        assert_eq!(module.description(), "Feed API");
    }
}
