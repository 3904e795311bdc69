//! Test fixtures for creating test data
//!
//! A [`SyncFixture`] owns a temporary root holding the specification directory and
//! the working copies, plus the configuration pointing at both.

use async_trait::async_trait;
use sdksync::domain::entities::{GeneratorConfig, Module, SyncConfig};
use sdksync::domain::value_objects::{BranchName, ModuleId, RemoteUrl};
use sdksync::infrastructure::generator::{CodeGenerator, GeneratorError};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const REMOTE_BASE: &str = "https://git.example.test";

pub struct SyncFixture {
    pub temp_dir: TempDir,
    pub settings: SyncConfig,
}

impl SyncFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let settings = SyncConfig {
            organization: "acme".to_string(),
            repo_prefix: "sdk".to_string(),
            module_suffix: String::new(),
            remote_base: REMOTE_BASE.to_string(),
            spec_dir: temp_dir.path().join("specs"),
            work_dir: temp_dir.path().join("work"),
            default_branch: "master".to_string(),
            commit_message: "Regenerated on {date}".to_string(),
            generator: GeneratorConfig {
                template_dir: None,
                ..GeneratorConfig::default()
            },
            ..SyncConfig::default()
        };
        fs::create_dir_all(&settings.spec_dir).expect("Failed to create spec directory");

        Self { temp_dir, settings }
    }

    pub fn settings(&self) -> Arc<SyncConfig> {
        Arc::new(self.settings.clone())
    }

    /// Write `<spec_dir>/<name>.json` declaring `version`
    pub fn write_spec(&self, name: &str, version: &str) -> PathBuf {
        let path = self.settings.spec_dir.join(format!("{}.json", name));
        let document = serde_json::json!({
            "openapi": "3.0.0",
            "info": { "title": format!("{} API", name), "version": version },
            "paths": {}
        });
        fs::write(&path, document.to_string()).expect("Failed to write specification");
        path
    }

    pub fn module(&self, name: &str, version: &str) -> Module {
        let id = ModuleId::new(name).expect("valid module id");
        let working_dir = self.settings.working_dir(&id);
        Module::new(id, self.settings.spec_dir.join(format!("{}.json", name)), version, working_dir)
    }

    pub fn remote(&self, name: &str) -> RemoteUrl {
        let id = ModuleId::new(name).expect("valid module id");
        self.settings.remote_url(&id).expect("valid remote url")
    }

    /// The URL the git layer sees for `name`
    pub fn remote_key(&self, name: &str) -> String {
        self.remote(name).as_git_arg().to_string()
    }

    pub fn working_dir(&self, name: &str) -> PathBuf {
        self.settings
            .working_dir(&ModuleId::new(name).expect("valid module id"))
    }
}

pub fn branch(name: &str) -> BranchName {
    BranchName::new(name).expect("valid branch name")
}

/// Generator double writing a fixed file set per module
#[derive(Default)]
pub struct FileGenerator {
    files: Mutex<HashMap<String, Vec<(String, String)>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FileGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_files(&self, module: &str, files: &[(&str, &str)]) {
        self.files.lock().unwrap().insert(
            module.to_string(),
            files
                .iter()
                .map(|(path, content)| (path.to_string(), content.to_string()))
                .collect(),
        );
    }

    pub fn fail_for(&self, module: &str) {
        self.failing.lock().unwrap().insert(module.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeGenerator for FileGenerator {
    async fn generate(&self, module: &Module, _config: &GeneratorConfig) -> Result<(), GeneratorError> {
        let name = module.id.as_str().to_string();
        self.calls.lock().unwrap().push(name.clone());

        if self.failing.lock().unwrap().contains(&name) {
            return Err(GeneratorError::CommandFailed {
                command: format!("generate {}", name),
                exit_code: 2,
                output: "invalid specification".to_string(),
            });
        }

        let files = self.files.lock().unwrap().get(&name).cloned().unwrap_or_default();
        for (relative, content) in files {
            let path = module.working_dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
            }
            fs::write(&path, content).map_err(|e| GeneratorError::io(&path, e))?;
        }
        Ok(())
    }
}
