use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use super::sync_module::{ModuleSyncOutcome, SyncModule, SyncModuleError};
use crate::domain::entities::{CatalogEntry, CatalogError, SyncConfig};
use crate::domain::value_objects::{BranchName, BranchNameError, ModuleId, RemoteUrl};
use crate::infrastructure::filesystem::{GitCredentials, SpecStore, SpecStoreError};
use crate::infrastructure::generator::CodeGenerator;
use crate::infrastructure::scm::ScmOperations;

/// Errors raised before any module is touched
#[derive(Debug, Error)]
pub enum SyncModulesError {
    #[error(transparent)]
    UnknownModule(#[from] CatalogError),

    #[error("Specification catalog unavailable: {0}")]
    Catalog(#[from] SpecStoreError),

    #[error("Invalid branch name: {0}")]
    InvalidBranch(#[from] BranchNameError),
}

/// Options of a batch run
#[derive(Debug, Clone, Default)]
pub struct SyncModulesConfig {
    /// Only this module (None = every module in the catalog)
    pub module: Option<String>,

    /// Target branch (None = configured default branch)
    pub branch: Option<String>,

    /// Modules processed concurrently (None = 1, 0 = CPU count)
    pub jobs: Option<usize>,
}

impl SyncModulesConfig {
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    fn effective_jobs(&self) -> usize {
        match self.jobs {
            None => 1,
            Some(0) => num_cpus::get().max(1),
            Some(jobs) => jobs,
        }
    }
}

/// Outcome of one module within a batch
#[derive(Debug)]
pub struct ModuleReport {
    pub module: ModuleId,
    pub result: Result<ModuleSyncOutcome, SyncModuleError>,
}

/// Per-module outcomes, in catalog order
#[derive(Debug, Default)]
pub struct SyncModulesReport {
    pub modules: Vec<ModuleReport>,
}

impl SyncModulesReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ModuleSyncOutcome> {
        self.modules.iter().filter_map(|report| report.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SyncModuleError> {
        self.modules.iter().filter_map(|report| report.result.as_ref().err())
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    pub fn total_count(&self) -> usize {
        self.modules.len()
    }
}

/// Synchronizes every selected module, isolating failures per module
pub struct SyncModulesUseCase {
    config: SyncModulesConfig,
    settings: Arc<SyncConfig>,
    scm: Arc<dyn ScmOperations>,
    generator: Arc<dyn CodeGenerator>,
    credentials: Option<GitCredentials>,
}

impl SyncModulesUseCase {
    pub fn new(
        config: SyncModulesConfig,
        settings: Arc<SyncConfig>,
        scm: Arc<dyn ScmOperations>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            config,
            settings,
            scm,
            generator,
            credentials: None,
        }
    }

    /// Embed `credentials` into every https remote
    pub fn with_credentials(mut self, credentials: Option<GitCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub async fn execute(&self) -> Result<SyncModulesReport, SyncModulesError> {
        let branch = BranchName::new(
            self.config
                .branch
                .as_deref()
                .unwrap_or(&self.settings.default_branch),
        )?;

        let store = SpecStore::new(&self.settings.spec_dir);
        let catalog = store.discover()?;
        let selected = catalog.select(self.config.module.as_deref())?;

        let jobs = self.config.effective_jobs();
        info!(
            modules = selected.len(),
            branch = %branch,
            jobs,
            "synchronizing modules"
        );

        let workflow = SyncModule::new(self.scm.clone(), self.generator.clone(), self.settings.clone());
        let modules = stream::iter(selected)
            .map(|entry| self.sync_entry(&workflow, &store, entry, &branch))
            .buffered(jobs)
            .collect::<Vec<_>>()
            .await;

        Ok(SyncModulesReport { modules })
    }

    async fn sync_entry(
        &self,
        workflow: &SyncModule,
        store: &SpecStore,
        entry: &CatalogEntry,
        branch: &BranchName,
    ) -> ModuleReport {
        let result = self.run_entry(workflow, store, entry, branch).await;

        match &result {
            Ok(outcome) => info!(
                module = %entry.id,
                decision = ?outcome.decision,
                tag = %outcome.tag.tag,
                "module synchronized"
            ),
            Err(e) => error!(module = %entry.id, "{}", e),
        }

        ModuleReport {
            module: entry.id.clone(),
            result,
        }
    }

    async fn run_entry(
        &self,
        workflow: &SyncModule,
        store: &SpecStore,
        entry: &CatalogEntry,
        branch: &BranchName,
    ) -> Result<ModuleSyncOutcome, SyncModuleError> {
        let module = store
            .load_module(entry, self.settings.working_dir(&entry.id))
            .map_err(|e| SyncModuleError::invalid_input(&entry.id, e.to_string()))?;
        let remote = self
            .remote_for(&entry.id)
            .map_err(|e| SyncModuleError::invalid_input(&entry.id, e))?;

        info!(
            module = %module.id,
            version = %module.raw_version,
            normalized = %module.normalized_version(),
            remote = %remote,
            authenticated = remote.has_credentials(),
            "synchronizing module"
        );
        workflow.execute(&module, remote, branch).await
    }

    fn remote_for(&self, module: &ModuleId) -> Result<RemoteUrl, String> {
        let remote = self.settings.remote_url(module).map_err(|e| e.to_string())?;
        match &self.credentials {
            Some(credentials) => remote
                .with_credentials(&credentials.username, &credentials.token)
                .map_err(|e| e.to_string()),
            None => Ok(remote),
        }
    }
}
