use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::services::repository_session::{
    GitOperation, RepositorySession, SessionError, TagPublication,
};
use crate::domain::entities::{Module, RemoteState, SyncConfig};
use crate::domain::value_objects::{BranchName, ModuleId, PackageVersion, RemoteUrl};
use crate::infrastructure::generator::{CodeGenerator, GeneratorError};
use crate::infrastructure::scm::ScmOperations;

/// How the generated tree reaches the remote branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDecision {
    /// The branch does not exist remotely yet
    NewBranch,
    /// The branch exists and the generated tree differs from it
    Commit,
    /// The branch exists and already holds the generated tree
    NoChange,
}

/// Steps of one module synchronization, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Start,
    Checked,
    BranchReady,
    Cleared,
    Generated,
    Decided(PublishDecision),
    Published,
    Tagged,
    Done,
}

#[derive(Debug, Error)]
pub enum SyncModuleError {
    #[error("Module '{module}': {source}")]
    GitOperationFailed {
        module: ModuleId,
        operation: GitOperation,
        #[source]
        source: SessionError,
    },

    #[error("Module '{module}': generation failed: {source}")]
    GenerationFailed {
        module: ModuleId,
        #[source]
        source: GeneratorError,
    },

    #[error("Module '{module}': {message}")]
    InvalidInput { module: ModuleId, message: String },
}

impl SyncModuleError {
    pub fn module(&self) -> &ModuleId {
        match self {
            Self::GitOperationFailed { module, .. }
            | Self::GenerationFailed { module, .. }
            | Self::InvalidInput { module, .. } => module,
        }
    }

    /// The git step that failed, if the failure came from git
    pub fn failed_operation(&self) -> Option<GitOperation> {
        match self {
            Self::GitOperationFailed { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn invalid_input(module: &ModuleId, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            module: module.clone(),
            message: message.into(),
        }
    }
}

/// What one synchronization did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSyncOutcome {
    pub module: ModuleId,
    pub branch: BranchName,
    pub version: PackageVersion,
    pub decision: PublishDecision,
    pub is_new_branch: bool,
    pub is_first_commit: bool,
    pub committed: bool,
    pub tag: TagPublication,
    /// States visited, `Start` through `Done`
    pub states: Vec<SyncState>,
}

/// Publishes one module's freshly generated tree to its repository
pub struct SyncModule {
    scm: Arc<dyn ScmOperations>,
    generator: Arc<dyn CodeGenerator>,
    config: Arc<SyncConfig>,
}

impl SyncModule {
    pub fn new(
        scm: Arc<dyn ScmOperations>,
        generator: Arc<dyn CodeGenerator>,
        config: Arc<SyncConfig>,
    ) -> Self {
        Self {
            scm,
            generator,
            config,
        }
    }

    /// Run the whole cycle for `module`, publishing to `remote` on `branch`
    pub async fn execute(
        &self,
        module: &Module,
        remote: RemoteUrl,
        branch: &BranchName,
    ) -> Result<ModuleSyncOutcome, SyncModuleError> {
        let session = RepositorySession::open(
            self.scm.clone(),
            module,
            remote,
            self.config.commit_author.clone(),
        );

        let mut run = SyncRun {
            workflow: self,
            module,
            branch,
            version: module.normalized_version(),
            session,
            remote_state: RemoteState::empty(),
            is_new_branch: false,
            is_first_commit: false,
            committed: false,
            tag: None,
        };

        let mut states = Vec::new();
        let mut state = SyncState::Start;
        while state != SyncState::Done {
            states.push(state);
            state = run.step(state).await?;
        }
        states.push(SyncState::Done);

        let tag = run.tag.take().ok_or_else(|| {
            SyncModuleError::invalid_input(&module.id, "workflow finished without publishing a tag")
        })?;

        Ok(ModuleSyncOutcome {
            module: module.id.clone(),
            branch: branch.clone(),
            version: run.version,
            decision: decision_of(&states).unwrap_or(PublishDecision::NoChange),
            is_new_branch: run.is_new_branch,
            is_first_commit: run.is_first_commit,
            committed: run.committed,
            tag,
            states,
        })
    }
}

fn decision_of(states: &[SyncState]) -> Option<PublishDecision> {
    states.iter().find_map(|state| match state {
        SyncState::Decided(decision) => Some(*decision),
        _ => None,
    })
}

/// Mutable context of one `execute` call
struct SyncRun<'a> {
    workflow: &'a SyncModule,
    module: &'a Module,
    branch: &'a BranchName,
    version: PackageVersion,
    session: RepositorySession,
    remote_state: RemoteState,
    is_new_branch: bool,
    is_first_commit: bool,
    committed: bool,
    tag: Option<TagPublication>,
}

impl SyncRun<'_> {
    fn git_failure(&self, source: SessionError) -> SyncModuleError {
        SyncModuleError::GitOperationFailed {
            module: self.module.id.clone(),
            operation: source.operation(),
            source,
        }
    }

    async fn step(&mut self, state: SyncState) -> Result<SyncState, SyncModuleError> {
        let next = match state {
            SyncState::Start => {
                self.remote_state = match self.session.checkout().await {
                    Ok(remote_state) => remote_state,
                    Err(e) => return Err(self.git_failure(e)),
                };
                SyncState::Checked
            }
            SyncState::Checked => {
                self.is_new_branch = match self
                    .session
                    .select_branch(self.branch, &self.remote_state)
                    .await
                {
                    Ok(is_new) => is_new,
                    Err(e) => return Err(self.git_failure(e)),
                };
                SyncState::BranchReady
            }
            SyncState::BranchReady => {
                if let Err(e) = self.session.clear_working_tree() {
                    return Err(self.git_failure(e));
                }
                SyncState::Cleared
            }
            SyncState::Cleared => {
                self.workflow
                    .generator
                    .generate(self.module, &self.workflow.config.generator)
                    .await
                    .map_err(|source| SyncModuleError::GenerationFailed {
                        module: self.module.id.clone(),
                        source,
                    })?;
                SyncState::Generated
            }
            SyncState::Generated => SyncState::Decided(self.decide().await?),
            SyncState::Decided(decision) => {
                self.publish(decision).await?;
                SyncState::Published
            }
            SyncState::Published => {
                let exists = self.remote_state.has_tag(&self.version);
                match self.session.publish_version_tag(&self.version, exists).await {
                    Ok(publication) => self.tag = Some(publication),
                    Err(e) => return Err(self.git_failure(e)),
                }
                SyncState::Tagged
            }
            SyncState::Tagged | SyncState::Done => SyncState::Done,
        };

        info!(module = %self.module.id, from = ?state, to = ?next, "sync transition");
        Ok(next)
    }

    async fn decide(&mut self) -> Result<PublishDecision, SyncModuleError> {
        if self.is_new_branch {
            return Ok(PublishDecision::NewBranch);
        }

        self.is_first_commit = !self.remote_state.has_tag(&self.version);
        match self.session.has_changes().await {
            Ok(true) => Ok(PublishDecision::Commit),
            Ok(false) => Ok(PublishDecision::NoChange),
            Err(e) => Err(self.git_failure(e)),
        }
    }

    async fn publish(&mut self, decision: PublishDecision) -> Result<(), SyncModuleError> {
        let message = self.workflow.config.render_commit_message(&Utc::now());

        let result = match decision {
            PublishDecision::NewBranch => self.publish_new_branch(&message).await,
            PublishDecision::Commit => match self.session.commit_all(&message, false).await {
                Ok(()) => {
                    self.committed = true;
                    self.session.publish_branch(self.is_first_commit).await
                }
                Err(e) => Err(e),
            },
            PublishDecision::NoChange => {
                info!(module = %self.module.id, "generated tree unchanged, branch left as is");
                Ok(())
            }
        };

        result.map_err(|e| self.git_failure(e))
    }

    async fn publish_new_branch(&mut self, message: &str) -> Result<(), SessionError> {
        let has_changes = self.session.has_changes().await?;
        if has_changes || !self.session.is_cloned() {
            if !has_changes {
                warn!(module = %self.module.id, "nothing generated, creating an empty root commit");
            }
            self.session.commit_all(message, !has_changes).await?;
            self.committed = true;
        }
        self.session.publish_branch(false).await
    }
}
