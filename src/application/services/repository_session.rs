use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entities::{CommitAuthor, Module, RemoteState};
use crate::domain::value_objects::{BranchName, ModuleId, PackageVersion, RemoteUrl};
use crate::infrastructure::filesystem::working_tree;
use crate::infrastructure::scm::{PushRequest, ScmError, ScmOperations};

/// Name under which the module remote is registered
pub const REMOTE_NAME: &str = "origin";

/// Lifecycle of a [`RepositorySession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Cloned,
    Initialized,
    BranchSelected,
    Committed,
    Pushed,
    TagPublished,
}

/// Git step a session failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOperation {
    PrepareWorkingCopy,
    ReadRemote,
    Clone,
    Init,
    AddRemote,
    ConfigureIdentity,
    ListBranches,
    ListTags,
    SelectBranch,
    ClearWorkingTree,
    DetectChanges,
    Commit,
    PushBranch,
    DeleteTag,
    CreateTag,
    PushTag,
}

impl fmt::Display for GitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PrepareWorkingCopy => "prepare working copy",
            Self::ReadRemote => "read remote",
            Self::Clone => "clone",
            Self::Init => "init",
            Self::AddRemote => "add remote",
            Self::ConfigureIdentity => "configure identity",
            Self::ListBranches => "list branches",
            Self::ListTags => "list tags",
            Self::SelectBranch => "select branch",
            Self::ClearWorkingTree => "clear working tree",
            Self::DetectChanges => "detect changes",
            Self::Commit => "commit",
            Self::PushBranch => "push branch",
            Self::DeleteTag => "delete tag",
            Self::CreateTag => "create tag",
            Self::PushTag => "push tag",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{operation} failed: {source}")]
    Git {
        operation: GitOperation,
        #[source]
        source: ScmError,
    },

    #[error("{operation} failed at {path}: {source}")]
    WorkingTree {
        operation: GitOperation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot {operation} while the session is {state:?}")]
    InvalidState {
        operation: GitOperation,
        state: SessionState,
    },
}

impl SessionError {
    pub fn operation(&self) -> GitOperation {
        match self {
            Self::Git { operation, .. }
            | Self::WorkingTree { operation, .. }
            | Self::InvalidState { operation, .. } => *operation,
        }
    }
}

/// Result of republishing a version tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPublication {
    pub tag: PackageVersion,
    /// Commit the tag points at
    pub revision: String,
    /// Whether an earlier tag of the same name was deleted first
    pub replaced: bool,
}

/// One module's working copy bound to its remote, for a single run.
///
/// Operations must follow the session lifecycle:
/// `checkout`, `select_branch`, then working tree and commit operations, then
/// `publish_branch` and `publish_version_tag`.
pub struct RepositorySession {
    scm: Arc<dyn ScmOperations>,
    module: ModuleId,
    remote: RemoteUrl,
    working_dir: PathBuf,
    author: CommitAuthor,
    state: SessionState,
    branch: Option<BranchName>,
    new_branch: bool,
    cloned: bool,
}

fn git_error(operation: GitOperation) -> impl FnOnce(ScmError) -> SessionError {
    move |source| SessionError::Git { operation, source }
}

impl RepositorySession {
    /// Bind `module` to `remote`. Nothing is read or written yet.
    pub fn open(
        scm: Arc<dyn ScmOperations>,
        module: &Module,
        remote: RemoteUrl,
        author: CommitAuthor,
    ) -> Self {
        Self {
            scm,
            module: module.id.clone(),
            remote,
            working_dir: module.working_dir.clone(),
            author,
            state: SessionState::Uninitialized,
            branch: None,
            new_branch: false,
            cloned: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the working copy was cloned and therefore carries history
    pub fn is_cloned(&self) -> bool {
        self.cloned
    }

    fn require(&self, operation: GitOperation, allowed: &[SessionState]) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn current_branch(&self, operation: GitOperation) -> Result<&BranchName, SessionError> {
        self.branch.as_ref().ok_or(SessionError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn transition(&mut self, next: SessionState) {
        debug!(module = %self.module, from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// Start from a fresh working copy: clone a populated remote, otherwise init a new
    /// repository with the remote registered. Returns the remote branches and tags.
    pub async fn checkout(&mut self) -> Result<RemoteState, SessionError> {
        self.require(GitOperation::Clone, &[SessionState::Uninitialized])?;

        working_tree::remove_dir_if_exists(&self.working_dir).map_err(|source| {
            SessionError::WorkingTree {
                operation: GitOperation::PrepareWorkingCopy,
                path: self.working_dir.clone(),
                source,
            }
        })?;

        let url = self.remote.as_git_arg();
        let populated = self
            .scm
            .is_remote_populated(url)
            .await
            .map_err(git_error(GitOperation::ReadRemote))?;

        if populated {
            self.scm
                .clone_repository(url, &self.working_dir)
                .await
                .map_err(git_error(GitOperation::Clone))?;
            info!(module = %self.module, remote = %self.remote, "cloned");
            self.cloned = true;
            self.transition(SessionState::Cloned);
        } else {
            self.scm
                .init_repository(&self.working_dir)
                .await
                .map_err(git_error(GitOperation::Init))?;
            self.scm
                .add_remote(&self.working_dir, REMOTE_NAME, url)
                .await
                .map_err(git_error(GitOperation::AddRemote))?;
            info!(module = %self.module, remote = %self.remote, "remote empty or unreadable, initialized");
            self.transition(SessionState::Initialized);
        }

        self.scm
            .configure_identity(&self.working_dir, &self.author.name, &self.author.email)
            .await
            .map_err(git_error(GitOperation::ConfigureIdentity))?;

        if self.state == SessionState::Initialized {
            return Ok(RemoteState::empty());
        }

        let branches = self
            .scm
            .remote_branches(&self.working_dir, REMOTE_NAME)
            .await
            .map_err(git_error(GitOperation::ListBranches))?;
        let tags = self
            .scm
            .tags(&self.working_dir)
            .await
            .map_err(git_error(GitOperation::ListTags))?;

        Ok(RemoteState::new(branches, tags))
    }

    /// Check out `branch`, creating it locally when the remote does not have it.
    /// Returns whether the branch is new.
    pub async fn select_branch(
        &mut self,
        branch: &BranchName,
        remote_state: &RemoteState,
    ) -> Result<bool, SessionError> {
        self.require(
            GitOperation::SelectBranch,
            &[SessionState::Cloned, SessionState::Initialized],
        )?;

        self.new_branch = !remote_state.has_branch(branch);
        let result = if self.new_branch {
            self.scm.create_branch(&self.working_dir, branch.as_str()).await
        } else {
            self.scm.checkout(&self.working_dir, branch.as_str()).await
        };
        result.map_err(git_error(GitOperation::SelectBranch))?;

        info!(module = %self.module, branch = %branch, new = self.new_branch, "branch selected");
        self.branch = Some(branch.clone());
        self.transition(SessionState::BranchSelected);
        Ok(self.new_branch)
    }

    /// Remove all non-hidden top-level entries of the working copy
    pub fn clear_working_tree(&self) -> Result<usize, SessionError> {
        self.require(GitOperation::ClearWorkingTree, &[SessionState::BranchSelected])?;

        let removed = working_tree::clear_generated_content(&self.working_dir).map_err(|source| {
            SessionError::WorkingTree {
                operation: GitOperation::ClearWorkingTree,
                path: self.working_dir.clone(),
                source,
            }
        })?;
        debug!(module = %self.module, removed = removed.len(), "working tree cleared");
        Ok(removed.len())
    }

    /// Whether the working tree differs from the last commit on the branch
    pub async fn has_changes(&self) -> Result<bool, SessionError> {
        self.require(GitOperation::DetectChanges, &[SessionState::BranchSelected])?;
        self.scm
            .has_changes(&self.working_dir)
            .await
            .map_err(git_error(GitOperation::DetectChanges))
    }

    /// Stage everything and commit
    pub async fn commit_all(&mut self, message: &str, allow_empty: bool) -> Result<(), SessionError> {
        self.require(GitOperation::Commit, &[SessionState::BranchSelected])?;

        self.scm
            .add_all(&self.working_dir)
            .await
            .map_err(git_error(GitOperation::Commit))?;
        self.scm
            .commit(&self.working_dir, message, allow_empty)
            .await
            .map_err(git_error(GitOperation::Commit))?;

        info!(module = %self.module, "committed");
        self.transition(SessionState::Committed);
        Ok(())
    }

    /// Push the selected branch.
    ///
    /// A new branch is pushed with upstream tracking and then pushed again. An existing
    /// branch is force-pushed, followed by a tracking push when `is_first_commit`.
    pub async fn publish_branch(&mut self, is_first_commit: bool) -> Result<(), SessionError> {
        self.require(
            GitOperation::PushBranch,
            &[SessionState::BranchSelected, SessionState::Committed],
        )?;
        let branch = self.current_branch(GitOperation::PushBranch)?.as_str().to_string();

        let pushes = if self.new_branch {
            vec![
                PushRequest::new(REMOTE_NAME, &branch).set_upstream(),
                PushRequest::new(REMOTE_NAME, &branch),
            ]
        } else {
            let mut pushes = vec![PushRequest::new(REMOTE_NAME, &branch).force()];
            if is_first_commit {
                pushes.push(PushRequest::new(REMOTE_NAME, &branch).set_upstream());
            }
            pushes
        };

        for request in &pushes {
            self.scm
                .push(&self.working_dir, request)
                .await
                .map_err(git_error(GitOperation::PushBranch))?;
            debug!(module = %self.module, "{}", request);
        }

        info!(module = %self.module, branch = %branch, "branch published");
        self.transition(SessionState::Pushed);
        Ok(())
    }

    /// Point tag `version` at `HEAD` on the remote, deleting an existing tag of the same
    /// name locally and remotely first
    pub async fn publish_version_tag(
        &mut self,
        version: &PackageVersion,
        exists_remotely: bool,
    ) -> Result<TagPublication, SessionError> {
        self.require(
            GitOperation::CreateTag,
            &[
                SessionState::BranchSelected,
                SessionState::Committed,
                SessionState::Pushed,
            ],
        )?;
        let tag = version.as_str();
        let tag_ref = format!("refs/tags/{}", tag);

        if exists_remotely {
            let local_tags = self
                .scm
                .tags(&self.working_dir)
                .await
                .map_err(git_error(GitOperation::ListTags))?;
            if local_tags.iter().any(|existing| existing == tag) {
                self.scm
                    .delete_tag(&self.working_dir, tag)
                    .await
                    .map_err(git_error(GitOperation::DeleteTag))?;
            }
            self.scm
                .push(&self.working_dir, &PushRequest::new(REMOTE_NAME, &tag_ref).delete())
                .await
                .map_err(git_error(GitOperation::DeleteTag))?;
            info!(module = %self.module, tag, "existing tag deleted");
        }

        self.scm
            .create_tag(&self.working_dir, tag)
            .await
            .map_err(git_error(GitOperation::CreateTag))?;
        self.scm
            .push(&self.working_dir, &PushRequest::new(REMOTE_NAME, &tag_ref).force())
            .await
            .map_err(git_error(GitOperation::PushTag))?;

        let revision = self
            .scm
            .head_revision(&self.working_dir)
            .await
            .map_err(git_error(GitOperation::CreateTag))?;

        info!(module = %self.module, tag, revision = %revision, "tag published");
        self.transition(SessionState::TagPublished);
        Ok(TagPublication {
            tag: version.clone(),
            revision,
            replaced: exists_remotely,
        })
    }
}
