use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Low-level git capabilities a repository session is built on.
///
/// Every method is a single git invocation; sequencing and publish decisions live in
/// [`crate::application::services::repository_session::RepositorySession`].
#[async_trait]
pub trait ScmOperations: Send + Sync {
    /// Whether `url` answers with at least one ref
    async fn is_remote_populated(&self, url: &str) -> Result<bool, ScmError>;

    /// Clone `url` into `dest_path`
    async fn clone_repository(&self, url: &str, dest_path: &Path) -> Result<(), ScmError>;

    /// Create an empty repository at `dest_path`
    async fn init_repository(&self, dest_path: &Path) -> Result<(), ScmError>;

    /// Register `url` as remote `name`
    async fn add_remote(&self, repo_path: &Path, name: &str, url: &str) -> Result<(), ScmError>;

    /// Set the repository-local commit identity
    async fn configure_identity(
        &self,
        repo_path: &Path,
        name: &str,
        email: &str,
    ) -> Result<(), ScmError>;

    /// Branch names known under `refs/remotes/<remote>/`, without the remote prefix
    async fn remote_branches(&self, repo_path: &Path, remote: &str) -> Result<Vec<String>, ScmError>;

    /// Tag names present in the repository
    async fn tags(&self, repo_path: &Path) -> Result<Vec<String>, ScmError>;

    /// Create branch `name` at `HEAD` and switch to it
    async fn create_branch(&self, repo_path: &Path, name: &str) -> Result<(), ScmError>;

    /// Switch to branch `name`, creating it from its remote-tracking ref if needed
    async fn checkout(&self, repo_path: &Path, name: &str) -> Result<(), ScmError>;

    /// Whether the working tree (including untracked files) differs from `HEAD`
    async fn has_changes(&self, repo_path: &Path) -> Result<bool, ScmError>;

    /// Stage every addition, modification and deletion
    async fn add_all(&self, repo_path: &Path) -> Result<(), ScmError>;

    /// Commit the index
    async fn commit(&self, repo_path: &Path, message: &str, allow_empty: bool) -> Result<(), ScmError>;

    /// Create lightweight tag `name` at `HEAD`
    async fn create_tag(&self, repo_path: &Path, name: &str) -> Result<(), ScmError>;

    /// Delete local tag `name`
    async fn delete_tag(&self, repo_path: &Path, name: &str) -> Result<(), ScmError>;

    /// Run one push
    async fn push(&self, repo_path: &Path, request: &PushRequest) -> Result<(), ScmError>;

    /// Current `HEAD` commit id
    async fn head_revision(&self, repo_path: &Path) -> Result<String, ScmError>;
}

/// Arguments of a single `git push`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub remote: String,
    pub refspec: String,
    pub force: bool,
    pub set_upstream: bool,
    pub delete: bool,
}

impl PushRequest {
    pub fn new(remote: impl Into<String>, refspec: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            refspec: refspec.into(),
            force: false,
            set_upstream: false,
            delete: false,
        }
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn set_upstream(mut self) -> Self {
        self.set_upstream = true;
        self
    }

    pub fn delete(mut self) -> Self {
        self.delete = true;
        self
    }

    /// Arguments following `git push`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.force {
            args.push("--force".to_string());
        }
        if self.set_upstream {
            args.push("--set-upstream".to_string());
        }
        if self.delete {
            args.push("--delete".to_string());
        }
        args.push(self.remote.clone());
        args.push(self.refspec.clone());
        args
    }
}

impl fmt::Display for PushRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "push {}", self.to_args().join(" "))
    }
}

/// Errors that can occur during SCM operations
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("Repository not found at path: {path}")]
    RepositoryNotFound { path: String },

    #[error("Clone operation failed: {message}")]
    CloneFailed { message: String },

    #[error("Push rejected: {message}")]
    PushRejected { message: String },

    #[error("SCM executable not found: {executable}")]
    ExecutableNotFound { executable: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Command execution failed: {command}, exit code: {exit_code}, stderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScmError {
    pub fn clone_failed(message: impl Into<String>) -> Self {
        Self::CloneFailed {
            message: message.into(),
        }
    }

    pub fn push_rejected(message: impl Into<String>) -> Self {
        Self::PushRejected {
            message: message.into(),
        }
    }

    pub fn executable_not_found(executable: impl Into<String>) -> Self {
        Self::ExecutableNotFound {
            executable: executable.into(),
        }
    }

    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
