use super::scm_interface::{PushRequest, ScmError, ScmOperations};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Git implementation of SCM operations, driving the `git` executable
pub struct GitScm {
    git_executable: String,
}

impl Default for GitScm {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
        }
    }
}

impl GitScm {
    /// Create a new Git SCM instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Git SCM instance with custom executable path
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            git_executable: executable.into(),
        }
    }

    /// Check if git executable is available
    pub async fn check_availability(&self) -> Result<(), ScmError> {
        let output = Command::new(&self.git_executable)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|_| ScmError::executable_not_found(&self.git_executable))?;

        if !output.status.success() {
            return Err(ScmError::executable_not_found(&self.git_executable));
        }

        Ok(())
    }

    /// Execute a git command in the given directory
    async fn execute_git_command(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<std::process::Output, ScmError> {
        debug!(command = %self.display_command(args), "running git");

        let mut cmd = Command::new(&self.git_executable);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScmError::executable_not_found(&self.git_executable)
            } else {
                ScmError::from(e)
            }
        })
    }

    /// Execute a git command and check for success
    async fn execute_git_command_checked(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<String, ScmError> {
        let output = self.execute_git_command(args, working_dir).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScmError::command_failed(
                self.display_command(args),
                output.status.code().unwrap_or(-1),
                mask_credentials(stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn display_command(&self, args: &[&str]) -> String {
        let masked: Vec<String> = args.iter().map(|arg| mask_credentials(arg)).collect();
        format!("{} {}", self.git_executable, masked.join(" "))
    }
}

/// Replace the password part of any URL found in `text`
fn mask_credentials(text: &str) -> String {
    text.split(' ')
        .map(|word| match url::Url::parse(word) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("***"));
                url.to_string()
            }
            _ => word.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn path_arg(path: &Path) -> Result<&str, ScmError> {
    path.to_str()
        .ok_or_else(|| ScmError::internal(format!("Invalid path: {}", path.display())))
}

#[async_trait]
impl ScmOperations for GitScm {
    async fn is_remote_populated(&self, url: &str) -> Result<bool, ScmError> {
        let output = self.execute_git_command(&["ls-remote", url], None).await?;

        if !output.status.success() {
            debug!(
                url = %mask_credentials(url),
                stderr = %mask_credentials(String::from_utf8_lossy(&output.stderr).trim()),
                "remote is not readable"
            );
            return Ok(false);
        }

        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    async fn clone_repository(&self, url: &str, dest_path: &Path) -> Result<(), ScmError> {
        let args = ["clone", url, path_arg(dest_path)?];
        let output = self.execute_git_command(&args, None).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScmError::clone_failed(format!(
                "Git clone failed: {}",
                mask_credentials(stderr.trim())
            )));
        }

        Ok(())
    }

    async fn init_repository(&self, dest_path: &Path) -> Result<(), ScmError> {
        tokio::fs::create_dir_all(dest_path).await?;
        self.execute_git_command_checked(&["init"], Some(dest_path))
            .await
            .map(|_| ())
    }

    async fn add_remote(&self, repo_path: &Path, name: &str, url: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["remote", "add", name, url], Some(repo_path))
            .await
            .map(|_| ())
    }

    async fn configure_identity(
        &self,
        repo_path: &Path,
        name: &str,
        email: &str,
    ) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["config", "user.name", name], Some(repo_path))
            .await?;
        self.execute_git_command_checked(&["config", "user.email", email], Some(repo_path))
            .await?;
        Ok(())
    }

    async fn remote_branches(&self, repo_path: &Path, remote: &str) -> Result<Vec<String>, ScmError> {
        let prefix = format!("refs/remotes/{}/", remote);
        let output = self
            .execute_git_command_checked(
                &["for-each-ref", "--format=%(refname)", &prefix],
                Some(repo_path),
            )
            .await?;

        Ok(output
            .lines()
            .filter_map(|line| line.trim().strip_prefix(&prefix))
            .filter(|name| *name != "HEAD")
            .map(str::to_string)
            .collect())
    }

    async fn tags(&self, repo_path: &Path) -> Result<Vec<String>, ScmError> {
        let output = self
            .execute_git_command_checked(&["tag", "-l"], Some(repo_path))
            .await?;

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn create_branch(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["checkout", "-b", name], Some(repo_path))
            .await
            .map(|_| ())
    }

    async fn checkout(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["checkout", name], Some(repo_path))
            .await
            .map(|_| ())
    }

    async fn has_changes(&self, repo_path: &Path) -> Result<bool, ScmError> {
        let output = self
            .execute_git_command_checked(&["status", "--porcelain"], Some(repo_path))
            .await?;
        Ok(!output.is_empty())
    }

    async fn add_all(&self, repo_path: &Path) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["add", "--all", "."], Some(repo_path))
            .await
            .map(|_| ())
    }

    async fn commit(&self, repo_path: &Path, message: &str, allow_empty: bool) -> Result<(), ScmError> {
        let mut args = vec!["commit", "-m", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        self.execute_git_command_checked(&args, Some(repo_path))
            .await
            .map(|_| ())
    }

    async fn create_tag(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["tag", name], Some(repo_path))
            .await
            .map(|_| ())
    }

    async fn delete_tag(&self, repo_path: &Path, name: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["tag", "-d", name], Some(repo_path))
            .await
            .map(|_| ())
    }

    async fn push(&self, repo_path: &Path, request: &PushRequest) -> Result<(), ScmError> {
        let owned = request.to_args();
        let mut args = vec!["push"];
        args.extend(owned.iter().map(String::as_str));

        let output = self.execute_git_command(&args, Some(repo_path)).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScmError::push_rejected(format!(
                "{}: {}",
                request,
                mask_credentials(stderr.trim())
            )));
        }

        Ok(())
    }

    async fn head_revision(&self, repo_path: &Path) -> Result<String, ScmError> {
        self.execute_git_command_checked(&["rev-parse", "HEAD"], Some(repo_path))
            .await
    }
}
