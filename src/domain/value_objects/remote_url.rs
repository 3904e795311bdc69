use std::fmt;
use thiserror::Error;
use url::Url;

use super::module_id::ModuleId;

#[derive(Debug, Error, PartialEq)]
pub enum RemoteUrlError {
    #[error("Invalid remote base URL '{0}': {1}")]
    InvalidBase(String, String),

    #[error("Remote base URL cannot carry path segments: {0}")]
    CannotBeABase(String),

    #[error("Credentials are only supported for http(s) remotes: {0}")]
    CredentialsUnsupported(String),
}

/// Location of a module's package repository.
///
/// `Display` never prints the password; use [`RemoteUrl::as_git_arg`] when the URL is
/// handed to git.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    url: Url,
}

impl RemoteUrl {
    /// `<base>/<organization>/<prefix>-<module slug>.git`
    pub fn for_module(
        base: &str,
        organization: &str,
        repo_prefix: &str,
        module: &ModuleId,
        module_suffix: &str,
    ) -> Result<Self, RemoteUrlError> {
        let mut url =
            Url::parse(base).map_err(|e| RemoteUrlError::InvalidBase(base.to_string(), e.to_string()))?;

        let slug = module.repository_slug(module_suffix);
        let repository = if repo_prefix.is_empty() {
            format!("{}.git", slug)
        } else {
            format!("{}-{}.git", repo_prefix, slug)
        };

        url.path_segments_mut()
            .map_err(|_| RemoteUrlError::CannotBeABase(base.to_string()))?
            .pop_if_empty()
            .push(organization)
            .push(&repository);

        Ok(Self { url })
    }

    /// Embed `username:token` for https pushes
    pub fn with_credentials(mut self, username: &str, token: &str) -> Result<Self, RemoteUrlError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(RemoteUrlError::CredentialsUnsupported(self.to_string()));
        }
        self.url
            .set_username(username)
            .and_then(|_| self.url.set_password(Some(token)))
            .map_err(|_| RemoteUrlError::CredentialsUnsupported(self.to_string()))?;
        Ok(self)
    }

    /// Full URL including credentials
    pub fn as_git_arg(&self) -> &str {
        self.url.as_str()
    }

    pub fn has_credentials(&self) -> bool {
        self.url.password().is_some()
    }

    /// Repository name without the `.git` extension
    pub fn repository_name(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|name| name.trim_end_matches(".git"))
    }

    fn redacted(&self) -> Url {
        let mut redacted = self.url.clone();
        if redacted.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl fmt::Debug for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RemoteUrl").field(&self.redacted().as_str()).finish()
    }
}
