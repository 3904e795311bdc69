use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BranchNameError {
    #[error("Branch name cannot be empty")]
    Empty,

    #[error("Branch name too long: {0} characters (max: 255)")]
    TooLong(usize),

    #[error("Invalid character in branch name: {0:?}")]
    InvalidCharacter(char),

    #[error("Branch name cannot start with '-': {0}")]
    StartsWithHyphen(String),

    #[error("Branch name cannot end with '.lock': {0}")]
    EndsWithLock(String),

    #[error("Branch name contains consecutive dots: {0}")]
    ConsecutiveDots(String),

    #[error("Reserved branch name: {0}")]
    Reserved(String),
}

/// A git branch name accepted by `git check-ref-format --branch`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName {
    name: String,
}

impl BranchName {
    pub fn new(name: &str) -> Result<Self, BranchNameError> {
        Self::validate(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    fn validate(name: &str) -> Result<(), BranchNameError> {
        if name.is_empty() {
            return Err(BranchNameError::Empty);
        }

        if name.len() > 255 {
            return Err(BranchNameError::TooLong(name.len()));
        }

        if name.starts_with('-') {
            return Err(BranchNameError::StartsWithHyphen(name.to_string()));
        }

        if name.ends_with(".lock") {
            return Err(BranchNameError::EndsWithLock(name.to_string()));
        }

        if matches!(name, "HEAD" | "ORIG_HEAD" | "FETCH_HEAD" | "MERGE_HEAD") {
            return Err(BranchNameError::Reserved(name.to_string()));
        }

        if let Some(ch) = name.chars().find(|ch| {
            ch.is_ascii_control() || matches!(ch, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\')
        }) {
            return Err(BranchNameError::InvalidCharacter(ch));
        }

        if name.contains("..") {
            return Err(BranchNameError::ConsecutiveDots(name.to_string()));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Name of the remote-tracking ref for this branch on `remote`
    pub fn remote_tracking(&self, remote: &str) -> String {
        format!("{}/{}", remote, self.name)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl TryFrom<&str> for BranchName {
    type Error = BranchNameError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        BranchName::new(name)
    }
}

impl TryFrom<String> for BranchName {
    type Error = BranchNameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        BranchName::new(&name)
    }
}

impl From<BranchName> for String {
    fn from(branch: BranchName) -> Self {
        branch.name
    }
}
