use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModuleIdError {
    #[error("Module identifier cannot be empty")]
    Empty,

    #[error("Module identifier cannot start with '.': {0}")]
    Hidden(String),

    #[error("Invalid character {1:?} in module identifier: {0}")]
    InvalidCharacter(String, char),
}

/// Identifier of one API module, e.g. `sell-fulfillment`.
///
/// Derived from the specification file stem, so it doubles as a directory name
/// and as part of the remote repository name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: &str) -> Result<Self, ModuleIdError> {
        if id.is_empty() {
            return Err(ModuleIdError::Empty);
        }
        if id.starts_with('.') {
            return Err(ModuleIdError::Hidden(id.to_string()));
        }
        if let Some(ch) = id
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')))
        {
            return Err(ModuleIdError::InvalidCharacter(id.to_string(), ch));
        }

        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Repository-name component: the identifier with every `suffix` occurrence removed
    pub fn repository_slug(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.0.clone()
        } else {
            self.0.replace(suffix, "")
        }
    }

    /// Package namespace, e.g. `Ebay\Sell\Fulfillment` for `sell-fulfillment`
    pub fn namespace(&self, top_namespace: &str) -> String {
        let parts = self.0.split('-').filter(|part| !part.is_empty()).map(ucfirst);

        std::iter::once(top_namespace.to_string())
            .filter(|top| !top.is_empty())
            .chain(parts)
            .collect::<Vec<_>>()
            .join("\\")
    }
}

fn ucfirst(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ModuleId {
    type Error = ModuleIdError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        ModuleId::new(&id)
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0
    }
}
