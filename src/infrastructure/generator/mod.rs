//! Code generation collaborator

pub mod command_generator;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::entities::{GeneratorConfig, Module};

pub use command_generator::CommandGenerator;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Generator command is empty")]
    EmptyCommand,

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with status {exit_code}: {output}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Package template error: {0}")]
    Template(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Populates a module's working tree from its specification document
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, module: &Module, config: &GeneratorConfig) -> Result<(), GeneratorError>;
}
