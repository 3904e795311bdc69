/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - SCM operations through the `git` executable
/// - File system access (configuration, specification documents, working trees)
/// - The external code generator
/// - Specification downloads over HTTP
pub mod filesystem;
pub mod generator;
pub mod http;
pub mod scm;

// Re-export commonly used types
pub use filesystem::{ConfigStore, GitCredentials, SpecStore};
pub use generator::{CodeGenerator, CommandGenerator, GeneratorError};
pub use http::SpecDownloader;
pub use scm::{GitScm, PushRequest, ScmError, ScmOperations};
