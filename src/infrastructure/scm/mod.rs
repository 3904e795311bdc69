//! Git plumbing behind repository sessions

pub mod git_scm;
pub mod scm_interface;

pub use git_scm::GitScm;
pub use scm_interface::{PushRequest, ScmError, ScmOperations};
