pub mod repository_session;

pub use repository_session::{
    GitOperation, RepositorySession, SessionError, SessionState, TagPublication, REMOTE_NAME,
};
