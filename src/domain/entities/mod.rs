pub mod catalog;
pub mod module;
pub mod remote_state;
pub mod sync_config;

pub use catalog::{CatalogEntry, CatalogError, ModuleCatalog};
pub use module::Module;
pub use remote_state::RemoteState;
pub use sync_config::{CommitAuthor, GeneratorConfig, SyncConfig};
