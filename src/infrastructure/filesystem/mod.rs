//! Configuration, specification documents and working trees on disk

pub mod config_store;
pub mod spec_store;
pub mod working_tree;

pub use config_store::{ConfigStore, ConfigStoreError, GitCredentials, DEFAULT_CONFIG_FILE};
pub use spec_store::{SpecMetadata, SpecStore, SpecStoreError};
