//! # sdksync - generated package publisher
//!
//! `sdksync` keeps one git repository per API module in step with the module's
//! specification document. For every module it regenerates the package from the
//! specification, decides whether the branch needs a commit, and republishes the
//! version tag derived from the specification's declared version.
//!
//! ## Quick Start
//!
//! 1. Write the default configuration and adjust it:
//!
//! ```bash
//! sdksync init
//! ```
//!
//! 2. Fetch specification documents:
//!
//! ```bash
//! sdksync download
//! ```
//!
//! 3. Generate and publish every module, or a single one:
//!
//! ```bash
//! sdksync sync
//! sdksync sync --module sell-feed --branch develop
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: modules, versions, remote naming and configuration
//! - [`application`]: the repository session, the per-module workflow and the batch driver
//! - [`infrastructure`]: git, file system, code generator and HTTP adapters
//! - [`presentation`]: CLI interface and user interaction
//! - [`common`]: shared utilities and error handling
//!
//! ## Publishing rules
//!
//! - A branch missing on the remote is created and pushed with upstream tracking.
//! - An existing branch is force-pushed only when the regenerated tree differs.
//! - The version tag is always deleted and recreated at `HEAD`, so a published version
//!   points at the tree generated for it.
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use sdksync::application::use_cases::sync_modules::{SyncModulesConfig, SyncModulesUseCase};
//! use sdksync::infrastructure::{CommandGenerator, ConfigStore, GitScm};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ConfigStore::new().load(Path::new("sdksync.yaml"))?;
//! let use_case = SyncModulesUseCase::new(
//!     SyncModulesConfig::default().with_module("sell-feed"),
//!     Arc::new(settings),
//!     Arc::new(GitScm::new()),
//!     Arc::new(CommandGenerator::new()),
//! );
//!
//! let report = use_case.execute().await?;
//! println!("{} of {} modules published", report.success_count(), report.total_count());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::SdkSyncError;
pub use crate::common::result::SdkSyncResult as Result;
