pub mod download_specs;
pub mod sync_module;
pub mod sync_modules;

pub use download_specs::{DownloadSpecsError, DownloadSpecsUseCase, DownloadedSpec};
pub use sync_module::{ModuleSyncOutcome, PublishDecision, SyncModule, SyncModuleError, SyncState};
pub use sync_modules::{
    ModuleReport, SyncModulesConfig, SyncModulesError, SyncModulesReport, SyncModulesUseCase,
};
