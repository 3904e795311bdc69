pub mod download;
pub mod init;
pub mod modules;
pub mod sync;

pub use download::*;
pub use init::*;
pub use modules::*;
pub use sync::*;

use std::path::Path;
use std::sync::Arc;

use crate::common::result::{ResultExt, SdkSyncResult};
use crate::domain::entities::SyncConfig;
use crate::infrastructure::filesystem::ConfigStore;

/// Load the configuration shared by every command
pub(crate) fn load_settings(config_path: &Path) -> SdkSyncResult<Arc<SyncConfig>> {
    let settings = ConfigStore::new()
        .load(config_path)
        .with_config_error(format!(
            "Failed to load configuration from {}",
            config_path.display()
        ))?;
    Ok(Arc::new(settings))
}
