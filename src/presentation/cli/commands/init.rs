use std::path::PathBuf;

use crate::common::result::SdkSyncResult;
use crate::infrastructure::filesystem::ConfigStore;

/// Write the default sdksync.yaml
pub struct InitCommand {
    /// Path of the configuration file to create
    pub config_path: PathBuf,
    /// Force overwrite existing file
    pub force: bool,
}

impl InitCommand {
    pub fn new(config_path: PathBuf, force: bool) -> Self {
        Self { config_path, force }
    }

    /// Execute the init command
    pub async fn execute(&self) -> SdkSyncResult<()> {
        ConfigStore::new().write_default(&self.config_path, self.force)?;

        println!("✅ Successfully created {}", self.config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Adjust organization, repository naming and the generator command");
        println!("   2. Run 'sdksync download' to fetch specification documents");
        println!("   3. Run 'sdksync sync' to generate and publish every module");

        Ok(())
    }
}
