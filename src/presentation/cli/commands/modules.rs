use colored::Colorize;
use std::path::PathBuf;

use super::load_settings;
use crate::common::result::SdkSyncResult;
use crate::domain::value_objects::PackageVersion;
use crate::infrastructure::filesystem::SpecStore;

/// Lists the modules of the specification directory with their versions
pub struct ModulesCommand {
    pub config_path: PathBuf,
}

impl ModulesCommand {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub async fn execute(&self) -> SdkSyncResult<()> {
        let settings = load_settings(&self.config_path)?;
        let store = SpecStore::new(&settings.spec_dir);
        let catalog = store.discover()?;

        if catalog.is_empty() {
            println!(
                "{} No specification documents in {}",
                "⚠".yellow().bold(),
                store.spec_dir().display()
            );
            return Ok(());
        }

        let width = catalog
            .entries()
            .iter()
            .map(|entry| entry.id.as_str().len())
            .max()
            .unwrap_or(0);

        for entry in catalog.entries() {
            let name = format!("{:<width$}", entry.id.as_str(), width = width);
            let repository = settings
                .remote_url(&entry.id)
                .ok()
                .and_then(|url| url.repository_name().map(str::to_string))
                .unwrap_or_default();
            match store.read_metadata(&entry.spec_path) {
                Ok(metadata) => println!(
                    "{}  {:<16} {:<12} {}",
                    name.cyan().bold(),
                    metadata.version,
                    PackageVersion::normalize(&metadata.version).as_str().green(),
                    repository.dimmed()
                ),
                Err(e) => println!("{}  {}", name.cyan().bold(), e.to_string().red()),
            }
        }

        Ok(())
    }
}
