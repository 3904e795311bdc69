use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use super::load_settings;
use crate::common::error::SdkSyncError;
use crate::common::result::{ResultExt, SdkSyncResult};
use crate::application::use_cases::download_specs::DownloadSpecsUseCase;
use crate::infrastructure::http::SpecDownloader;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Fetches configured specification documents into the specification directory
pub struct DownloadCommand {
    pub config_path: PathBuf,
    pub module: Option<String>,
    pub show_progress: bool,
}

impl DownloadCommand {
    pub fn new(config_path: PathBuf, module: Option<String>, show_progress: bool) -> Self {
        Self {
            config_path,
            module,
            show_progress,
        }
    }

    pub async fn execute(&self) -> SdkSyncResult<()> {
        let settings = load_settings(&self.config_path)?;
        let downloader = SpecDownloader::new(DOWNLOAD_TIMEOUT).map_sdk_err(|e| {
            SdkSyncError::network_error_with_source("Failed to initialize HTTP client", e)
        })?;
        let use_case = DownloadSpecsUseCase::new(settings, downloader);

        let interactive = self.show_progress && console::Term::stdout().is_term();
        let downloaded = use_case
            .execute(self.module.as_deref(), |module| {
                create_progress_bar(module, interactive)
            })
            .await?;

        for spec in &downloaded {
            println!(
                "  {} {} {}",
                "✓".green(),
                spec.module.cyan().bold(),
                spec.path.display()
            );
        }
        println!(
            "{} Downloaded {} specification documents",
            "✓".green().bold(),
            downloaded.len()
        );
        Ok(())
    }
}

fn create_progress_bar(module: &str, interactive: bool) -> ProgressBar {
    if !interactive {
        return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
    }

    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg:<28} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(module.to_string());
    pb
}
