use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::domain::entities::{CatalogError, SyncConfig};
use crate::infrastructure::filesystem::SpecStore;
use crate::infrastructure::http::{DownloadError, SpecDownloader};

#[derive(Debug, Error)]
pub enum DownloadSpecsError {
    #[error(transparent)]
    UnknownModule(#[from] CatalogError),

    #[error("No specification downloads are configured")]
    NothingConfigured,

    #[error("Download of '{module}' failed: {source}")]
    Download {
        module: String,
        #[source]
        source: DownloadError,
    },
}

/// A specification document stored in the specification directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedSpec {
    pub module: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Fetches the configured specification documents, stopping at the first failure
pub struct DownloadSpecsUseCase {
    settings: Arc<SyncConfig>,
    downloader: SpecDownloader,
}

impl DownloadSpecsUseCase {
    pub fn new(settings: Arc<SyncConfig>, downloader: SpecDownloader) -> Self {
        Self {
            settings,
            downloader,
        }
    }

    /// `(module, url)` pairs to fetch, in module order
    pub fn targets(&self, module: Option<&str>) -> Result<Vec<(&str, &str)>, DownloadSpecsError> {
        let downloads = &self.settings.downloads;
        if downloads.is_empty() {
            return Err(DownloadSpecsError::NothingConfigured);
        }

        match module {
            None => Ok(downloads
                .iter()
                .map(|(name, url)| (name.as_str(), url.as_str()))
                .collect()),
            Some(name) => downloads
                .get_key_value(name)
                .map(|(name, url)| vec![(name.as_str(), url.as_str())])
                .ok_or_else(|| {
                    CatalogError::UnknownModule {
                        name: name.to_string(),
                        available: downloads.keys().cloned().collect(),
                    }
                    .into()
                }),
        }
    }

    /// Download each target into `<spec_dir>/<module>.json`.
    ///
    /// `progress` supplies the bar tracking one download.
    pub async fn execute<F>(
        &self,
        module: Option<&str>,
        progress: F,
    ) -> Result<Vec<DownloadedSpec>, DownloadSpecsError>
    where
        F: Fn(&str) -> ProgressBar,
    {
        let targets = self.targets(module)?;
        let store = SpecStore::new(&self.settings.spec_dir);

        let mut downloaded = Vec::with_capacity(targets.len());
        for (name, url) in targets {
            let path = store.spec_path(name);
            let bar = progress(name);

            let result = self.downloader.download(url, &path, &bar).await;
            bar.finish_and_clear();
            let bytes = result.map_err(|source| DownloadSpecsError::Download {
                module: name.to_string(),
                source,
            })?;

            info!(module = name, path = %path.display(), bytes, "specification downloaded");
            downloaded.push(DownloadedSpec {
                module: name.to_string(),
                path,
                bytes,
            });
        }

        Ok(downloaded)
    }
}
