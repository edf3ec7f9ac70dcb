//! Dataset download stage.
//!
//! The fetch itself sits behind [`DatasetFetcher`]; [`KaggleFetcher`] talks to
//! the Kaggle dataset API.

use base64::Engine;
use glob::glob;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::settings::{Credentials, DatasetConfig};

const STAGE: &str = "download";
const KAGGLE_API_URL: &str = "https://www.kaggle.com/api/v1";

/// Fetch a dataset archive and expand it into a directory.
pub trait DatasetFetcher {
    fn fetch(&self, slug: &str, dest_dir: &Path, credentials: &Credentials) -> Result<()>;
}

/// Downloads `owner/dataset` archives from Kaggle and extracts them in place.
#[derive(Debug, Clone)]
pub struct KaggleFetcher {
    api_url: String,
}

impl Default for KaggleFetcher {
    fn default() -> Self {
        Self {
            api_url: KAGGLE_API_URL.to_string(),
        }
    }
}

impl KaggleFetcher {
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    fn download_url(&self, slug: &str) -> String {
        format!(
            "{}/datasets/download/{}",
            self.api_url.trim_end_matches('/'),
            slug
        )
    }
}

fn basic_auth(credentials: &Credentials) -> String {
    let token = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", credentials.username, credentials.key));
    format!("Basic {token}")
}

impl DatasetFetcher for KaggleFetcher {
    fn fetch(&self, slug: &str, dest_dir: &Path, credentials: &Credentials) -> Result<()> {
        fs::create_dir_all(dest_dir)?;
        info!(
            "Downloading Kaggle dataset '{}' to '{}' ...",
            slug,
            dest_dir.display()
        );

        let response = ureq::get(&self.download_url(slug))
            .set("Authorization", &basic_auth(credentials))
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(401, _) | ureq::Error::Status(403, _) => PipelineError::external(
                    STAGE,
                    None,
                    "Failed to authenticate with Kaggle API. Ensure credentials are configured.",
                ),
                ureq::Error::Status(status, _) => PipelineError::external(
                    STAGE,
                    None,
                    format!("Kaggle returned HTTP {status} for dataset '{slug}'"),
                ),
                ureq::Error::Transport(transport) => {
                    PipelineError::external(STAGE, None, transport.to_string())
                }
            })?;

        let archive_name = slug.rsplit('/').next().unwrap_or(slug);
        let archive_path = dest_dir.join(format!("{archive_name}.zip"));
        {
            let mut writer = BufWriter::new(File::create(&archive_path)?);
            std::io::copy(&mut response.into_reader(), &mut writer)?;
            writer.flush()?;
        }

        let mut archive = zip::ZipArchive::new(File::open(&archive_path)?)
            .map_err(|e| PipelineError::external(STAGE, None, format!("Invalid archive: {e}")))?;
        archive
            .extract(dest_dir)
            .map_err(|e| PipelineError::external(STAGE, None, format!("Extraction failed: {e}")))?;
        info!("Extracted {} files", archive.len());

        remove_archives(dest_dir);
        Ok(())
    }
}

/// Remove leftover `*.zip` files; failures are ignored.
fn remove_archives(dest_dir: &Path) {
    let pattern = format!("{}/*.zip", glob::Pattern::escape(&dest_dir.to_string_lossy()));
    let Ok(entries) = glob(&pattern) else {
        return;
    };
    for archive in entries.filter_map(|entry| entry.ok()) {
        if fs::remove_file(&archive).is_ok() {
            debug!("Removed {}", archive.display());
        }
    }
}

/// What the download stage did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Fetched,
    /// The provider is not Kaggle; the dataset is expected on disk.
    Local,
}

/// Run the download stage for `dataset`.
///
/// Only the "kaggle" provider fetches anything; it needs a slug and credentials.
pub fn run_download(
    dataset: &DatasetConfig,
    credentials: Option<&Credentials>,
    fetcher: &dyn DatasetFetcher,
) -> Result<DownloadOutcome> {
    if !dataset.is_kaggle() {
        info!(
            "Provider '{}' is treated as local. Ensure the dataset is already present at '{}'.",
            dataset.provider,
            dataset.local_dir.display()
        );
        return Ok(DownloadOutcome::Local);
    }

    let slug = dataset
        .slug
        .as_deref()
        .filter(|slug| !slug.is_empty())
        .ok_or(PipelineError::MissingSlug)?;
    let credentials = credentials.ok_or(PipelineError::MissingCredentials)?;

    fetcher.fetch(slug, &dataset.local_dir, credentials)?;
    Ok(DownloadOutcome::Fetched)
}
