//! Training stage.
//!
//! The training algorithm is external; [`TrainingEngine`] is the seam and
//! [`UltralyticsCli`] drives the `yolo` command-line tool.

use log::info;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::download::{run_download, DatasetFetcher};
use crate::error::{PipelineError, Result};
use crate::format::auto_format_dataset;
use crate::manifest::{generate, manifest_path};
use crate::settings::{Credentials, Settings, TrainingConfig};
use crate::split::Split;

const STAGE: &str = "train";

/// Everything the engine needs for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingJob {
    pub manifest: PathBuf,
    pub params: TrainingConfig,
}

pub trait TrainingEngine {
    fn train(&self, job: &TrainingJob) -> Result<()>;
}

/// Runs `yolo detect train data=... model=...` and maps its exit status.
#[derive(Debug, Clone)]
pub struct UltralyticsCli {
    program: PathBuf,
}

impl Default for UltralyticsCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yolo"),
        }
    }
}

impl UltralyticsCli {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn arguments(job: &TrainingJob) -> Vec<String> {
        let params = &job.params;
        vec![
            "detect".to_string(),
            "train".to_string(),
            format!("data={}", job.manifest.display()),
            format!("model={}", params.model),
            format!("imgsz={}", params.imgsz),
            format!("batch={}", params.batch),
            format!("epochs={}", params.epochs),
            format!("device={}", params.device),
        ]
    }
}

impl TrainingEngine for UltralyticsCli {
    fn train(&self, job: &TrainingJob) -> Result<()> {
        let params = &job.params;
        info!("Loading model '{}' ...", params.model);
        info!(
            "Starting training with parameters: imgsz={}, batch={}, epochs={}, device={}",
            params.imgsz, params.batch, params.epochs, params.device
        );

        let status = Command::new(&self.program)
            .args(Self::arguments(job))
            .status()
            .map_err(|e| {
                PipelineError::external(
                    STAGE,
                    None,
                    format!("Failed to launch '{}': {}", self.program.display(), e),
                )
            })?;

        if !status.success() {
            return Err(PipelineError::external(
                STAGE,
                status.code(),
                format!("'{}' exited with {}", self.program.display(), status),
            ));
        }
        info!("Training completed.");
        Ok(())
    }
}

/// Run the training stage against an existing manifest.
pub fn run_training(
    manifest: &Path,
    params: &TrainingConfig,
    engine: &dyn TrainingEngine,
) -> Result<()> {
    if !manifest.is_file() {
        return Err(PipelineError::MissingManifest(manifest.to_path_buf()));
    }
    engine.train(&TrainingJob {
        manifest: manifest.to_path_buf(),
        params: params.clone(),
    })
}

/// Return the manifest path, preparing the dataset first when it is missing.
///
/// Kaggle datasets are downloaded and formatted first; local datasets are
/// expected to be laid out already. Either way the manifest is then generated.
/// A configuration without classes fails before anything is downloaded or copied.
pub fn ensure_manifest(
    settings: &Settings,
    credentials: Option<&Credentials>,
    fetcher: &dyn DatasetFetcher,
) -> Result<PathBuf> {
    let dataset = &settings.dataset;
    let path = manifest_path(&dataset.local_dir);
    if path.exists() {
        return Ok(path);
    }
    if dataset.classes.is_empty() {
        return Err(PipelineError::MissingClasses);
    }

    info!(
        "Dataset not found at '{}'. Attempting automated preparation ...",
        dataset.local_dir.display()
    );
    if dataset.is_kaggle() {
        run_download(dataset, credentials, fetcher)?;
        auto_format_dataset(&dataset.local_dir, Split::default())?;
    }
    generate(dataset, &dataset.local_dir)?;

    if !path.exists() {
        return Err(PipelineError::MissingManifest(path));
    }
    Ok(path)
}
