//! Staged pipeline: download, format, prepare, train.
//!
//! Stages run strictly in order, each can be skipped on its own, and the
//! first failure stops the run. Nothing is remembered between runs.

use log::info;
use std::fmt;
use thiserror::Error;

use crate::download::{run_download, DatasetFetcher};
use crate::error::{PipelineError, Result};
use crate::format::auto_format_dataset;
use crate::manifest::{generate, manifest_path};
use crate::settings::{Credentials, Settings};
use crate::split::Split;
use crate::training::{run_training, TrainingEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Download,
    Format,
    Prepare,
    Train,
}

impl Stage {
    /// Execution order
    pub const ALL: [Stage; 4] = [Stage::Download, Stage::Format, Stage::Prepare, Stage::Train];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Download => "download",
            Stage::Format => "format",
            Stage::Prepare => "prepare",
            Stage::Train => "train",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Stage::Download => "Downloading dataset",
            Stage::Format => "Formatting dataset into YOLO layout",
            Stage::Prepare => "Generating data.yaml",
            Stage::Train => "Starting training",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-stage skip switches; everything runs by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipFlags {
    pub download: bool,
    pub format: bool,
    pub prepare: bool,
    pub train: bool,
}

impl SkipFlags {
    pub fn is_skipped(&self, stage: Stage) -> bool {
        match stage {
            Stage::Download => self.download,
            Stage::Format => self.format,
            Stage::Prepare => self.prepare,
            Stage::Train => self.train,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
}

/// The first stage failure of a run, with what happened before it.
#[derive(Debug, Error)]
#[error("Pipeline failed during step '{stage}': {source}")]
pub struct StageFailure {
    pub stage: Stage,
    /// Outcomes of the stages before the failing one.
    pub completed: Vec<StageOutcome>,
    #[source]
    pub source: PipelineError,
}

impl StageFailure {
    pub fn exit_code(&self) -> i32 {
        self.source.exit_code()
    }
}

/// One orchestrated run over a dataset root.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    fetcher: &'a dyn DatasetFetcher,
    engine: &'a dyn TrainingEngine,
    credentials: Option<Credentials>,
    split: Split,
    skip: SkipFlags,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        fetcher: &'a dyn DatasetFetcher,
        engine: &'a dyn TrainingEngine,
    ) -> Self {
        Self {
            settings,
            fetcher,
            engine,
            credentials: None,
            split: Split::default(),
            skip: SkipFlags::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_split(mut self, split: Split) -> Self {
        self.split = split;
        self
    }

    pub fn with_skip(mut self, skip: SkipFlags) -> Self {
        self.skip = skip;
        self
    }

    /// Run every stage in order, stopping at the first failure.
    pub fn run(&self) -> std::result::Result<Vec<StageOutcome>, StageFailure> {
        let mut outcomes = Vec::with_capacity(Stage::ALL.len());

        for stage in Stage::ALL {
            if self.skip.is_skipped(stage) {
                info!("==> Skipping {} stage as requested.", stage);
                outcomes.push(StageOutcome {
                    stage,
                    status: StageStatus::Skipped,
                });
                continue;
            }

            info!("==> {}", stage.description());
            if let Err(source) = self.run_stage(stage) {
                return Err(StageFailure {
                    stage,
                    completed: outcomes,
                    source,
                });
            }
            outcomes.push(StageOutcome {
                stage,
                status: StageStatus::Completed,
            });
        }

        Ok(outcomes)
    }

    fn run_stage(&self, stage: Stage) -> Result<()> {
        let dataset = &self.settings.dataset;
        let root = dataset.local_dir.as_path();
        match stage {
            Stage::Download => {
                run_download(dataset, self.credentials.as_ref(), self.fetcher)?;
            }
            Stage::Format => {
                auto_format_dataset(root, self.split)?;
            }
            Stage::Prepare => {
                generate(dataset, root)?;
            }
            Stage::Train => {
                run_training(&manifest_path(root), &self.settings.training, self.engine)?;
            }
        }
        Ok(())
    }
}
