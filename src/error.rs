//! Error types shared by every stage of the preparation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing a dataset or running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration file '{}' not found.", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse configuration file '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Base directory '{}' does not exist.", .0.display())]
    DatasetRootNotFound(PathBuf),

    #[error(
        "No candidate directories with paired images and labels were found under '{}'. \
         Ensure the dataset contains both image files and YOLO-format label files.",
        .0.display()
    )]
    NoCandidateDirectory(PathBuf),

    #[error("No image files detected in the source directory '{}'.", .0.display())]
    NoImagesInSource(PathBuf),

    #[error(
        "Target directory '{}' is not empty. Remove or back it up before reformatting.",
        .0.display()
    )]
    NonEmptyTargetDirectory(PathBuf),

    #[error("No classes declared in configuration. Populate dataset.classes.")]
    MissingClasses,

    #[error("Training directory '{}' not found. Inspect your dataset.", .0.display())]
    MissingTrainSplit(PathBuf),

    #[error(
        "data.yaml not found at '{}'. Verify your dataset path and configuration.",
        .0.display()
    )]
    MissingManifest(PathBuf),

    #[error("Configuration missing dataset.slug for Kaggle provider.")]
    MissingSlug,

    #[error(
        "Kaggle credentials not found. Set KAGGLE_USERNAME and KAGGLE_KEY, \
         provide an env file or a kaggle.json."
    )]
    MissingCredentials,

    #[error("Split ratio must be in (0, 1), got {0}")]
    InvalidSplitRatio(f64),

    #[error("{stage} stage failed{}: {message}", exit_suffix(.code))]
    ExternalStageFailure {
        stage: &'static str,
        code: Option<i32>,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    pub fn external(stage: &'static str, code: Option<i32>, message: impl Into<String>) -> Self {
        Self::ExternalStageFailure {
            stage,
            code,
            message: message.into(),
        }
    }

    /// Process exit code for this failure.
    ///
    /// External stages report their own code (1 when none is available);
    /// every validation or I/O failure maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalStageFailure { code, .. } => code.unwrap_or(1),
            _ => 1,
        }
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" with exit code {c}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Narrow a failure code to the byte a process can actually report.
/// A failure never exits with 0.
pub fn to_exit_code(code: i32) -> std::process::ExitCode {
    match u8::try_from(code) {
        Ok(0) => std::process::ExitCode::from(1),
        Ok(byte) => std::process::ExitCode::from(byte),
        Err(_) => std::process::ExitCode::from(1),
    }
}
