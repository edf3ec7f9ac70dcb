use clap::{Args, Parser};
use std::path::PathBuf;
use std::str::FromStr;

use crate::pipeline::SkipFlags;

pub const DEFAULT_CONFIG: &str = "configs/sample.yaml";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Train split ratio and shuffle seed, shared by every entry point that formats
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Proportion of images to use for the training split
    #[arg(long = "train-split", default_value_t = 0.8, value_parser = validate_ratio)]
    pub train_split: f64,

    /// Random seed for reproducible splitting
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,
}

/// Reformat a raw dataset into the YOLO train/val directory structure.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct FormatArgs {
    /// Path to the dataset directory that needs formatting
    #[arg(long = "base-dir")]
    pub base_dir: PathBuf,

    #[command(flatten)]
    pub split: SplitArgs,
}

/// Generate a YOLO data.yaml from a dataset configuration.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct PrepareArgs {
    /// Path to the configuration YAML file
    #[arg(long = "config", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Download and prepare a dataset for YOLO training.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct DownloadArgs {
    /// Path to the configuration YAML file
    #[arg(long = "config", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// File providing Kaggle credentials as KEY=VALUE lines
    #[arg(long = "env-file", default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    #[command(flatten)]
    pub split: SplitArgs,
}

/// Train a YOLO model using a configuration file.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct TrainArgs {
    /// Path to the configuration YAML file
    #[arg(long = "config", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// File providing Kaggle credentials, used if the dataset must be fetched first
    #[arg(long = "env-file", default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Training executable to invoke
    #[arg(long = "yolo-bin", default_value = "yolo")]
    pub yolo_bin: PathBuf,
}

/// Run the full dataset -> training pipeline.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct PipelineArgs {
    /// Path to the configuration YAML file
    #[arg(long = "config", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// File providing Kaggle credentials as KEY=VALUE lines
    #[arg(long = "env-file", default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    #[command(flatten)]
    pub split: SplitArgs,

    /// Training executable to invoke
    #[arg(long = "yolo-bin", default_value = "yolo")]
    pub yolo_bin: PathBuf,

    /// Skip the download stage
    #[arg(long = "skip-download")]
    pub skip_download: bool,

    /// Skip auto-formatting
    #[arg(long = "skip-format")]
    pub skip_format: bool,

    /// Skip data.yaml generation
    #[arg(long = "skip-prepare")]
    pub skip_prepare: bool,

    /// Skip the training stage
    #[arg(long = "skip-train")]
    pub skip_train: bool,
}

impl PipelineArgs {
    pub fn skip_flags(&self) -> SkipFlags {
        SkipFlags {
            download: self.skip_download,
            format: self.skip_format,
            prepare: self.skip_prepare,
            train: self.skip_train,
        }
    }
}

// Validate that the ratio lies strictly between 0.0 and 1.0
pub fn validate_ratio(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val > 0.0 && val < 1.0 => Ok(val),
        _ => Err("RATIO must be between 0.0 and 1.0 (exclusive)".to_string()),
    }
}
