//! YOLO dataset preparation pipeline
//!
//! This library reshapes inconsistently laid-out image/label datasets into the
//! `train/` and `val/` structure expected by Ultralytics YOLO, writes the
//! `data.yaml` manifest, and sequences download, format, prepare and train
//! stages.

pub mod config;
pub mod discovery;
pub mod download;
pub mod error;
pub mod format;
pub mod layout;
pub mod manifest;
pub mod pipeline;
pub mod settings;
pub mod split;
pub mod training;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use discovery::{collect_file_list, discover, layout_state, select_source};
pub use download::{run_download, DatasetFetcher, KaggleFetcher};
pub use error::{PipelineError, Result};
pub use format::{auto_format_dataset, FormatOutcome};
pub use layout::{ensure_clean_targets, materialize};
pub use manifest::{build_manifest, generate, manifest_path, Manifest, ValSource};
pub use pipeline::{Pipeline, SkipFlags, Stage, StageFailure, StageOutcome, StageStatus};
pub use settings::{Credentials, DatasetConfig, Settings, TrainingConfig};
pub use split::{plan, Split};
pub use training::{ensure_manifest, run_training, TrainingEngine, TrainingJob, UltralyticsCli};
pub use types::{CanonicalLayout, ImagePair, LayoutState, SourceCandidate, SplitPlan};
