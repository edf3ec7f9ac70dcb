//! Format stage: turn a loose image/label folder into the YOLO train/val layout.

use log::info;
use std::path::Path;

use crate::discovery::{collect_file_list, discover, layout_state, select_source};
use crate::error::{PipelineError, Result};
use crate::layout::{ensure_clean_targets, materialize};
use crate::split::{plan, Split};
use crate::types::{InvalidLayout, LayoutState, TRAIN_SPLIT, VAL_SPLIT};

/// What the format stage did to a dataset root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The root was already laid out; nothing was touched.
    AlreadyCanonical,
    Formatted { train: usize, val: usize },
}

/// Reshape `base_dir` into the canonical train/val layout.
///
/// Discovery and the split plan are computed and every target directory is
/// checked before the first file is copied.
pub fn auto_format_dataset(base_dir: &Path, split: Split) -> Result<FormatOutcome> {
    match layout_state(base_dir)? {
        LayoutState::Canonical => {
            info!("Dataset already appears to be in YOLO format. Skipping formatting.");
            return Ok(FormatOutcome::AlreadyCanonical);
        }
        LayoutState::Invalid(InvalidLayout::MissingRoot(path)) => {
            return Err(PipelineError::DatasetRootNotFound(path));
        }
        LayoutState::Invalid(InvalidLayout::PartialLayout(path)) => {
            return Err(PipelineError::NonEmptyTargetDirectory(path));
        }
        LayoutState::NeedsFormatting => {}
    }

    let candidates = discover(base_dir)?;
    let source = select_source(&candidates, base_dir)?;
    info!("Using source directory: {}", source.path.display());

    let pairs = collect_file_list(&source.path)?;
    if pairs.is_empty() {
        return Err(PipelineError::NoImagesInSource(source.path));
    }

    let split_plan = plan(&pairs, split);
    info!(
        "Split {} images into {} train / {} val (ratio {}, seed {})",
        pairs.len(),
        split_plan.train.len(),
        split_plan.val.len(),
        split.ratio(),
        split.seed()
    );

    ensure_clean_targets(base_dir)?;
    let train = materialize(&split_plan.train, base_dir, TRAIN_SPLIT)?;
    let val = materialize(&split_plan.val, base_dir, VAL_SPLIT)?;

    info!("Dataset formatting complete.");
    Ok(FormatOutcome::Formatted { train, val })
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_pairs(dir: &Path, count: usize) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..count {
            fs::write(dir.join(format!("{i}.jpg")), b"image").unwrap();
            fs::write(dir.join(format!("{i}.txt")), b"0 0.5 0.5 0.1 0.1\n").unwrap();
        }
    }

    #[test]
    fn test_formats_loose_folder() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_pairs(&root.join("raw"), 5);

        let outcome = auto_format_dataset(root, Split::default()).unwrap();
        assert_eq!(outcome, FormatOutcome::Formatted { train: 4, val: 1 });
        assert!(root.join("train/labels").is_dir());
        assert!(root.join("val/images").is_dir());
    }

    #[test]
    fn test_canonical_root_is_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("train/images")).unwrap();
        fs::create_dir_all(root.join("val/images")).unwrap();
        write_pairs(&root.join("raw"), 3);

        let outcome = auto_format_dataset(root, Split::default()).unwrap();
        assert_eq!(outcome, FormatOutcome::AlreadyCanonical);
        assert!(!root.join("train/labels").exists());
    }

    #[test]
    fn test_occupied_target_fails_before_copying() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_pairs(&root.join("raw"), 3);
        fs::create_dir_all(root.join("val/labels")).unwrap();
        fs::write(root.join("val/labels/stale.txt"), b"").unwrap();

        let err = auto_format_dataset(root, Split::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NonEmptyTargetDirectory(ref path) if path == &root.join("val/labels")
        ));
        assert!(!root.join("train/images").exists());
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("absent");
        let err = auto_format_dataset(&missing, Split::default()).unwrap_err();
        assert!(matches!(err, PipelineError::DatasetRootNotFound(_)));
    }
}
