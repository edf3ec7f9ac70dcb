//! The `data.yaml` descriptor consumed by the training engine.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::settings::DatasetConfig;
use crate::types::CanonicalLayout;

pub const MANIFEST_FILE_NAME: &str = "data.yaml";

/// Serialized in field order: `train`, `val`, `nc`, `names`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub train: PathBuf,
    pub val: PathBuf,
    pub nc: usize,
    pub names: Vec<String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Where the validation images came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValSource {
    Val,
    /// `val/images` was missing, `test/images` stands in.
    Test,
    /// No validation split at all, training images are reused.
    Train,
}

/// Well-known manifest location under a dataset root
pub fn manifest_path(dataset_root: &Path) -> PathBuf {
    dataset_root.join(MANIFEST_FILE_NAME)
}

/// Build the manifest for `dataset_root` without writing it.
pub fn build_manifest(dataset: &DatasetConfig, dataset_root: &Path) -> Result<(Manifest, ValSource)> {
    if dataset.classes.is_empty() {
        return Err(PipelineError::MissingClasses);
    }

    let layout = CanonicalLayout::new(dataset_root);
    let train_dir = layout.train_images();
    if !train_dir.exists() {
        return Err(PipelineError::MissingTrainSplit(train_dir));
    }

    let val_dir = layout.val_images();
    let test_dir = layout.test_images();
    let (val_images, source) = if val_dir.exists() {
        (val_dir, ValSource::Val)
    } else if test_dir.exists() {
        warn!("'val' split not found. Using 'test/images' for validation.");
        (test_dir, ValSource::Test)
    } else {
        warn!("Validation split missing. Reusing training images as fallback.");
        (train_dir.clone(), ValSource::Train)
    };

    let manifest = Manifest {
        train: fs::canonicalize(&train_dir)?,
        val: fs::canonicalize(&val_images)?,
        nc: dataset.classes.len(),
        names: dataset.classes.clone(),
    };
    Ok((manifest, source))
}

/// Write `data.yaml` under `dataset_root`, replacing any previous one.
pub fn generate(dataset: &DatasetConfig, dataset_root: &Path) -> Result<PathBuf> {
    let (manifest, _) = build_manifest(dataset, dataset_root)?;

    let out_path = manifest_path(dataset_root);
    let mut writer = BufWriter::new(File::create(&out_path)?);
    serde_yaml::to_writer(&mut writer, &manifest)?;
    writer.flush()?;

    info!("Generated {} with {} classes", out_path.display(), manifest.nc);
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(classes: &[&str]) -> DatasetConfig {
        DatasetConfig {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            ..DatasetConfig::default()
        }
    }

    #[test]
    fn test_missing_classes() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("train/images")).unwrap();
        let err = generate(&dataset(&[]), temp_dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingClasses));
        assert!(!manifest_path(temp_dir.path()).exists());
    }

    #[test]
    fn test_missing_train_split() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("val/images")).unwrap();
        let err = generate(&dataset(&["a"]), temp_dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingTrainSplit(_)));
    }

    #[test]
    fn test_val_preferred() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("train/images")).unwrap();
        fs::create_dir_all(root.join("val/images")).unwrap();
        fs::create_dir_all(root.join("test/images")).unwrap();

        let (manifest, source) = build_manifest(&dataset(&["a", "b"]), root).unwrap();
        assert_eq!(source, ValSource::Val);
        assert_eq!(manifest.val, fs::canonicalize(root.join("val/images")).unwrap());
        assert!(manifest.train.is_absolute());
    }

    #[test]
    fn test_falls_back_to_train() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("train/images")).unwrap();

        let (manifest, source) = build_manifest(&dataset(&["a"]), root).unwrap();
        assert_eq!(source, ValSource::Train);
        assert_eq!(manifest.val, manifest.train);
    }

    #[test]
    fn test_generate_writes_keys_in_order_and_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("train/images")).unwrap();
        fs::create_dir_all(root.join("val/images")).unwrap();

        let path = generate(&dataset(&["helmet", "head", "person"]), root).unwrap();
        assert_eq!(path, root.join("data.yaml"));
        let content = fs::read_to_string(&path).unwrap();
        let train_at = content.find("train:").unwrap();
        let val_at = content.find("val:").unwrap();
        let nc_at = content.find("nc:").unwrap();
        let names_at = content.find("names:").unwrap();
        assert!(train_at < val_at && val_at < nc_at && nc_at < names_at);
        assert!(content.contains("nc: 3"));

        generate(&dataset(&["solo"]), root).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.nc, 1);
        assert_eq!(manifest.names, vec!["solo"]);
    }
}
