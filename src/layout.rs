//! Populate the canonical `{train,val}/{images,labels}` tree.

use log::{debug, info};
use std::fs;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::types::{CanonicalLayout, ImagePair};
use crate::utils::{create_progress_bar, dir_has_entries};

/// Make sure the four leaf directories exist and are empty.
///
/// Every leaf is checked before any is created, so a non-empty target aborts
/// without touching the tree.
pub fn ensure_clean_targets(root: &Path) -> Result<CanonicalLayout> {
    let layout = CanonicalLayout::new(root);
    let leaves = layout.leaf_dirs();

    for target in &leaves {
        if target.exists() && dir_has_entries(target)? {
            return Err(PipelineError::NonEmptyTargetDirectory(target.clone()));
        }
    }
    for target in &leaves {
        fs::create_dir_all(target)?;
        debug!("Prepared {}", target.display());
    }
    Ok(layout)
}

/// Copy every image (and its label, when paired) into `root/split_name`.
///
/// The first I/O error aborts the split; files already copied stay in place.
pub fn materialize(pairs: &[ImagePair], root: &Path, split_name: &str) -> Result<usize> {
    let layout = CanonicalLayout::new(root);
    let images_dir = layout.images_dir(split_name);
    let labels_dir = layout.labels_dir(split_name);
    fs::create_dir_all(&images_dir)?;
    fs::create_dir_all(&labels_dir)?;

    let pb = create_progress_bar(pairs.len() as u64, &format!("Copying {split_name} files"));
    for pair in pairs {
        copy_into(&pair.image, &images_dir)?;
        if let Some(label) = &pair.label {
            copy_into(label, &labels_dir)?;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Copied {} images into {}", pairs.len(), images_dir.display());
    Ok(pairs.len())
}

fn copy_into(source: &Path, target_dir: &Path) -> Result<()> {
    let file_name = source.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("'{}' has no file name", source.display()),
        )
    })?;
    fs::copy(source, target_dir.join(file_name))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_ensure_clean_targets_creates_all_leaves() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = ensure_clean_targets(temp_dir.path()).unwrap();
        for leaf in layout.leaf_dirs() {
            assert!(leaf.is_dir(), "{} missing", leaf.display());
        }
    }

    #[test]
    fn test_ensure_clean_targets_accepts_existing_empty_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("train/images")).unwrap();
        assert!(ensure_clean_targets(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_ensure_clean_targets_rejects_populated_leaf_without_mutation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("train/images")).unwrap();
        File::create(root.join("train/images/old.jpg")).unwrap();

        let err = ensure_clean_targets(root).unwrap_err();
        match err {
            PipelineError::NonEmptyTargetDirectory(path) => {
                assert_eq!(path, root.join("train/images"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!root.join("train/labels").exists());
        assert!(!root.join("val").exists());
    }

    #[test]
    fn test_materialize_copies_pairs_verbatim() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("raw");
        fs::create_dir_all(&source).unwrap();
        let mut image = File::create(source.join("cat.jpg")).unwrap();
        image.write_all(b"jpeg bytes").unwrap();
        let mut label = File::create(source.join("cat.txt")).unwrap();
        label.write_all(b"0 0.5 0.5 0.1 0.1\n").unwrap();
        File::create(source.join("dog.png")).unwrap();

        let root = temp_dir.path().join("out");
        ensure_clean_targets(&root).unwrap();
        let pairs = vec![
            ImagePair::new(source.join("cat.jpg"), Some(source.join("cat.txt"))),
            ImagePair::new(source.join("dog.png"), None),
        ];
        assert_eq!(materialize(&pairs, &root, "train").unwrap(), 2);

        assert_eq!(
            fs::read(root.join("train/images/cat.jpg")).unwrap(),
            b"jpeg bytes"
        );
        assert_eq!(
            fs::read_to_string(root.join("train/labels/cat.txt")).unwrap(),
            "0 0.5 0.5 0.1 0.1\n"
        );
        assert!(root.join("train/images/dog.png").exists());
        assert!(!root.join("train/labels/dog.txt").exists());
    }

    #[test]
    fn test_materialize_stops_on_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("raw");
        fs::create_dir_all(&source).unwrap();
        File::create(source.join("a.jpg")).unwrap();

        let root = temp_dir.path().join("out");
        ensure_clean_targets(&root).unwrap();
        let pairs = vec![
            ImagePair::new(source.join("a.jpg"), None),
            ImagePair::new(source.join("gone.jpg"), None),
            ImagePair::new(source.join("a.jpg"), None),
        ];
        let err = materialize(&pairs, &root, "val").unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
        // No rollback of what was already copied
        assert!(root.join("val/images/a.jpg").exists());
    }
}
