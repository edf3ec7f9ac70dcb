use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::OnceLock;

// Supported image formats
pub const IMG_FORMATS: &[&str] = &[
    "bmp", "dng", "jpeg", "jpg", "mpo", "png", "tif", "tiff", "webp", "pfm",
];

// YOLO label files are plain text, one object per line
pub const LABEL_FORMATS: &[&str] = &["txt"];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// A directory that directly holds both images and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    pub path: PathBuf,
    pub image_count: usize,
    pub label_count: usize,
    /// Every entry directly in the directory, images and labels included.
    pub entry_count: usize,
}

/// An image and the label sharing its stem, if one exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImagePair {
    pub image: PathBuf,
    pub label: Option<PathBuf>,
}

impl ImagePair {
    pub fn new(image: impl Into<PathBuf>, label: Option<PathBuf>) -> Self {
        Self {
            image: image.into(),
            label,
        }
    }
}

// Struct to hold the split datasets for training and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
}

/// Split directory names of the canonical layout.
pub const TRAIN_SPLIT: &str = "train";
pub const VAL_SPLIT: &str = "val";
pub const TEST_SPLIT: &str = "test";
pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";

/// Paths of the `{root}/{train,val}/{images,labels}` tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLayout {
    pub root: PathBuf,
}

impl CanonicalLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn images_dir(&self, split: &str) -> PathBuf {
        self.root.join(split).join(IMAGES_DIR)
    }

    pub fn labels_dir(&self, split: &str) -> PathBuf {
        self.root.join(split).join(LABELS_DIR)
    }

    pub fn train_images(&self) -> PathBuf {
        self.images_dir(TRAIN_SPLIT)
    }

    pub fn val_images(&self) -> PathBuf {
        self.images_dir(VAL_SPLIT)
    }

    pub fn test_images(&self) -> PathBuf {
        self.images_dir(TEST_SPLIT)
    }

    /// The four leaf directories populated by formatting, in creation order.
    pub fn leaf_dirs(&self) -> [PathBuf; 4] {
        [
            self.images_dir(TRAIN_SPLIT),
            self.labels_dir(TRAIN_SPLIT),
            self.images_dir(VAL_SPLIT),
            self.labels_dir(VAL_SPLIT),
        ]
    }
}

/// Whether a dataset root is already laid out for training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutState {
    /// `train/images` plus `val/images` or `test/images` exist; formatting is a no-op.
    Canonical,
    NeedsFormatting,
    Invalid(InvalidLayout),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidLayout {
    MissingRoot(PathBuf),
    /// A populated `train/images` with no validation split, left by an aborted run.
    PartialLayout(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_dirs_cover_both_splits() {
        let layout = CanonicalLayout::new("data");
        let leaves = layout.leaf_dirs();
        assert_eq!(leaves[0], PathBuf::from("data/train/images"));
        assert_eq!(leaves[1], PathBuf::from("data/train/labels"));
        assert_eq!(leaves[2], PathBuf::from("data/val/images"));
        assert_eq!(leaves[3], PathBuf::from("data/val/labels"));
    }

    #[test]
    fn image_extension_set_is_lowercase() {
        let set = get_image_extensions_set();
        assert!(set.contains("jpg"));
        assert!(set.contains("png"));
        assert!(!set.contains("txt"));
    }
}
