//! Locate the directory holding the raw image/label pairs.

use jwalk::WalkDir;
use log::{debug, warn};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::types::{CanonicalLayout, ImagePair, InvalidLayout, LayoutState, SourceCandidate};
use crate::utils::{dir_has_entries, is_image_file, is_label_file};

/// Count the direct entries of one directory
fn scan_directory(directory: &Path) -> Result<SourceCandidate> {
    let mut image_count = 0;
    let mut label_count = 0;
    let mut entry_count = 0;

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        entry_count += 1;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if is_image_file(&path) {
            image_count += 1;
        } else if is_label_file(&path) {
            label_count += 1;
        }
    }

    Ok(SourceCandidate {
        path: directory.to_path_buf(),
        image_count,
        label_count,
        entry_count,
    })
}

/// Find every directory below `root` that directly contains at least one image
/// and at least one label file. `root` itself is not a candidate.
/// Directories that cannot be read are logged and skipped.
///
/// Candidates come back sorted by path.
pub fn discover(root: &Path) -> Result<Vec<SourceCandidate>> {
    let mut directories: Vec<PathBuf> = WalkDir::new(root)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.depth > 0 && e.file_type().is_dir())
        .map(|e| e.path())
        .collect();
    directories.sort();

    let mut candidates = Vec::new();
    for directory in directories {
        let candidate = match scan_directory(&directory) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", directory.display(), e);
                continue;
            }
        };
        if candidate.image_count > 0 && candidate.label_count > 0 {
            debug!(
                "Candidate {}: {} images, {} labels, {} entries",
                candidate.path.display(),
                candidate.image_count,
                candidate.label_count,
                candidate.entry_count
            );
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

/// Pick the candidate with the most entries; the earliest path wins ties.
pub fn select_source(candidates: &[SourceCandidate], root: &Path) -> Result<SourceCandidate> {
    let mut sorted: Vec<&SourceCandidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut best: Option<&SourceCandidate> = None;
    for candidate in sorted {
        if best.map_or(true, |b| candidate.entry_count > b.entry_count) {
            best = Some(candidate);
        }
    }
    best.cloned()
        .ok_or_else(|| PipelineError::NoCandidateDirectory(root.to_path_buf()))
}

/// List the images directly inside `source_dir`, sorted by path, each paired
/// with the label file sharing its stem. Images with the same stem share one
/// label. Labels without an image are ignored.
pub fn collect_file_list(source_dir: &Path) -> Result<Vec<ImagePair>> {
    let mut images = Vec::new();
    let mut labels: HashMap<OsString, PathBuf> = HashMap::new();

    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if is_image_file(&path) {
            images.push(path);
        } else if is_label_file(&path) {
            if let Some(stem) = path.file_stem() {
                labels.insert(stem.to_os_string(), path);
            }
        }
    }
    images.sort();

    let pairs: Vec<ImagePair> = images
        .into_iter()
        .map(|image| {
            let label = image.file_stem().and_then(|stem| labels.get(stem).cloned());
            ImagePair::new(image, label)
        })
        .collect();

    let orphaned = labels
        .keys()
        .filter(|stem| {
            !pairs
                .iter()
                .any(|pair| pair.image.file_stem() == Some(stem.as_os_str()))
        })
        .count();

    let unlabeled = pairs.iter().filter(|pair| pair.label.is_none()).count();
    if unlabeled > 0 {
        warn!(
            "{} of {} images in {} have no label file and will be copied unlabeled.",
            unlabeled,
            pairs.len(),
            source_dir.display()
        );
    }
    if orphaned > 0 {
        debug!("Ignoring {} labels without a matching image.", orphaned);
    }

    Ok(pairs)
}

/// Decide whether `root` already follows the canonical layout.
pub fn layout_state(root: &Path) -> Result<LayoutState> {
    if !root.is_dir() {
        return Ok(LayoutState::Invalid(InvalidLayout::MissingRoot(
            root.to_path_buf(),
        )));
    }

    let layout = CanonicalLayout::new(root);
    let train_images = layout.train_images();
    if train_images.exists() && (layout.val_images().exists() || layout.test_images().exists()) {
        return Ok(LayoutState::Canonical);
    }
    if train_images.is_dir() && dir_has_entries(&train_images)? {
        return Ok(LayoutState::Invalid(InvalidLayout::PartialLayout(
            train_images,
        )));
    }
    Ok(LayoutState::NeedsFormatting)
}
