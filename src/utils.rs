use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

use crate::types::{get_image_extensions_set, LABEL_FORMATS};

/// Lowercased extension of `path`, if it has one
fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check whether a path carries one of the supported image extensions (case-insensitive)
pub fn is_image_file(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| get_image_extensions_set().contains(&ext))
}

/// Check whether a path carries a label extension (case-insensitive)
pub fn is_label_file(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| LABEL_FORMATS.contains(&ext.as_str()))
}

/// True when `path` is a directory with at least one entry
pub fn dir_has_entries(path: &Path) -> std::io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_some())
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
