#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Write `count` images with matching YOLO labels into `dir`
pub fn write_pairs(dir: &Path, count: usize) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        fs::write(dir.join(format!("img_{i:02}.jpg")), format!("image {i}")).unwrap();
        fs::write(
            dir.join(format!("img_{i:02}.txt")),
            format!("0 0.5 0.5 0.{i} 0.{i}\n"),
        )
        .unwrap();
    }
}

/// Sorted file names directly inside `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn stem(name: &str) -> &str {
    Path::new(name).file_stem().unwrap().to_str().unwrap()
}
