//! Dataset fixtures generated on the fly with the `image` crate

#![allow(dead_code)]

use dataset_verify::ValidatorConfig;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SIZE: u32 = 8;

/// How the generated sample should (mis)behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Passes every check
    Valid,
    /// Edits land outside the mask
    LowOverlap,
    /// Mask has no set pixel
    EmptyMask,
    /// Sketch contains gray values
    GraySketch,
}

/// Write `<dir>/<id>_0..3.png` for one image set
pub fn write_image_set(dir: &Path, id: &str, kind: SampleKind) {
    std::fs::create_dir_all(dir).unwrap();
    let half = SIZE / 2;

    let source = RgbImage::from_pixel(SIZE, SIZE, Rgb([0, 0, 0]));
    let target = RgbImage::from_fn(SIZE, SIZE, |x, _| {
        let edited = match kind {
            SampleKind::LowOverlap => x >= half,
            _ => x < half,
        };
        if edited {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    let mask = GrayImage::from_fn(SIZE, SIZE, |x, _| {
        if kind != SampleKind::EmptyMask && x < half {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    let sketch = GrayImage::from_fn(SIZE, SIZE, |x, y| match (kind, (x + y) % 2) {
        (SampleKind::GraySketch, 0) => Luma([128]),
        (_, 0) => Luma([255]),
        _ => Luma([0]),
    });

    source.save(dir.join(format!("{id}_0.png"))).unwrap();
    target.save(dir.join(format!("{id}_1.png"))).unwrap();
    mask.save(dir.join(format!("{id}_2.png"))).unwrap();
    sketch.save(dir.join(format!("{id}_3.png"))).unwrap();
}

pub fn write_prompt(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("prompt.json"), r#"{"edit": "brighten the left half"}"#).unwrap();
}

/// Sample directory with one image set and a valid prompt file
pub fn write_sample(root: &Path, name: &str, kind: SampleKind) -> PathBuf {
    let dir = root.join(name);
    write_image_set(&dir, "000", kind);
    write_prompt(&dir);
    dir
}

/// Temporary `<tmp>/final` dataset root
pub fn dataset_root() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("final");
    std::fs::create_dir_all(&root).unwrap();
    (tmp, root)
}

pub fn config_for(root: &Path) -> ValidatorConfig {
    ValidatorConfig::builder()
        .root_path(root)
        .max_workers(4)
        .progress_interval(1)
        .build()
        .unwrap()
}

/// Sorted names of the immediate subdirectories of `dir`
pub fn subdirectory_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Sorted names of the regular files directly inside `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
