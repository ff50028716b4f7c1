//! Consistency checks for one sample's image quadruplet and metadata

use crate::analysis::{self, OverlapStats};
use crate::config::{CheckThresholds, ValidatorConfig};
use crate::error::FatalCheckError;
use crate::services::ImageIOService;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Message prefix of the mask/difference overlap error, used for summary counts
pub const LOW_OVERLAP_MARKER: &str = "Low overlap";

const SOURCE: usize = 0;
const TARGET: usize = 1;
const MASK: usize = 2;
const SKETCH: usize = 3;

/// Validates one image quadruplet (source, target, mask, sketch) plus its metadata file
#[derive(Debug, Clone)]
pub struct ImageSetChecker {
    suffixes: Vec<String>,
    metadata_file: String,
    required_key: String,
    thresholds: CheckThresholds,
}

impl ImageSetChecker {
    #[must_use]
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            suffixes: config.suffixes.clone(),
            metadata_file: config.metadata_file.clone(),
            required_key: config.required_metadata_key.clone(),
            thresholds: config.thresholds,
        }
    }

    /// Path of the image for quadruplet role `index`: `<base><suffix>.png`
    #[must_use]
    pub fn image_path(&self, base: &Path, index: usize) -> PathBuf {
        let mut name = OsString::from(base.as_os_str());
        if let Some(suffix) = self.suffixes.get(index) {
            name.push(suffix);
        }
        name.push(".png");
        PathBuf::from(name)
    }

    /// Check the sample whose images are `<base>_0.png` .. `<base>_3.png`
    ///
    /// Returns the list of problems found (empty when the sample is valid).
    /// Pixel-level checks only run when every file exists, all sizes agree and
    /// the metadata is valid. Conditions under which the sample cannot be
    /// judged at all (empty mask, unsupported mask type, incompatible arrays)
    /// are returned as `Err`.
    pub fn check<P: AsRef<Path>>(&self, base: P) -> Result<Vec<String>, FatalCheckError> {
        let base = base.as_ref();
        let mut errors = Vec::new();

        self.check_presence(base, &mut errors);
        self.check_metadata(base, &mut errors);

        if errors.is_empty() {
            self.check_mask_overlap(base, &mut errors)?;
        }

        self.check_sketch(base, &mut errors);

        debug!(base = %base.display(), error_count = errors.len(), "Checked image set");
        Ok(errors)
    }

    fn check_presence(&self, base: &Path, errors: &mut Vec<String>) {
        let mut sizes = Vec::with_capacity(self.suffixes.len());

        for index in 0..self.suffixes.len() {
            let path = self.image_path(base, index);
            if !path.exists() {
                errors.push(format!("Missing image: {}", path.display()));
                continue;
            }
            match ImageIOService::read_dimensions(&path) {
                Ok(size) => sizes.push(size),
                Err(e) => errors.push(format!("Error loading {}: {}", path.display(), e)),
            }
        }

        let consistent = sizes.windows(2).all(|w| w.first() == w.last());
        if !consistent {
            let listed: Vec<String> = sizes.iter().map(|(w, h)| format!("({}, {})", w, h)).collect();
            errors.push(format!(
                "Inconsistent image sizes in {}: [{}]",
                base.display(),
                listed.join(", ")
            ));
        }
    }

    fn check_metadata(&self, base: &Path, errors: &mut Vec<String>) {
        let dir = base.parent().unwrap_or_else(|| Path::new(""));
        let json_path = dir.join(&self.metadata_file);

        if !json_path.exists() {
            errors.push(format!(
                "Missing {} file in directory: {}",
                self.metadata_file,
                dir.display()
            ));
            return;
        }

        let parsed = std::fs::read_to_string(&json_path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<serde_json::Value>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(value) => {
                let has_key = value
                    .as_object()
                    .is_some_and(|obj| obj.contains_key(&self.required_key));
                if !has_key {
                    errors.push(format!(
                        "Missing '{}' field in {}",
                        self.required_key,
                        json_path.display()
                    ));
                }
            },
            Err(e) => errors.push(format!("Error loading JSON {}: {}", json_path.display(), e)),
        }
    }

    fn check_mask_overlap(&self, base: &Path, errors: &mut Vec<String>) -> Result<(), FatalCheckError> {
        let load = |index: usize| {
            let path = self.image_path(base, index);
            ImageIOService::load_image(&path).map_err(|e| FatalCheckError::image_decode(&path, &e))
        };

        let source = analysis::to_sample_array(&load(SOURCE)?);
        let target = analysis::to_sample_array(&load(TARGET)?);
        let mask = analysis::binarize_mask(&load(MASK)?, self.thresholds.mask_threshold)?;

        let diff = analysis::difference_map(source.view(), target.view(), self.thresholds.diff_threshold)?;
        let stats = OverlapStats::compute(&mask, &diff)?;
        debug!(
            base = %base.display(),
            mask_area = stats.mask_area,
            diff_area = stats.diff_area,
            overlap = stats.overlap,
            "Mask overlap"
        );

        let ratio = stats.ratio().ok_or_else(|| FatalCheckError::empty_mask(base))?;
        if ratio < self.thresholds.min_overlap_ratio {
            errors.push(format!(
                "{} between mask and actual differences: {:.2}",
                LOW_OVERLAP_MARKER, ratio
            ));
        }
        Ok(())
    }

    fn check_sketch(&self, base: &Path, errors: &mut Vec<String>) {
        let path = self.image_path(base, SKETCH);
        if !path.exists() {
            return;
        }

        match ImageIOService::load_image(&path) {
            Ok(sketch) => {
                let values = analysis::distinct_values(&sketch);
                if !analysis::is_binarized(&values) {
                    errors.push(format!(
                        "Sketch image {} is not properly binarized. Found values: {}",
                        path.display(),
                        analysis::format_values(&values)
                    ));
                }
            },
            Err(e) => errors.push(format!(
                "Error checking sketch binarization {}: {}",
                path.display(),
                e
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FatalCheckKind;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use tempfile::TempDir;

    const SIZE: u32 = 8;

    fn checker() -> ImageSetChecker {
        ImageSetChecker::new(&ValidatorConfig::default())
    }

    /// Writes a valid sample: the left half of the target is edited and the mask covers it
    fn write_sample(dir: &Path, id: &str) -> PathBuf {
        let base = dir.join(id);
        let source = RgbImage::from_pixel(SIZE, SIZE, Rgb([20, 20, 20]));
        let mut target = source.clone();
        let mut mask = GrayImage::new(SIZE, SIZE);
        for y in 0..SIZE {
            for x in 0..SIZE / 2 {
                target.put_pixel(x, y, Rgb([220, 220, 220]));
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let mut sketch = GrayImage::new(SIZE, SIZE);
        sketch.put_pixel(1, 1, Luma([255]));

        source.save(dir.join(format!("{id}_0.png"))).unwrap();
        target.save(dir.join(format!("{id}_1.png"))).unwrap();
        mask.save(dir.join(format!("{id}_2.png"))).unwrap();
        sketch.save(dir.join(format!("{id}_3.png"))).unwrap();
        std::fs::write(dir.join("prompt.json"), r#"{"edit": "make it brighter"}"#).unwrap();
        base
    }

    #[test]
    fn test_valid_sample_has_no_errors() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        assert_eq!(checker().check(&base).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_missing_images_reported_once_each() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        std::fs::remove_file(dir.path().join("sample_1.png")).unwrap();
        // An empty mask would be fatal if pixel checks ran; they must not.
        GrayImage::new(SIZE, SIZE).save(dir.path().join("sample_2.png")).unwrap();
        std::fs::remove_file(dir.path().join("sample_3.png")).unwrap();

        let errors = checker().check(&base).unwrap();
        let missing: Vec<_> = errors.iter().filter(|e| e.starts_with("Missing image")).collect();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().any(|e| e.contains("sample_1.png")));
        assert!(missing.iter().any(|e| e.contains("sample_3.png")));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_inconsistent_sizes() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        GrayImage::new(SIZE + 1, SIZE).save(dir.path().join("sample_3.png")).unwrap();

        let errors = checker().check(&base).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Inconsistent image sizes in"));
        assert!(errors[0].contains("(9, 8)"));
    }

    #[test]
    fn test_unloadable_image() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        std::fs::write(dir.path().join("sample_0.png"), b"garbage").unwrap();

        let errors = checker().check(&base).unwrap();
        assert!(errors.iter().any(|e| e.starts_with("Error loading") && e.contains("sample_0.png")));
    }

    #[test]
    fn test_metadata_errors() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        let prompt = dir.path().join("prompt.json");

        std::fs::write(&prompt, r#"{"prompt": "no edit here"}"#).unwrap();
        let errors = checker().check(&base).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Missing 'edit' field"));

        std::fs::write(&prompt, "{ not json").unwrap();
        let errors = checker().check(&base).unwrap();
        assert!(errors[0].starts_with("Error loading JSON"));

        std::fs::write(&prompt, r#"["edit"]"#).unwrap();
        let errors = checker().check(&base).unwrap();
        assert!(errors[0].contains("Missing 'edit' field"));

        std::fs::remove_file(&prompt).unwrap();
        let errors = checker().check(&base).unwrap();
        assert!(errors[0].starts_with("Missing prompt.json file in directory"));
    }

    #[test]
    fn test_empty_mask_is_fatal() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        GrayImage::new(SIZE, SIZE).save(dir.path().join("sample_2.png")).unwrap();

        let err = checker().check(&base).unwrap_err();
        assert_eq!(err.kind, FatalCheckKind::EmptyMask);
    }

    #[test]
    fn test_low_overlap() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        // Mask covers the unedited right half instead
        let mut mask = GrayImage::new(SIZE, SIZE);
        for y in 0..SIZE {
            for x in SIZE / 2..SIZE {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask.save(dir.path().join("sample_2.png")).unwrap();

        let errors = checker().check(&base).unwrap();
        assert_eq!(errors, vec!["Low overlap between mask and actual differences: 0.00".to_string()]);
    }

    #[test]
    fn test_sketch_not_binarized() {
        let dir = TempDir::new().unwrap();
        let base = write_sample(dir.path(), "sample");
        let mut sketch = GrayImage::new(SIZE, SIZE);
        sketch.put_pixel(0, 0, Luma([128]));
        sketch.put_pixel(1, 0, Luma([255]));
        sketch.save(dir.path().join("sample_3.png")).unwrap();

        let errors = checker().check(&base).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("not properly binarized"));
        assert!(errors[0].contains("[0 128 255]"));
    }

    #[test]
    fn test_custom_suffixes() {
        let dir = TempDir::new().unwrap();
        write_sample(dir.path(), "sample");
        for (from, to) in [("_0", "_src"), ("_1", "_tgt"), ("_2", "_mask"), ("_3", "_sketch")] {
            std::fs::rename(
                dir.path().join(format!("sample{from}.png")),
                dir.path().join(format!("sample{to}.png")),
            )
            .unwrap();
        }
        let config = ValidatorConfig::builder()
            .root_path(dir.path())
            .suffixes(["_src", "_tgt", "_mask", "_sketch"])
            .build()
            .unwrap();

        let checker = ImageSetChecker::new(&config);
        assert_eq!(
            checker.image_path(&dir.path().join("sample"), 2),
            dir.path().join("sample_mask.png")
        );
        assert!(checker.check(dir.path().join("sample")).unwrap().is_empty());
    }
}
