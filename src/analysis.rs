//! Pixel-level analysis for mask, difference and sketch checks
//!
//! Images are converted to `ndarray` arrays in `(height, width, channel)`
//! layout holding native sample values, so 8-bit and 16-bit inputs are
//! compared on their own scale.

use crate::error::FatalCheckError;
use image::{ColorType, DynamicImage};
use ndarray::{Array2, Array3, ArrayView3, Axis, Zip};
use std::collections::BTreeSet;

/// Convert an image into an `(height, width, channels)` array of native sample values
pub fn to_sample_array(image: &DynamicImage) -> Array3<f32> {
    let (width, height) = (image.width() as usize, image.height() as usize);

    fn widen<T: Copy + Into<f32>>(raw: &[T]) -> Vec<f32> {
        raw.iter().map(|&v| v.into()).collect()
    }

    let (channels, samples) = match image {
        DynamicImage::ImageLuma8(buf) => (1, widen(buf.as_raw())),
        DynamicImage::ImageLumaA8(buf) => (2, widen(buf.as_raw())),
        DynamicImage::ImageRgb8(buf) => (3, widen(buf.as_raw())),
        DynamicImage::ImageRgba8(buf) => (4, widen(buf.as_raw())),
        DynamicImage::ImageLuma16(buf) => (1, widen(buf.as_raw())),
        DynamicImage::ImageLumaA16(buf) => (2, widen(buf.as_raw())),
        DynamicImage::ImageRgb16(buf) => (3, widen(buf.as_raw())),
        DynamicImage::ImageRgba16(buf) => (4, widen(buf.as_raw())),
        DynamicImage::ImageRgb32F(buf) => (3, buf.as_raw().clone()),
        DynamicImage::ImageRgba32F(buf) => (4, buf.as_raw().clone()),
        other => (4, widen(other.to_rgba8().as_raw())),
    };

    // Buffer length always equals width * height * channels for image buffers
    Array3::from_shape_vec((height, width, channels), samples)
        .unwrap_or_else(|_| Array3::zeros((height, width, channels)))
}

/// Binarize a mask image
///
/// 8-bit masks (including decoded 1-bit PNGs) are thresholded at intensity
/// `> threshold`. For multi-channel masks a pixel is set when any color
/// channel exceeds the threshold; alpha is ignored. Any other sample type
/// cannot be interpreted as a mask.
pub fn binarize_mask(mask: &DynamicImage, threshold: u8) -> Result<Array2<bool>, FatalCheckError> {
    let color_channels = match mask.color() {
        ColorType::L8 | ColorType::La8 => 1,
        ColorType::Rgb8 | ColorType::Rgba8 => 3,
        other => return Err(FatalCheckError::unsupported_mask_type(other)),
    };

    let samples = to_sample_array(mask);
    let threshold = f32::from(threshold);
    let binary = samples.map_axis(Axis(2), |px| {
        px.iter().take(color_channels).any(|&v| v > threshold)
    });
    Ok(binary)
}

/// Mark pixels where the mean absolute source/target difference over channels exceeds `threshold`
pub fn difference_map(
    source: ArrayView3<'_, f32>,
    target: ArrayView3<'_, f32>,
    threshold: f32,
) -> Result<Array2<bool>, FatalCheckError> {
    if source.shape() != target.shape() {
        return Err(FatalCheckError::shape_mismatch(format!(
            "operands could not be combined: source shape {:?}, target shape {:?}",
            source.shape(),
            target.shape()
        )));
    }

    let abs_diff = (&source - &target).mapv(f32::abs);
    let mean = abs_diff.mean_axis(Axis(2)).ok_or_else(|| {
        FatalCheckError::shape_mismatch("source and target have no color channels")
    })?;
    Ok(mean.mapv(|d| d > threshold))
}

/// Pixel counts comparing a binarized mask against the detected edit region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapStats {
    pub mask_area: usize,
    pub diff_area: usize,
    pub overlap: usize,
}

impl OverlapStats {
    /// Compute mask area, difference area and their intersection
    pub fn compute(mask: &Array2<bool>, diff: &Array2<bool>) -> Result<Self, FatalCheckError> {
        if mask.shape() != diff.shape() {
            return Err(FatalCheckError::shape_mismatch(format!(
                "mask shape {:?} does not match difference shape {:?}",
                mask.shape(),
                diff.shape()
            )));
        }

        let mask_area = mask.iter().filter(|&&m| m).count();
        let diff_area = diff.iter().filter(|&&d| d).count();
        let overlap = Zip::from(mask)
            .and(diff)
            .fold(0usize, |acc, &m, &d| acc + usize::from(m && d));

        Ok(Self {
            mask_area,
            diff_area,
            overlap,
        })
    }

    /// Fraction of mask pixels inside the difference region, `None` for an empty mask
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        if self.mask_area == 0 {
            None
        } else {
            Some(self.overlap as f64 / self.mask_area as f64)
        }
    }
}

/// Sorted distinct sample values over all channels of an image
pub fn distinct_values(image: &DynamicImage) -> Vec<u16> {
    let mut seen = BTreeSet::new();
    match image {
        DynamicImage::ImageLuma8(buf) => seen.extend(buf.as_raw().iter().map(|&v| u16::from(v))),
        DynamicImage::ImageLumaA8(buf) => seen.extend(buf.as_raw().iter().map(|&v| u16::from(v))),
        DynamicImage::ImageRgb8(buf) => seen.extend(buf.as_raw().iter().map(|&v| u16::from(v))),
        DynamicImage::ImageRgba8(buf) => seen.extend(buf.as_raw().iter().map(|&v| u16::from(v))),
        DynamicImage::ImageLuma16(buf) => seen.extend(buf.as_raw().iter().copied()),
        DynamicImage::ImageLumaA16(buf) => seen.extend(buf.as_raw().iter().copied()),
        DynamicImage::ImageRgb16(buf) => seen.extend(buf.as_raw().iter().copied()),
        DynamicImage::ImageRgba16(buf) => seen.extend(buf.as_raw().iter().copied()),
        other => seen.extend(other.to_rgba16().as_raw().iter().copied()),
    }
    seen.into_iter().collect()
}

/// A sketch is binarized when it holds at most two values, all of them 0 or 255
#[must_use]
pub fn is_binarized(values: &[u16]) -> bool {
    values.len() <= 2 && values.iter().all(|&v| v == 0 || v == 255)
}

/// Render values the way array printouts read, e.g. `[0 128 255]`
#[must_use]
pub fn format_values(values: &[u16]) -> String {
    let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(" "))
}
