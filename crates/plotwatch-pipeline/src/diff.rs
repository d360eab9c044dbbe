//! Differencing: absolute intensity difference, binarization, and
//! morphological cleanup of the change mask.
//!
//! The raw mask is closed (dilate-then-erode) before it is opened
//! (erode-then-dilate). Closing first bridges adjacent fragments of one
//! physical change; opening afterwards removes isolated noise without
//! erasing thin regions that closing has already bridged.

use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

use crate::types::{AnalysisError, GrayImage};

/// Mask value for a changed pixel.
pub const CHANGED: u8 = 255;

/// Per-pixel absolute difference of two equally-sized grayscale images.
///
/// # Errors
///
/// Returns [`AnalysisError::Internal`] if the dimensions differ; the
/// preprocessor guarantees they match, so a mismatch here is a pipeline
/// bug, not bad input.
pub fn absolute_difference(a: &GrayImage, b: &GrayImage) -> Result<GrayImage, AnalysisError> {
    if a.dimensions() != b.dimensions() {
        return Err(AnalysisError::Internal(format!(
            "difference stage dimension mismatch: {}x{} vs {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        )));
    }

    Ok(GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let va = a.get_pixel(x, y).0[0];
        let vb = b.get_pixel(x, y).0[0];
        image::Luma([va.abs_diff(vb)])
    }))
}

/// Binarize a difference map with a strict global threshold: pixels with
/// difference greater than `threshold` become [`CHANGED`], all others 0.
#[must_use]
pub fn binarize(diff: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(diff.width(), diff.height(), |x, y| {
        image::Luma([if diff.get_pixel(x, y).0[0] > threshold {
            CHANGED
        } else {
            0
        }])
    })
}

/// Morphologically clean a binary mask: close `close_iterations` times,
/// then open `open_iterations` times, with a disc structuring element of
/// `kernel_radius` (radius 2 = 5×5 elliptical element).
///
/// Iterated closing applies all dilations before all erosions, matching
/// the iteration semantics of the tuned reference pipeline.
#[must_use]
pub fn clean_mask(
    mask: &GrayImage,
    kernel_radius: u8,
    close_iterations: u32,
    open_iterations: u32,
) -> GrayImage {
    let mut out = mask.clone();

    // Close: dilate n times, then erode n times.
    for _ in 0..close_iterations {
        out = dilate(&out, Norm::L2, kernel_radius);
    }
    for _ in 0..close_iterations {
        out = erode(&out, Norm::L2, kernel_radius);
    }

    // Open: erode n times, then dilate n times.
    for _ in 0..open_iterations {
        out = erode(&out, Norm::L2, kernel_radius);
    }
    for _ in 0..open_iterations {
        out = dilate(&out, Norm::L2, kernel_radius);
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uniform(w: u32, h: u32, v: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, image::Luma([v]))
    }

    #[test]
    fn identical_images_difference_is_zero() {
        let img = GrayImage::from_fn(8, 8, |x, y| image::Luma([(x * 8 + y) as u8]));
        let diff = absolute_difference(&img, &img).unwrap();
        assert!(diff.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn difference_is_symmetric() {
        let a = uniform(4, 4, 200);
        let b = uniform(4, 4, 90);
        let ab = absolute_difference(&a, &b).unwrap();
        let ba = absolute_difference(&b, &a).unwrap();
        assert_eq!(ab, ba);
        assert!(ab.pixels().all(|p| p.0[0] == 110));
    }

    #[test]
    fn mismatched_dimensions_are_internal_error() {
        let a = uniform(4, 4, 0);
        let b = uniform(5, 4, 0);
        assert!(matches!(
            absolute_difference(&a, &b),
            Err(AnalysisError::Internal(_))
        ));
    }

    #[test]
    fn binarize_threshold_is_strictly_greater_than() {
        let diff = GrayImage::from_fn(3, 1, |x, _| image::Luma([[29, 30, 31][x as usize]]));
        let mask = binarize(&diff, 30);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.get_pixel(1, 0).0[0], 0, "exact threshold stays off");
        assert_eq!(mask.get_pixel(2, 0).0[0], CHANGED);
    }

    #[test]
    fn binarized_mask_is_binary() {
        let diff = GrayImage::from_fn(16, 16, |x, y| image::Luma([(x * 16 + y) as u8]));
        let mask = binarize(&diff, 30);
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == CHANGED));
    }

    #[test]
    fn closing_bridges_nearby_fragments() {
        // Two 3-wide vertical bars separated by a 2-pixel gap: one
        // closing pass with a radius-2 disc must fill the gap.
        let mut mask = GrayImage::new(20, 20);
        for y in 5..15 {
            for x in [5u32, 6, 7, 10, 11, 12] {
                mask.put_pixel(x, y, image::Luma([CHANGED]));
            }
        }
        let cleaned = clean_mask(&mask, 2, 1, 0);
        assert_eq!(
            cleaned.get_pixel(8, 10).0[0],
            CHANGED,
            "gap should be bridged by closing"
        );
        assert_eq!(
            cleaned.get_pixel(9, 10).0[0],
            CHANGED,
            "gap should be bridged by closing"
        );
    }

    #[test]
    fn opening_removes_isolated_speckles() {
        let mut mask = GrayImage::new(20, 20);
        mask.put_pixel(10, 10, image::Luma([CHANGED]));
        let cleaned = clean_mask(&mask, 2, 0, 1);
        assert!(
            cleaned.pixels().all(|p| p.0[0] == 0),
            "single-pixel speckle should be erased by opening"
        );
    }

    #[test]
    fn cleanup_preserves_solid_regions() {
        // A solid 10x10 block survives close(2) + open(1) intact apart
        // from corner rounding.
        let mut mask = GrayImage::new(30, 30);
        for y in 10..20 {
            for x in 10..20 {
                mask.put_pixel(x, y, image::Luma([CHANGED]));
            }
        }
        let cleaned = clean_mask(&mask, 2, 2, 1);
        assert_eq!(cleaned.get_pixel(14, 14).0[0], CHANGED);
        assert_eq!(cleaned.get_pixel(11, 18).0[0], CHANGED);
    }

    #[test]
    fn cleanup_output_stays_binary() {
        let mask = GrayImage::from_fn(16, 16, |x, y| {
            image::Luma([if (x + y) % 3 == 0 { CHANGED } else { 0 }])
        });
        let cleaned = clean_mask(&mask, 2, 2, 1);
        assert!(cleaned.pixels().all(|p| p.0[0] == 0 || p.0[0] == CHANGED));
    }
}
