//! Per-region classification and severity scoring.
//!
//! Classification inspects the unsmoothed grayscale patches under a
//! region's bounding box in both images and applies a fixed decision
//! sequence over patch mean and standard deviation. Severity is a pure
//! function of the region's pixel area relative to the total image area.

use crate::types::{BoundingBox, ChangeKind, ClassifyThresholds, GrayImage, Severity};

/// Area-ratio band above which a region is Critical.
pub const SEVERITY_CRITICAL_RATIO: f64 = 0.05;
/// Area-ratio band above which a region is High.
pub const SEVERITY_HIGH_RATIO: f64 = 0.02;
/// Area-ratio band above which a region is Medium.
pub const SEVERITY_MEDIUM_RATIO: f64 = 0.01;

/// Mean and standard deviation of one grayscale patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchStats {
    /// Mean intensity.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Compute mean and standard deviation of the pixels under `bbox`.
///
/// The box is clamped to image bounds; an empty intersection yields
/// zeroed stats.
#[must_use]
pub fn patch_stats(image: &GrayImage, bbox: BoundingBox) -> PatchStats {
    let x_end = (bbox.x + bbox.width).min(image.width());
    let y_end = (bbox.y + bbox.height).min(image.height());
    if bbox.x >= x_end || bbox.y >= y_end {
        return PatchStats {
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;
    for y in bbox.y..y_end {
        for x in bbox.x..x_end {
            let v = f64::from(image.get_pixel(x, y).0[0]);
            sum += v;
            sum_sq += v * v;
            count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    PatchStats {
        mean,
        std_dev: variance.sqrt(),
    }
}

/// Classify the change under `bbox`, first match wins:
///
/// 1. bright reference and dark comparison → encroachment/construction,
/// 2. the inverse → demolition/vacant,
/// 3. sharply increased texture variance → unauthorized development,
/// 4. large mean shift → land-use change,
/// 5. otherwise → boundary deviation.
#[must_use]
pub fn classify_change(
    reference_gray: &GrayImage,
    comparison_gray: &GrayImage,
    bbox: BoundingBox,
    thresholds: &ClassifyThresholds,
) -> ChangeKind {
    let reference = patch_stats(reference_gray, bbox);
    let comparison = patch_stats(comparison_gray, bbox);

    if reference.mean > thresholds.bright_mean && comparison.mean < thresholds.dark_mean {
        ChangeKind::Encroachment
    } else if reference.mean < thresholds.dark_mean && comparison.mean > thresholds.bright_mean {
        ChangeKind::Demolition
    } else if comparison.std_dev > reference.std_dev * thresholds.texture_std_ratio {
        ChangeKind::UnauthorizedDevelopment
    } else if (reference.mean - comparison.mean).abs() > thresholds.mean_shift {
        ChangeKind::LandUseChange
    } else {
        ChangeKind::BoundaryDeviation
    }
}

/// Severity tier from the region's area ratio (region pixels ÷ total
/// image pixels). Strict greater-than: ties round down to the lower tier.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn severity(area_pixels: u64, total_area_pixels: u64) -> Severity {
    if total_area_pixels == 0 {
        return Severity::Low;
    }
    let ratio = area_pixels as f64 / total_area_pixels as f64;
    if ratio > SEVERITY_CRITICAL_RATIO {
        Severity::Critical
    } else if ratio > SEVERITY_HIGH_RATIO {
        Severity::High
    } else if ratio > SEVERITY_MEDIUM_RATIO {
        Severity::Medium
    } else {
        Severity::Low
    }
}
