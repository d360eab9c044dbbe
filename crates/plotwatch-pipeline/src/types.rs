//! Shared types for the plotwatch analysis pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference the
/// decoded color images without depending on `image` directly.
pub use image::RgbImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an image buffer.
    #[must_use]
    pub fn of<P: image::Pixel, C: std::ops::Deref<Target = [P::Subpixel]>>(
        image: &image::ImageBuffer<P, C>,
    ) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total pixel count (`width × height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned integer bounding box in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge (pixels from image left).
    pub x: u32,
    /// Top edge (pixels from image top).
    pub y: u32,
    /// Box width in pixels.
    pub width: u32,
    /// Box height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Whether the box lies entirely within `dims`.
    #[must_use]
    pub const fn fits_within(self, dims: Dimensions) -> bool {
        self.width > 0
            && self.height > 0
            && self.x + self.width <= dims.width
            && self.y + self.height <= dims.height
    }
}

/// Change-type label assigned to a region by the classifier.
///
/// Serialized (and displayed) as the human-readable label strings used
/// in reports, e.g. `"Possible Encroachment/Construction"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Bright/open area became dark/built.
    #[serde(rename = "Possible Encroachment/Construction")]
    Encroachment,
    /// Dark/built area became bright/open.
    #[serde(rename = "Possible Demolition/Vacant")]
    Demolition,
    /// Texture/variance increased sharply, consistent with new structures.
    #[serde(rename = "Unauthorized Development")]
    UnauthorizedDevelopment,
    /// Large intensity shift that fits neither construction nor demolition.
    #[serde(rename = "Land Use Change")]
    LandUseChange,
    /// Catch-all for detected but unclassified shifts.
    #[serde(rename = "Boundary Deviation")]
    BoundaryDeviation,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Encroachment => "Possible Encroachment/Construction",
            Self::Demolition => "Possible Demolition/Vacant",
            Self::UnauthorizedDevelopment => "Unauthorized Development",
            Self::LandUseChange => "Land Use Change",
            Self::BoundaryDeviation => "Boundary Deviation",
        })
    }
}

/// Per-region severity tier, derived from the region's pixel area
/// relative to the total image area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Area ratio ≤ 1% of the image.
    Low,
    /// Area ratio > 1%.
    Medium,
    /// Area ratio > 2%.
    High,
    /// Area ratio > 5%.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        })
    }
}

/// Whole-analysis risk tier, derived from overall change percentage and
/// region count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Below every escalation band.
    Low,
    /// Change > 3% or more than 2 regions.
    Medium,
    /// Change > 8% or more than 5 regions.
    High,
    /// Change > 15% or more than 10 regions.
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        })
    }
}

/// One connected cluster of changed pixels that survived the minimum-area
/// filter. Created once during extraction + classification and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Stable identifier, `"D1"`, `"D2"`, … in extraction order.
    pub id: String,
    /// Bounding box of the region, within image bounds.
    pub bbox: BoundingBox,
    /// Count of mask pixels belonging to the region (not the box area).
    pub area_pixels: u64,
    /// Classification label.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Severity tier from the region's area ratio.
    pub severity: Severity,
}

/// Aggregate statistics for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of regions that survived the minimum-area filter.
    pub region_count: usize,
    /// Changed-pixel percentage of the image, rounded to 2 decimals.
    /// Always within `[0, 100]`.
    pub change_percentage: f64,
    /// Total pixel count of the (reference-sized) image.
    pub total_area_pixels: u64,
    /// Count of pixels belonging to surviving regions.
    pub changed_area_pixels: u64,
    /// Overall risk tier.
    pub risk_level: RiskLevel,
}

/// Source dimensions of both inputs, recorded before any resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDimensions {
    /// Reference image dimensions.
    pub reference: Dimensions,
    /// Comparison image dimensions as uploaded (pre-resize).
    pub comparison: Dimensions,
}

/// Raster intermediates retained for visualization.
///
/// Every field is owned by the analysis that produced it; renderers must
/// copy before drawing. Does not derive `PartialEq`/serde because the
/// `image` buffer types implement neither.
#[derive(Debug, Clone)]
pub struct PipelineArtifacts {
    /// Decoded reference image (never resized).
    pub reference: RgbImage,
    /// Comparison image after resizing to the reference's dimensions.
    pub comparison: RgbImage,
    /// Unsmoothed grayscale reference (classifier input).
    pub reference_gray: GrayImage,
    /// Unsmoothed grayscale comparison (classifier input).
    pub comparison_gray: GrayImage,
    /// Raw absolute-difference map of the smoothed grayscales.
    pub difference: GrayImage,
    /// Cleaned binary change mask, values in {0, 255}.
    pub mask: GrayImage,
    /// Mask restricted to pixels of surviving regions, values in {0, 255}.
    pub region_mask: GrayImage,
}

/// Result of one analysis run: identifier, statistics, classified
/// regions, and the raster intermediates renderers need.
///
/// Constructed atomically by [`crate::analyze`]; the pipeline never
/// updates an analysis after creation.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Opaque short token, unique per run.
    pub result_id: String,
    /// Aggregate statistics.
    pub summary: Summary,
    /// Regions in extraction order.
    pub regions: Vec<Region>,
    /// Source dimensions of both inputs.
    pub source_dimensions: SourceDimensions,
    /// Raster intermediates for visualization.
    pub artifacts: PipelineArtifacts,
}

/// Classification cutoffs applied per region.
///
/// These are empirical constants tuned for moderate-resolution
/// industrial-plot imagery; they are preserved exactly from the tuned
/// values and exposed here so future adjustment does not require code
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifyThresholds {
    /// A patch with mean intensity above this is considered bright/open.
    pub bright_mean: f64,
    /// A patch with mean intensity below this is considered dark/built.
    pub dark_mean: f64,
    /// Comparison std above `ratio × reference std` reads as new texture.
    pub texture_std_ratio: f64,
    /// Absolute mean shift above this reads as a land-use change.
    pub mean_shift: f64,
}

impl ClassifyThresholds {
    /// Bright-patch mean cutoff.
    pub const DEFAULT_BRIGHT_MEAN: f64 = 180.0;
    /// Dark-patch mean cutoff.
    pub const DEFAULT_DARK_MEAN: f64 = 150.0;
    /// Texture variance escalation ratio.
    pub const DEFAULT_TEXTURE_STD_RATIO: f64 = 1.5;
    /// Mean-shift cutoff for land-use change.
    pub const DEFAULT_MEAN_SHIFT: f64 = 50.0;
}

impl Default for ClassifyThresholds {
    fn default() -> Self {
        Self {
            bright_mean: Self::DEFAULT_BRIGHT_MEAN,
            dark_mean: Self::DEFAULT_DARK_MEAN,
            texture_std_ratio: Self::DEFAULT_TEXTURE_STD_RATIO,
            mean_shift: Self::DEFAULT_MEAN_SHIFT,
        }
    }
}

/// Configuration for the analysis pipeline.
///
/// All parameters default to the tuned values for satellite-imagery
/// noise floors. The numeric behavior with defaults matches the tuned
/// reference pipeline exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Gaussian smoothing sigma applied to both grayscale images before
    /// differencing. The default is derived from a 5×5 kernel via
    /// [`crate::preprocess::auto_sigma`].
    pub blur_sigma: f32,

    /// Global binarization threshold: pixels whose absolute difference
    /// is strictly greater than this are flagged changed.
    pub diff_threshold: u8,

    /// Radius of the disc structuring element used by the morphological
    /// close/open steps (radius 2 = 5×5 elliptical element).
    pub kernel_radius: u8,

    /// Iterations of the closing step (dilate-then-erode), which merges
    /// adjacent fragments of one physical change.
    pub close_iterations: u32,

    /// Iterations of the opening step (erode-then-dilate), which removes
    /// isolated noise. Applied after closing; order matters.
    pub open_iterations: u32,

    /// Minimum pixel area for a region to survive extraction. Strictly
    /// greater-than: a region of exactly this area is discarded. This is
    /// an absolute floor, not scaled to image resolution.
    pub min_region_area: u64,

    /// Classifier cutoffs.
    pub classify: ClassifyThresholds,
}

impl AnalysisConfig {
    /// Smoothing kernel size the default sigma is derived from.
    pub const DEFAULT_BLUR_KERNEL: u32 = 5;
    /// Default Gaussian sigma, `auto_sigma(5)` = 1.1.
    pub const DEFAULT_BLUR_SIGMA: f32 = 1.1;
    /// Default binarization threshold.
    pub const DEFAULT_DIFF_THRESHOLD: u8 = 30;
    /// Default structuring element radius (5×5 disc).
    pub const DEFAULT_KERNEL_RADIUS: u8 = 2;
    /// Default closing iterations.
    pub const DEFAULT_CLOSE_ITERATIONS: u32 = 2;
    /// Default opening iterations.
    pub const DEFAULT_OPEN_ITERATIONS: u32 = 1;
    /// Default minimum region area in pixels.
    pub const DEFAULT_MIN_REGION_AREA: u64 = 500;
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            diff_threshold: Self::DEFAULT_DIFF_THRESHOLD,
            kernel_radius: Self::DEFAULT_KERNEL_RADIUS,
            close_iterations: Self::DEFAULT_CLOSE_ITERATIONS,
            open_iterations: Self::DEFAULT_OPEN_ITERATIONS,
            min_region_area: Self::DEFAULT_MIN_REGION_AREA,
            classify: ClassifyThresholds::default(),
        }
    }
}

/// Errors that can occur during analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// An input byte buffer was empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode an input image.
    #[error("could not decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// An input image has a zero dimension, making resize and area-ratio
    /// math undefined.
    #[error("degenerate image dimensions: {width}x{height}")]
    DegenerateImage {
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },

    /// Unexpected failure inside a pipeline stage. Deliberately opaque:
    /// the message distinguishes system failure from bad input without
    /// leaking internal state.
    #[error("internal processing error: {0}")]
    Internal(String),
}
