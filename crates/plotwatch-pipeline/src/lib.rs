//! plotwatch-pipeline: Pure change-detection pipeline (sans-IO).
//!
//! Compares a reference allotment map against a later satellite/drone
//! capture of the same ground plot through:
//! decode -> resize/grayscale/smooth -> difference -> binarize ->
//! morphological cleanup -> region extraction -> classification ->
//! aggregate scoring.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data plus the raster
//! intermediates renderers need. Rendering and encoding live in
//! `plotwatch-render`; result storage in `plotwatch-store`.
//!
//! Every stage reads inputs and produces new outputs without mutating
//! shared state, so distinct analyses may run on separate threads with
//! no locking. A run either yields a complete [`Analysis`] or fails
//! before producing one; there are no partial results and no retries --
//! all stages are deterministic, so retrying identical input cannot
//! change the outcome.

pub mod classify;
pub mod decode;
pub mod diff;
pub mod ident;
pub mod preprocess;
pub mod regions;
pub mod score;
pub mod types;

pub use types::{
    Analysis, AnalysisConfig, AnalysisError, BoundingBox, ChangeKind, ClassifyThresholds,
    Dimensions, GrayImage, PipelineArtifacts, Region, RgbImage, RiskLevel, Severity,
    SourceDimensions, Summary,
};

/// Run the full change-detection pipeline over two encoded images.
///
/// `reference_bytes` is the allotment map; `comparison_bytes` the later
/// capture. The comparison is resized to the reference's dimensions
/// (area averaging; the reference is never resized), both are reduced
/// to smoothed grayscale, differenced, binarized, and morphologically
/// cleaned; connected changed regions above the minimum area are
/// classified and the whole run is scored.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyInput`] if either buffer is empty,
/// [`AnalysisError::ImageDecode`] if either buffer is not a decodable
/// raster image, [`AnalysisError::DegenerateImage`] if either image has
/// a zero dimension, and [`AnalysisError::Internal`] for unexpected
/// stage failures.
pub fn analyze(
    reference_bytes: &[u8],
    comparison_bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<Analysis, AnalysisError> {
    // 1. Decode both inputs; dimensions recorded before any resizing.
    let reference = decode::decode_rgb(reference_bytes)?;
    let comparison_original = decode::decode_rgb(comparison_bytes)?;
    let source_dimensions = SourceDimensions {
        reference: Dimensions::of(&reference),
        comparison: Dimensions::of(&comparison_original),
    };

    // 2. Reconcile dimensions: the comparison is resized, never the
    //    reference.
    let target = source_dimensions.reference;
    let comparison = preprocess::resize_area(&comparison_original, target);

    // 3. Grayscale + smoothing. The unsmoothed grayscales are kept for
    //    the classifier.
    let reference_gray = preprocess::to_grayscale(&reference);
    let comparison_gray = preprocess::to_grayscale(&comparison);
    let reference_smooth = preprocess::smooth(&reference_gray, config.blur_sigma);
    let comparison_smooth = preprocess::smooth(&comparison_gray, config.blur_sigma);

    // 4. Difference, binarize, clean.
    let difference = diff::absolute_difference(&reference_smooth, &comparison_smooth)?;
    let raw_mask = diff::binarize(&difference, config.diff_threshold);
    let mask = diff::clean_mask(
        &raw_mask,
        config.kernel_radius,
        config.close_iterations,
        config.open_iterations,
    );

    // 5. Extract regions and the significant-region mask.
    let (shapes, region_mask) = regions::extract_regions(&mask, config.min_region_area);

    // 6. Classify each region, ids in extraction order.
    let total_pixels = target.pixel_count();
    let regions: Vec<Region> = shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| Region {
            id: format!("D{}", i + 1),
            bbox: shape.bbox,
            area_pixels: shape.area_pixels,
            kind: classify::classify_change(
                &reference_gray,
                &comparison_gray,
                shape.bbox,
                &config.classify,
            ),
            severity: classify::severity(shape.area_pixels, total_pixels),
        })
        .collect();

    // 7. Aggregate statistics over surviving-region pixels only.
    let changed_pixels = region_mask
        .pixels()
        .filter(|p| p.0[0] == diff::CHANGED)
        .count() as u64;
    let summary = score::summarize(regions.len(), changed_pixels, total_pixels);

    Ok(Analysis {
        result_id: ident::generate_result_id()?,
        summary,
        regions,
        source_dimensions,
        artifacts: PipelineArtifacts {
            reference,
            comparison,
            reference_gray,
            comparison_gray,
            difference,
            mask,
            region_mask,
        },
    })
}
