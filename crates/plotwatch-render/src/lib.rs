//! plotwatch-render: Pure visualization renderers and transport
//! encoders (sans-IO).
//!
//! Turns a [`plotwatch_pipeline::Analysis`] into the rendered output
//! set: overlay, annotated pair, heatmap, and binary mask, each
//! JPEG-compressed at fixed quality and base64-wrapped, plus the
//! assembled [`AnalysisReport`] transport shape. Every rendering draws
//! on a fresh copy of the pipeline's rasters, so renderings never
//! interfere with each other or with the analysis they came from.

pub mod annotate;
pub mod encode;
pub mod heatmap;
pub mod overlay;
pub mod report;

use plotwatch_pipeline::Analysis;

pub use report::{AnalysisReport, EncodedImages, ReportMetadata};

/// Rendering options. Defaults reproduce the tuned output: red
/// highlight and comparison boxes, green reference boxes, JPEG
/// quality 90, 60/40 comparison/heatmap blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Color for overlay-highlighted changed pixels.
    pub highlight: [u8; 3],
    /// Box/label color on the comparison image.
    pub comparison_box: [u8; 3],
    /// Box color on the reference image.
    pub reference_box: [u8; 3],
    /// JPEG quality for every encoded output.
    pub jpeg_quality: u8,
    /// Blend weight of the comparison image in the heatmap.
    pub heatmap_image_weight: f64,
}

impl RenderOptions {
    /// Default JPEG quality.
    pub const DEFAULT_JPEG_QUALITY: u8 = 90;
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            highlight: [255, 0, 0],
            comparison_box: [255, 0, 0],
            reference_box: [0, 255, 0],
            jpeg_quality: Self::DEFAULT_JPEG_QUALITY,
            heatmap_image_weight: heatmap::DEFAULT_IMAGE_WEIGHT,
        }
    }
}

/// Errors that can occur while rendering or encoding output images.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// JPEG encoding failed.
    #[error("JPEG encoding failed: {0}")]
    JpegEncode(#[from] image::ImageError),

    /// Base64 text could not be decoded.
    #[error("base64 decoding failed: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Decoded bytes were not a decodable image.
    #[error("JPEG decoding failed: {0}")]
    JpegDecode(#[source] image::ImageError),
}

/// Render all visualization images for an analysis.
///
/// # Errors
///
/// Returns [`RenderError::JpegEncode`] if any output fails to encode.
pub fn render_images(
    analysis: &Analysis,
    options: &RenderOptions,
) -> Result<EncodedImages, RenderError> {
    let artifacts = &analysis.artifacts;

    let overlay_img = overlay::highlight_changes(
        &artifacts.comparison,
        &artifacts.region_mask,
        options.highlight,
    );
    let annotated_current = annotate::draw_regions(
        &artifacts.comparison,
        &analysis.regions,
        options.comparison_box,
        true,
    );
    let annotated_reference = annotate::draw_regions(
        &artifacts.reference,
        &analysis.regions,
        options.reference_box,
        false,
    );
    let heatmap_img = heatmap::blend(
        &artifacts.comparison,
        &heatmap::apply_jet(&artifacts.difference),
        options.heatmap_image_weight,
    );
    let mask_img = encode::mask_to_rgb(&artifacts.mask);

    Ok(EncodedImages {
        overlay: encode::to_jpeg_base64(&overlay_img, options.jpeg_quality)?,
        annotated_current: encode::to_jpeg_base64(&annotated_current, options.jpeg_quality)?,
        annotated_reference: encode::to_jpeg_base64(&annotated_reference, options.jpeg_quality)?,
        heatmap: encode::to_jpeg_base64(&heatmap_img, options.jpeg_quality)?,
        difference: encode::to_jpeg_base64(&mask_img, options.jpeg_quality)?,
    })
}

/// Render an analysis and assemble the complete transport report.
///
/// # Errors
///
/// Returns [`RenderError::JpegEncode`] if any output fails to encode.
pub fn render_report(
    analysis: &Analysis,
    options: &RenderOptions,
) -> Result<AnalysisReport, RenderError> {
    let images = render_images(analysis, options)?;
    Ok(AnalysisReport::assemble(analysis, images))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use plotwatch_pipeline::{AnalysisConfig, RgbImage};

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    /// Analysis with one injected bright-to-dark change.
    fn sample_analysis() -> Analysis {
        let reference = RgbImage::from_pixel(120, 120, image::Rgb([200, 200, 200]));
        let comparison = RgbImage::from_fn(120, 120, |x, y| {
            if (30..80).contains(&x) && (30..80).contains(&y) {
                image::Rgb([100, 100, 100])
            } else {
                image::Rgb([200, 200, 200])
            }
        });
        plotwatch_pipeline::analyze(
            &encode_png(&reference),
            &encode_png(&comparison),
            &AnalysisConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn render_produces_all_five_images() {
        let analysis = sample_analysis();
        let images = render_images(&analysis, &RenderOptions::default()).unwrap();
        for encoded in [
            &images.overlay,
            &images.annotated_current,
            &images.annotated_reference,
            &images.heatmap,
            &images.difference,
        ] {
            assert!(!encoded.is_empty());
            let decoded = encode::from_jpeg_base64(encoded).unwrap();
            assert_eq!(decoded.dimensions(), (120, 120));
        }
    }

    #[test]
    fn overlay_round_trip_preserves_highlight_color() {
        // Encode then decode the overlay: the dominant color inside the
        // changed region must stay close to the highlight through lossy
        // compression.
        let analysis = sample_analysis();
        assert_eq!(analysis.summary.region_count, 1);
        let images = render_images(&analysis, &RenderOptions::default()).unwrap();
        let overlay = encode::from_jpeg_base64(&images.overlay).unwrap();

        let p = overlay.get_pixel(55, 55).0;
        assert!(p[0] > 200, "red channel lost in round trip: {p:?}");
        assert!(p[1] < 80 && p[2] < 80, "highlight not dominant: {p:?}");
    }

    #[test]
    fn renderings_leave_the_analysis_untouched() {
        let analysis = sample_analysis();
        let before = analysis.artifacts.comparison.clone();
        let _ = render_images(&analysis, &RenderOptions::default()).unwrap();
        assert_eq!(analysis.artifacts.comparison, before);
    }

    #[test]
    fn report_carries_analysis_fields() {
        let analysis = sample_analysis();
        let report = render_report(&analysis, &RenderOptions::default()).unwrap();
        assert_eq!(report.result_id, analysis.result_id);
        assert_eq!(report.summary, analysis.summary);
        assert_eq!(report.regions.len(), analysis.regions.len());
        assert_eq!(report.metadata.reference_dimensions, "120x120");
    }
}
