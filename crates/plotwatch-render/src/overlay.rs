//! Overlay rendering: changed pixels recolored on the comparison image.

use plotwatch_pipeline::{GrayImage, RgbImage};

/// Recolor every changed-mask pixel of `comparison` to `highlight`.
///
/// Draws on a private copy; the caller's image is never touched. Mask
/// dimensions are expected to match the comparison's (both are
/// reference-sized by the pipeline); any excess mask pixels are ignored.
#[must_use]
pub fn highlight_changes(
    comparison: &RgbImage,
    region_mask: &GrayImage,
    highlight: [u8; 3],
) -> RgbImage {
    let mut out = comparison.clone();
    for (x, y, p) in region_mask.enumerate_pixels() {
        if p.0[0] > 0 && x < out.width() && y < out.height() {
            out.put_pixel(x, y, image::Rgb(highlight));
        }
    }
    out
}
