//! Heatmap rendering: jet-colormapped difference map blended with the
//! comparison image.

use plotwatch_pipeline::{GrayImage, RgbImage};

/// Default blend weight of the comparison image (the colormap gets the
/// remainder).
pub const DEFAULT_IMAGE_WEIGHT: f64 = 0.6;

/// Map a difference map through the jet colormap: blue for low values
/// through green to red for high values.
#[must_use]
pub fn apply_jet(difference: &GrayImage) -> RgbImage {
    RgbImage::from_fn(difference.width(), difference.height(), |x, y| {
        image::Rgb(jet(difference.get_pixel(x, y).0[0]))
    })
}

/// Jet colormap for one 8-bit value.
///
/// Piecewise-linear approximation of the classic jet ramp: each channel
/// is a clamped triangle wave positioned so 0 maps to dark blue, mid
/// values to green, and 255 to dark red.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn jet(value: u8) -> [u8; 3] {
    let x = f64::from(value) / 255.0;
    let channel = |center: f64| -> u8 {
        let v = (1.5 - (4.0 * x - center).abs()).clamp(0.0, 1.0);
        (v * 255.0).round() as u8
    };
    [channel(3.0), channel(2.0), channel(1.0)]
}

/// Blend two equally-sized images: `weight·a + (1 − weight)·b` per
/// channel, rounded and clamped.
///
/// `weight` is clamped to `[0, 1]`. Dimensions are expected to match
/// (both images are reference-sized by the pipeline); blending reads
/// only coordinates valid in both.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend(a: &RgbImage, b: &RgbImage, weight: f64) -> RgbImage {
    let w = weight.clamp(0.0, 1.0);
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());
    RgbImage::from_fn(width, height, |x, y| {
        let pa = a.get_pixel(x, y).0;
        let pb = b.get_pixel(x, y).0;
        let mut out = [0u8; 3];
        for c in 0..3 {
            let v = w.mul_add(f64::from(pa[c]), (1.0 - w) * f64::from(pb[c]));
            out[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        image::Rgb(out)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn jet_extremes_are_blue_and_red() {
        let low = jet(0);
        let high = jet(255);
        assert!(low[2] > low[0], "low values should be blue-dominant: {low:?}");
        assert_eq!(low[1], 0);
        assert!(high[0] > high[2], "high values should be red-dominant: {high:?}");
        assert_eq!(high[1], 0);
    }

    #[test]
    fn jet_midpoint_is_green_dominant() {
        let mid = jet(128);
        assert!(mid[1] >= mid[0] && mid[1] >= mid[2], "mid: {mid:?}");
        assert_eq!(mid[1], 255);
    }

    #[test]
    fn apply_jet_maps_every_pixel() {
        let diff = GrayImage::from_fn(4, 1, |x, _| image::Luma([[0u8, 80, 160, 255][x as usize]]));
        let colored = apply_jet(&diff);
        for (x, _, p) in colored.enumerate_pixels() {
            assert_eq!(p.0, jet(diff.get_pixel(x, 0).0[0]));
        }
    }

    #[test]
    fn blend_weights_interpolate_linearly() {
        let a = RgbImage::from_pixel(2, 2, image::Rgb([200, 0, 100]));
        let b = RgbImage::from_pixel(2, 2, image::Rgb([0, 200, 100]));

        let mixed = blend(&a, &b, 0.6);
        assert_eq!(mixed.get_pixel(0, 0).0, [120, 80, 100]);

        let all_a = blend(&a, &b, 1.0);
        assert_eq!(all_a.get_pixel(0, 0).0, [200, 0, 100]);

        let all_b = blend(&a, &b, 0.0);
        assert_eq!(all_b.get_pixel(0, 0).0, [0, 200, 100]);
    }

    #[test]
    fn blend_clamps_out_of_range_weight() {
        let a = RgbImage::from_pixel(1, 1, image::Rgb([10, 10, 10]));
        let b = RgbImage::from_pixel(1, 1, image::Rgb([250, 250, 250]));
        assert_eq!(blend(&a, &b, 7.0).get_pixel(0, 0).0, [10, 10, 10]);
        assert_eq!(blend(&a, &b, -3.0).get_pixel(0, 0).0, [250, 250, 250]);
    }
}
