//! Preprocessing: dimension reconciliation, grayscale conversion, and
//! smoothing.
//!
//! The comparison image is resized to the reference's dimensions with an
//! area-averaging resampler; the reference is never resized. Uniform
//! resizing is the only geometric correction performed; no rotation or
//! translation registration is attempted, so misaligned captures show up
//! as spurious changes. That is a documented limitation of the pipeline,
//! not something this module silently corrects.

use crate::types::{Dimensions, GrayImage, RgbImage};

/// Gaussian sigma derived from an odd kernel size, `0.3·((k−1)/2 − 1) + 0.8`.
///
/// This is the conventional auto-sigma formula used when only a kernel
/// size is specified; for the default 5×5 kernel it yields 1.1.
#[must_use]
pub fn auto_sigma(kernel_size: u32) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let k = kernel_size as f32;
    0.3f32.mul_add((k - 1.0).mul_add(0.5, -1.0), 0.8)
}

/// Resize `image` to `target` dimensions using area-averaging
/// interpolation.
///
/// Each output pixel is the average of the source rectangle it covers,
/// weighting partially-covered source pixels by their overlap. Area
/// averaging anti-aliases downscaling better than nearest or bilinear
/// sampling for satellite imagery; the `image` crate offers no such
/// filter, so the resampler is implemented here.
///
/// Returns a clone when the dimensions already match.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn resize_area(image: &RgbImage, target: Dimensions) -> RgbImage {
    let (sw, sh) = (image.width(), image.height());
    if sw == target.width && sh == target.height {
        return image.clone();
    }

    let x_ratio = f64::from(sw) / f64::from(target.width);
    let y_ratio = f64::from(sh) / f64::from(target.height);

    RgbImage::from_fn(target.width, target.height, |ox, oy| {
        let x0 = f64::from(ox) * x_ratio;
        let x1 = f64::from(ox + 1) * x_ratio;
        let y0 = f64::from(oy) * y_ratio;
        let y1 = f64::from(oy + 1) * y_ratio;

        let mut sum = [0.0f64; 3];
        let mut total_weight = 0.0f64;

        let sy_start = y0.floor() as u32;
        let sy_end = (y1.ceil() as u32).min(sh);
        let sx_start = x0.floor() as u32;
        let sx_end = (x1.ceil() as u32).min(sw);

        for sy in sy_start..sy_end {
            let wy = overlap(f64::from(sy), y0, y1);
            if wy <= 0.0 {
                continue;
            }
            for sx in sx_start..sx_end {
                let wx = overlap(f64::from(sx), x0, x1);
                if wx <= 0.0 {
                    continue;
                }
                let weight = wx * wy;
                let p = image.get_pixel(sx, sy).0;
                for (acc, &v) in sum.iter_mut().zip(p.iter()) {
                    *acc += weight * f64::from(v);
                }
                total_weight += weight;
            }
        }

        if total_weight <= 0.0 {
            return image::Rgb([0, 0, 0]);
        }
        image::Rgb(sum.map(|s| (s / total_weight).round().clamp(0.0, 255.0) as u8))
    })
}

/// Length of the overlap between source pixel `[s, s+1)` and span `[a, b)`.
fn overlap(s: f64, a: f64, b: f64) -> f64 {
    (b.min(s + 1.0) - a.max(s)).max(0.0)
}

/// Convert an RGB bitmap to single-channel intensity using the standard
/// luma weights (`0.299·R + 0.587·G + 0.114·B`).
#[must_use]
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Apply Gaussian smoothing to suppress sensor noise and JPEG
/// compression artifacts before differencing.
///
/// Non-positive sigma returns the image unchanged, since `imageproc`'s
/// underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the smoothed image"]
pub fn smooth(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma)
}
