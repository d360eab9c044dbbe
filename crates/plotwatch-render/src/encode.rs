//! Transport encoding: JPEG compression at fixed quality plus base64
//! wrapping, and binary-mask expansion to three channels so every
//! output image encodes uniformly.

use base64::{Engine as _, engine::general_purpose};
use plotwatch_pipeline::{GrayImage, RgbImage};

use crate::RenderError;

/// Expand a single-channel mask to three channels.
#[must_use]
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y).0[0];
        image::Rgb([v, v, v])
    })
}

/// Encode an RGB image as a JPEG at the given quality and wrap the
/// bytes in standard base64 for transport.
///
/// # Errors
///
/// Returns [`RenderError::JpegEncode`] if JPEG encoding fails.
pub fn to_jpeg_base64(image: &RgbImage, quality: u8) -> Result<String, RenderError> {
    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality);
    image::ImageEncoder::write_image(
        encoder,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(general_purpose::STANDARD.encode(jpeg))
}

/// Decode a base64-wrapped JPEG back to an RGB image. Primarily for
/// consumers that need to materialize a report's images (and for
/// round-trip tests).
///
/// # Errors
///
/// Returns [`RenderError::Base64Decode`] if the text is not valid
/// base64, or [`RenderError::JpegDecode`] if the decoded bytes are not
/// a decodable image.
pub fn from_jpeg_base64(encoded: &str) -> Result<RgbImage, RenderError> {
    let bytes = general_purpose::STANDARD.decode(encoded)?;
    let img = image::load_from_memory(&bytes).map_err(RenderError::JpegDecode)?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mask_expansion_replicates_channels() {
        let mut mask = GrayImage::new(4, 4);
        mask.put_pixel(1, 2, image::Luma([255]));
        let rgb = mask_to_rgb(&mask);
        assert_eq!(rgb.get_pixel(1, 2).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn encoded_output_is_valid_base64_jpeg() {
        let img = RgbImage::from_pixel(16, 16, image::Rgb([120, 80, 40]));
        let encoded = to_jpeg_base64(&img, 90).unwrap();
        // Strict base64 alphabet.
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=')
        );
        let decoded = from_jpeg_base64(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
    }

    #[test]
    fn round_trip_preserves_color_within_lossy_tolerance() {
        let img = RgbImage::from_pixel(32, 32, image::Rgb([200, 30, 60]));
        let decoded = from_jpeg_base64(&to_jpeg_base64(&img, 90).unwrap()).unwrap();
        let p = decoded.get_pixel(16, 16).0;
        for (c, (&got, &want)) in p.iter().zip(img.get_pixel(16, 16).0.iter()).enumerate() {
            let delta = i16::from(got).abs_diff(i16::from(want));
            assert!(delta <= 16, "channel {c} drifted too far: {got} vs {want}");
        }
    }

    #[test]
    fn garbage_base64_is_rejected() {
        assert!(matches!(
            from_jpeg_base64("not base64!!"),
            Err(RenderError::Base64Decode(_))
        ));
    }

    #[test]
    fn valid_base64_of_garbage_bytes_is_a_jpeg_decode_error() {
        let encoded = general_purpose::STANDARD.encode([0u8, 1, 2, 3]);
        assert!(matches!(
            from_jpeg_base64(&encoded),
            Err(RenderError::JpegDecode(_))
        ));
    }
}
