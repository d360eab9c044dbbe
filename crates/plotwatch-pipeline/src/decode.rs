//! Image decoding: raw encoded bytes in, RGB bitmap out.
//!
//! The declared media type of an upload is never trusted; the bytes are
//! probed directly, so a PNG uploaded as `image/jpeg` still decodes.
//! This is the first step of the pipeline for each of the two inputs.

use crate::types::{AnalysisError, RgbImage};

/// Decode raw image bytes (JPEG or PNG) into an RGB bitmap.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyInput`] if `bytes` is empty.
/// Returns [`AnalysisError::ImageDecode`] if the bytes are truncated or
/// not a recognized raster format.
/// Returns [`AnalysisError::DegenerateImage`] if the decoded image has a
/// zero width or height.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, AnalysisError> {
    if bytes.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?.to_rgb8();
    if img.width() == 0 || img.height() == 0 {
        return Err(AnalysisError::DegenerateImage {
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(img)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGB image as an in-memory PNG.
    pub(crate) fn encode_png(img: &RgbImage) -> Vec<u8> {
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

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode_rgb(&[]), Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_return_decode_error() {
        let result = decode_rgb(&[0xFF, 0xD8, 0x00, 0x01]);
        assert!(matches!(result, Err(AnalysisError::ImageDecode(_))));
    }

    #[test]
    fn truncated_png_returns_decode_error() {
        let img = RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let png = encode_png(&img);
        let result = decode_rgb(&png[..png.len() / 2]);
        assert!(matches!(result, Err(AnalysisError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_decodes_with_matching_dimensions() {
        let img = RgbImage::from_pixel(17, 31, image::Rgb([200, 100, 50]));
        let decoded = decode_rgb(&encode_png(&img)).unwrap();
        assert_eq!(decoded.width(), 17);
        assert_eq!(decoded.height(), 31);
        assert_eq!(decoded.get_pixel(0, 0).0, [200, 100, 50]);
    }

    #[test]
    fn jpeg_bytes_decode_without_declared_type() {
        // Encode as JPEG; the decoder must probe the bytes, not trust
        // any claimed media type.
        let img = RgbImage::from_pixel(16, 16, image::Rgb([128, 128, 128]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();

        let decoded = decode_rgb(&buf).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }
}
