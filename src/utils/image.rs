//! Utility functions for image decoding and conversion.
//!
//! Uploaded files arrive as raw bytes; everything downstream works on
//! 3-channel 8-bit RGB. Grayscale and alpha-channel images are coerced to
//! RGB here, at the boundary.

use crate::core::ClassifierError;
use image::{DynamicImage, ImageBuffer, RgbImage};

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Decodes an in-memory byte buffer into an RGB image.
///
/// The format (JPEG, PNG, ...) is guessed from the content. Malformed or
/// non-image bytes yield an [`ClassifierError::ImageDecode`] error, never a
/// zero image.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ClassifierError> {
    let img = image::load_from_memory(bytes).map_err(ClassifierError::ImageDecode)?;
    Ok(dynamic_to_rgb(img))
}

/// Loads an image from a file path and converts it to RgbImage.
pub fn load_image(path: &std::path::Path) -> Result<RgbImage, ClassifierError> {
    let img = image::open(path).map_err(ClassifierError::ImageDecode)?;
    Ok(dynamic_to_rgb(img))
}

/// Creates an RgbImage from raw pixel data.
///
/// The data must be in RGB format (3 bytes per pixel) and its length must
/// match the given dimensions; otherwise `None` is returned.
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    if data.len() != (width * height * 3) as usize {
        return None;
    }

    ImageBuffer::from_raw(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_round_trips_png() {
        let img = RgbImage::from_pixel(5, 7, Rgb([1, 2, 3]));
        let decoded = decode_image(&png_bytes(&img)).unwrap();
        assert_eq!(decoded.dimensions(), (5, 7));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([1, 2, 3]));
    }

    #[test]
    fn decode_coerces_grayscale_and_alpha_to_rgb() {
        let gray = image::GrayImage::from_pixel(3, 3, image::Luma([100]));
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([100, 100, 100]));

        let rgba = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 8, 7, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([9, 8, 7]));
    }

    #[test]
    fn malformed_bytes_are_a_decode_error() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ClassifierError::ImageDecode(_)));
    }

    #[test]
    fn create_rgb_image_validates_length() {
        assert!(create_rgb_image(2, 2, vec![0; 12]).is_some());
        assert!(create_rgb_image(2, 2, vec![0; 11]).is_none());
    }
}
