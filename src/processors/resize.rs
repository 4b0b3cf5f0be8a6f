//! Fixed-size image resizing.
//!
//! Classification models take a fixed input resolution regardless of the
//! uploaded image's dimensions. The resize here is deterministic: the same
//! input bytes always produce the same output pixels.

use crate::core::{ClassifierError, ConfigValidator};
use image::RgbImage;
use image::imageops::FilterType;

/// Resizes images to an exact target size, ignoring aspect ratio.
#[derive(Debug)]
pub struct ResizeToFixed {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    filter: FilterType,
}

impl ResizeToFixed {
    /// Creates a resizer for the given target size using Lanczos3 resampling.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, ClassifierError> {
        Self::with_filter(width, height, FilterType::Lanczos3)
    }

    /// Creates a resizer with an explicit resampling filter.
    pub fn with_filter(
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> Result<Self, ClassifierError> {
        if width == 0 || height == 0 {
            return Err(ClassifierError::ConfigError {
                message: format!("resize target must be non-zero, got {width}x{height}"),
            });
        }
        Ok(Self {
            width,
            height,
            filter,
        })
    }

    /// Resizes the image to exactly the target dimensions.
    ///
    /// Inputs that already match the target are returned unchanged.
    pub fn apply(&self, img: &RgbImage) -> RgbImage {
        if img.dimensions() == (self.width, self.height) {
            return img.clone();
        }
        image::imageops::resize(img, self.width, self.height, self.filter)
    }
}

// ResizeToFixed carries no optional fields, so the validator only re-checks
// the invariants enforced by the constructors.
impl ConfigValidator for ResizeToFixed {
    fn validate(&self) -> Result<(), crate::core::ConfigError> {
        self.validate_image_dimensions(self.width, self.height)
    }

    fn get_defaults() -> Self {
        Self {
            width: 224,
            height: 224,
            filter: FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn resize_produces_exact_target_dimensions() {
        let resize = ResizeToFixed::new(224, 224).unwrap();

        for (w, h) in [(1, 1), (31, 97), (224, 224), (640, 480), (2000, 100)] {
            let img = RgbImage::from_pixel(w, h, Rgb([10, 20, 30]));
            let out = resize.apply(&img);
            assert_eq!(out.dimensions(), (224, 224), "input {w}x{h}");
        }
    }

    #[test]
    fn resize_is_deterministic() {
        let resize = ResizeToFixed::new(32, 32).unwrap();
        let img = RgbImage::from_fn(100, 60, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]));

        let a = resize.apply(&img);
        let b = resize.apply(&img);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(ResizeToFixed::new(0, 224).is_err());
        assert!(ResizeToFixed::new(224, 0).is_err());
    }
}
