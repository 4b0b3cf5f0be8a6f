//! Image normalization for model input.
//!
//! This module converts 8-bit RGB pixels into the floating-point range a
//! pretrained network was trained against. Normalization is expressed as a
//! per-channel affine transform: `value * alpha[c] + beta[c]`, where
//! `alpha = scale / std` and `beta = -mean / std`.

use crate::core::{ClassifierError, Tensor4D};
use crate::processors::types::ChannelOrder;
use image::RgbImage;

/// Normalizes images for model input.
///
/// Encapsulates the scaling factors, mean values, standard deviations, and
/// channel ordering required by a specific model family.
#[derive(Debug)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: Vec<f32>,
    /// Offset values for each channel (beta = -mean / std)
    pub beta: Vec<f32>,
    /// Channel ordering of the produced tensor (CHW or HWC)
    pub order: ChannelOrder,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values per channel (defaults to [0.485, 0.456, 0.406])
    /// * `std` - Optional standard deviations per channel (defaults to [0.229, 0.224, 0.225])
    /// * `order` - Optional channel ordering (defaults to HWC)
    ///
    /// # Errors
    ///
    /// Returns an error if scale is not positive, mean or std do not have
    /// exactly 3 elements, or any standard deviation is not positive.
    pub fn new(
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
        order: Option<ChannelOrder>,
    ) -> Result<Self, ClassifierError> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or_else(|| vec![0.485, 0.456, 0.406]);
        let std = std.unwrap_or_else(|| vec![0.229, 0.224, 0.225]);
        let order = order.unwrap_or(ChannelOrder::HWC);

        if scale <= 0.0 {
            return Err(ClassifierError::ConfigError {
                message: "Scale must be greater than 0".to_string(),
            });
        }

        if mean.len() != 3 {
            return Err(ClassifierError::ConfigError {
                message: "Mean must have exactly 3 elements for RGB".to_string(),
            });
        }

        if std.len() != 3 {
            return Err(ClassifierError::ConfigError {
                message: "Std must have exactly 3 elements for RGB".to_string(),
            });
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ClassifierError::ConfigError {
                    message: format!(
                        "Standard deviation at index {i} must be greater than 0, got {s}"
                    ),
                });
            }
        }

        let alpha: Vec<f32> = std.iter().map(|s| scale / s).collect();
        let beta: Vec<f32> = mean.iter().zip(&std).map(|(m, s)| -m / s).collect();

        Ok(Self { alpha, beta, order })
    }

    /// Creates the normalization used by the MobileNet family.
    ///
    /// Maps 8-bit pixel values into [-1, 1] via `x * 2/255 - 1`, producing an
    /// HWC tensor:
    /// * Scale: 2.0/255.0
    /// * Mean: [1.0, 1.0, 1.0]
    /// * Std: [1.0, 1.0, 1.0]
    /// * Order: HWC
    pub fn for_mobilenet() -> Result<Self, ClassifierError> {
        Self::new(
            Some(2.0 / 255.0),
            Some(vec![1.0, 1.0, 1.0]),
            Some(vec![1.0, 1.0, 1.0]),
            Some(ChannelOrder::HWC),
        )
    }

    /// Normalizes a single image and returns it as a 4D tensor with a leading
    /// batch dimension of 1.
    ///
    /// The output shape is (1, C, H, W) for CHW order or (1, H, W, C) for HWC
    /// order.
    pub fn normalize_to(&self, img: &RgbImage) -> Result<Tensor4D, ClassifierError> {
        let (width, height) = img.dimensions();
        let channels = 3u32;

        match self.order {
            ChannelOrder::CHW => {
                let mut result = vec![0.0f32; (channels * height * width) as usize];

                for c in 0..channels {
                    for y in 0..height {
                        for x in 0..width {
                            let pixel = img.get_pixel(x, y);
                            let channel_value = pixel[c as usize] as f32;
                            let dst_idx = (c * height * width + y * width + x) as usize;

                            result[dst_idx] =
                                channel_value * self.alpha[c as usize] + self.beta[c as usize];
                        }
                    }
                }

                ndarray::Array4::from_shape_vec(
                    (1, channels as usize, height as usize, width as usize),
                    result,
                )
                .map_err(|e| {
                    ClassifierError::normalization(
                        &format!("failed to create CHW tensor for {width}x{height} image"),
                        e,
                    )
                })
            }
            ChannelOrder::HWC => {
                let mut result = vec![0.0f32; (height * width * channels) as usize];

                for y in 0..height {
                    for x in 0..width {
                        let pixel = img.get_pixel(x, y);
                        for c in 0..channels {
                            let channel_value = pixel[c as usize] as f32;
                            let dst_idx = (y * width * channels + x * channels + c) as usize;

                            result[dst_idx] =
                                channel_value * self.alpha[c as usize] + self.beta[c as usize];
                        }
                    }
                }

                ndarray::Array4::from_shape_vec(
                    (1, height as usize, width as usize, channels as usize),
                    result,
                )
                .map_err(|e| {
                    ClassifierError::normalization(
                        &format!("failed to create HWC tensor for {width}x{height} image"),
                        e,
                    )
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid_image(width: u32, height: u32, pixel: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(pixel))
    }

    #[test]
    fn mobilenet_normalization_maps_into_unit_range() {
        let normalize = NormalizeImage::for_mobilenet().unwrap();

        let black = normalize.normalize_to(&solid_image(4, 4, [0, 0, 0])).unwrap();
        let white = normalize
            .normalize_to(&solid_image(4, 4, [255, 255, 255]))
            .unwrap();

        assert!(black.iter().all(|&v| (v - -1.0).abs() < 1e-6));
        assert!(white.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn hwc_tensor_has_batch_dimension() {
        let normalize = NormalizeImage::for_mobilenet().unwrap();
        let tensor = normalize.normalize_to(&solid_image(8, 6, [128, 0, 255])).unwrap();
        assert_eq!(tensor.shape(), &[1, 6, 8, 3]);
    }

    #[test]
    fn chw_tensor_has_channel_major_layout() {
        let normalize = NormalizeImage::new(
            Some(1.0 / 255.0),
            Some(vec![0.0, 0.0, 0.0]),
            Some(vec![1.0, 1.0, 1.0]),
            Some(ChannelOrder::CHW),
        )
        .unwrap();

        let mut img = solid_image(2, 1, [0, 0, 0]);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));

        let tensor = normalize.normalize_to(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 1, 2]);
        // Red channel of the first pixel lands at (0, 0, 0, 0).
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 0]]).abs() < 1e-6);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(NormalizeImage::new(Some(0.0), None, None, None).is_err());
        assert!(NormalizeImage::new(None, Some(vec![0.5]), None, None).is_err());
        assert!(
            NormalizeImage::new(None, None, Some(vec![1.0, 0.0, 1.0]), None).is_err()
        );
    }
}
