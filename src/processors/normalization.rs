//! Pixel normalization for model input preparation.
//!
//! This module converts 8-bit RGB images into the floating-point tensor
//! format the model consumes: values scaled into `[0.0, 1.0]`, laid out
//! height-width-channel, wrapped as a batch of one.

use crate::core::Tensor4D;
use crate::core::errors::{ClassifierError, ClassifierResult};
use image::RgbImage;

/// Normalizes images into the canonical model input tensor.
///
/// This struct encapsulates the pixel scaling factor applied to each
/// channel. The emitted layout is NHWC, matching the model's trained
/// input signature.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factor applied to each 8-bit channel value.
    pub scale: f32,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified scale.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    ///
    /// # Errors
    ///
    /// Returns an error if the scale is not finite or not greater than 0.
    pub fn new(scale: Option<f32>) -> ClassifierResult<Self> {
        let scale = scale.unwrap_or(1.0 / 255.0);

        if !scale.is_finite() || scale <= 0.0 {
            return Err(ClassifierError::config_error(format!(
                "normalization scale must be a positive finite number, got {scale}"
            )));
        }

        Ok(Self { scale })
    }

    /// Normalizes a single image into a singleton-batch 4D tensor.
    ///
    /// # Arguments
    ///
    /// * `img` - The RGB image to normalize. Expected to already be at
    ///   the model's spatial input size.
    ///
    /// # Returns
    ///
    /// A tensor of shape `[1, height, width, 3]` with every element in
    /// `[0.0, 1.0]` (given the default scale).
    pub fn normalize_to(&self, img: &RgbImage) -> ClassifierResult<Tensor4D> {
        let (width, height) = img.dimensions();
        let channels = 3usize;

        let mut result = vec![0.0f32; height as usize * width as usize * channels];

        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x, y);
                for c in 0..channels {
                    let dst_idx =
                        (y as usize * width as usize + x as usize) * channels + c;
                    result[dst_idx] = pixel[c] as f32 * self.scale;
                }
            }
        }

        let expected_len = result.len();
        ndarray::Array4::from_shape_vec(
            (1, height as usize, width as usize, channels),
            result,
        )
        .map_err(|e| {
            ClassifierError::tensor_operation(
                &format!(
                    "failed to create batch tensor [1, {height}, {width}, {channels}] from {expected_len} elements"
                ),
                e,
            )
        })
    }
}

impl Default for NormalizeImage {
    fn default() -> Self {
        Self { scale: 1.0 / 255.0 }
    }
}
