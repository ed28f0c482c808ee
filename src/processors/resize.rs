//! Image resizing for model input preparation.
//!
//! This module scales decoded images to the fixed spatial size the model
//! expects. The resize is anisotropic: the original aspect ratio is not
//! preserved and no cropping or letterboxing is applied, matching the
//! preprocessing the model was trained with.

use image::RgbImage;
use image::imageops::{self, FilterType};

/// The resampling filter used for every resize.
///
/// Bilinear, fixed for the lifetime of a deployment: varying the filter
/// shifts numeric outputs near the decision boundary.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Resizes images to a fixed target size.
#[derive(Debug, Clone)]
pub struct ResizeToFixed {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

impl ResizeToFixed {
    /// Creates a resizer for the given target size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales the image to exactly the target size.
    ///
    /// Inputs already at the target size are still passed through the
    /// resampler, so the operation is uniform for every request.
    pub fn apply(&self, img: &RgbImage) -> RgbImage {
        imageops::resize(img, self.width, self.height, RESIZE_FILTER)
    }
}
