//! Utility functions for image handling.
//!
//! This module provides functions for decoding submitted image bytes and
//! converting them into the 8-bit RGB representation the preprocessing
//! pipeline operates on.

use crate::core::errors::{ClassifierError, ClassifierResult};
use image::{DynamicImage, RgbImage};

/// Converts a DynamicImage to an RgbImage.
///
/// Grayscale, alpha-carrying, and palette-indexed images become
/// three-channel RGB; the conversion is the identity for images that are
/// already RGB.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Decodes an in-memory byte buffer into an RGB image.
///
/// The buffer may hold any format the image decoder recognizes (JPEG,
/// PNG, ...). The format is sniffed from the bytes themselves.
///
/// # Errors
///
/// Returns `ClassifierError::ImageDecode` if the bytes are not a
/// recognizable image or are truncated/corrupt. This is a client-class
/// error; it never crashes the service.
pub fn decode_image(bytes: &[u8]) -> ClassifierResult<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(ClassifierError::ImageDecode)?;
    Ok(dynamic_to_rgb(img))
}
