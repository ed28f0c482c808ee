//! Utility functions for the classification service.

pub mod image;

pub use image::{decode_image, dynamic_to_rgb};
