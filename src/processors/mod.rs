//! Image processors for model input preparation.
//!
//! This module provides the deterministic transformations between a
//! decoded image and the canonical tensor the model consumes.

pub mod normalization;
pub mod resize;

pub use normalization::NormalizeImage;
pub use resize::{RESIZE_FILTER, ResizeToFixed};
