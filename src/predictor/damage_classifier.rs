//! Building-damage classifier.
//!
//! This module provides the request-to-decision pipeline: it decodes a
//! submitted image byte buffer, normalizes it into the canonical tensor
//! shape, invokes the model, and reduces the scalar output to a
//! two-valued label under the fixed threshold rule.
//!
//! The classifier is generic over [`ProbabilityModel`] so the pipeline
//! can be exercised against stub models in tests.

use crate::core::Tensor4D;
use crate::core::constants::{MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH, PIXEL_SCALE};
use crate::core::errors::ClassifierResult;
use crate::core::traits::ProbabilityModel;
use crate::domain::Label;
use crate::processors::{NormalizeImage, ResizeToFixed};
use crate::utils::decode_image;
use image::RgbImage;
use tracing::debug;

/// Classifier mapping raw image bytes to a damage verdict.
///
/// Stateless across requests: every invocation is an independent pure
/// transformation keyed only by its input bytes and the shared read-only
/// model handle.
#[derive(Debug)]
pub struct DamageClassifier<M> {
    model: M,
    resize: ResizeToFixed,
    normalize: NormalizeImage,
}

impl<M: ProbabilityModel> DamageClassifier<M> {
    /// Creates a classifier around the given model handle.
    ///
    /// The preprocessing parameters are fixed by the model's training
    /// contract: 128x128 RGB input scaled into `[0.0, 1.0]`.
    pub fn new(model: M) -> ClassifierResult<Self> {
        Ok(Self {
            model,
            resize: ResizeToFixed::new(MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT),
            normalize: NormalizeImage::new(Some(PIXEL_SCALE))?,
        })
    }

    /// Returns the wrapped model handle.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Transforms a decoded RGB image into the canonical input tensor.
    ///
    /// Resizes anisotropically to the model's spatial size, scales pixel
    /// values into `[0.0, 1.0]`, and wraps the result as a batch of one,
    /// producing shape `[1, 128, 128, 3]`.
    pub fn preprocess(&self, img: &RgbImage) -> ClassifierResult<Tensor4D> {
        let resized = self.resize.apply(img);
        self.normalize.normalize_to(&resized)
    }

    /// Classifies a submitted image byte buffer.
    ///
    /// Decodes the bytes (any format the image decoder recognizes),
    /// converts to RGB if needed, preprocesses into the canonical tensor,
    /// runs one forward pass, and applies the threshold rule.
    ///
    /// # Errors
    ///
    /// * `ImageDecode` if the bytes are not a decodable image — a
    ///   client-class, request-scoped failure. The model is never invoked
    ///   in this case.
    /// * Internal-class errors if tensor construction or the forward pass
    ///   fails unexpectedly.
    pub fn classify(&self, bytes: &[u8]) -> ClassifierResult<Label> {
        let img = decode_image(bytes)?;
        let tensor = self.preprocess(&img)?;
        let probability = self.model.predict(&tensor)?;
        let label = Label::from_probability(probability);
        debug!(probability, %label, "classified image");
        Ok(label)
    }
}
