//! Core traits for model inference.
//!
//! This module defines the seam between the inference pipeline and the
//! loaded model artifact, so the pipeline's decision logic can be
//! exercised without a model file on disk.

use crate::core::Tensor4D;
use crate::core::errors::ClassifierResult;
use crate::domain::ModelDescription;

/// Trait for models that map an image batch to a single probability.
///
/// Implementations own the loaded weights for the process lifetime and are
/// read-only after load; `predict` may be invoked concurrently from
/// multiple callers.
pub trait ProbabilityModel {
    /// Runs one forward pass over a batch of one image.
    ///
    /// # Arguments
    ///
    /// * `batch` - Input tensor of shape `[1, H, W, 3]` with values in
    ///   `[0.0, 1.0]`. The shape contract is the caller's responsibility;
    ///   implementations do not re-validate it.
    ///
    /// # Returns
    ///
    /// The raw probability of the positive ("damage") class.
    fn predict(&self, batch: &Tensor4D) -> ClassifierResult<f32>;

    /// Returns a structural description of the loaded model.
    fn describe(&self) -> ClassifierResult<ModelDescription>;
}
