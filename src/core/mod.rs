//! Core types for the classification service.
//!
//! This module provides error handling, configuration, the inference
//! engine, and the trait seam between the pipeline and the loaded model.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod traits;

pub use config::ServiceConfig;
pub use errors::{ClassifierError, ClassifierResult, ProcessingStage, SimpleError};
pub use inference::OrtInfer;
pub use traits::ProbabilityModel;

/// A 4-dimensional f32 tensor, the canonical model input format.
pub type Tensor4D = ndarray::Array4<f32>;
