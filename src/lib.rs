//! # Damage Classifier
//!
//! A synchronous HTTP inference service for binary building-damage image
//! classification.
//!
//! This crate provides:
//! - Error handling types
//! - The ONNX Runtime model adapter
//! - Image processors (resize, normalization)
//! - The request-to-decision classification pipeline
//! - The HTTP surface exposing it
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, the inference engine, and traits
//! * [`domain`] - Labels and model metadata
//! * [`processors`] - Image preprocessing
//! * [`predictor`] - The classification pipeline
//! * [`server`] - HTTP router and server
//! * [`utils`] - Image decoding helpers

pub mod core;
pub mod domain;
pub mod predictor;
pub mod processors;
pub mod server;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error handling
    pub use crate::core::{ClassifierError, ClassifierResult};

    // Core types
    pub use crate::core::{OrtInfer, ProbabilityModel, ServiceConfig, Tensor4D};

    // Domain types
    pub use crate::domain::{Label, ModelDescription, ModelInfo};

    // Pipeline
    pub use crate::predictor::DamageClassifier;

    // HTTP surface
    pub use crate::server::{AppState, HttpServer, create_router};
}
