//! Error types for the classification service.
//!
//! This module defines the error types that can occur while serving
//! predictions, including image decoding errors, preprocessing errors,
//! model loading and inference errors, and configuration errors. It also
//! provides utility constructors for creating these errors with
//! appropriate context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Enum representing different stages of preprocessing.
///
/// This enum is used to identify which stage of the inference pipeline an
/// error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred during pixel normalization.
    Normalization,
    /// Error occurred during image resizing.
    Resize,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the classification service.
///
/// Variants fall into two response classes: client-caused errors (malformed
/// or missing image payloads) and internal errors (preprocessing, inference
/// runtime, configuration). Use [`ClassifierError::is_client_error`] to
/// distinguish them at the HTTP boundary.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The submitted bytes could not be decoded as an image.
    #[error("image decode")]
    ImageDecode(#[source] image::ImageError),

    /// Error occurred during preprocessing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of preprocessing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during inference.
    #[error("inference")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// The model artifact could not be loaded. Fatal at startup.
    #[error("failed to load model from {path}: {context}")]
    ModelLoad {
        /// Path of the model artifact.
        path: PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying runtime error, if any.
        #[source]
        source: Option<ort::Error>,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),
}

/// Convenient result alias for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;

impl ClassifierError {
    /// Returns true if the error was caused by the client's request payload.
    ///
    /// Client-caused errors map to 400-class HTTP responses; everything
    /// else is an internal failure and maps to a 500-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ClassifierError::ImageDecode(_) | ClassifierError::InvalidInput { .. }
        )
    }

    /// Creates a ClassifierError for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::TensorOperation,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifierError for normalization operations.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Normalization,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifierError for resize operations.
    pub fn resize_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Resize,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a ClassifierError for inference operations.
    pub fn inference_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Inference(Box::new(error))
    }

    /// Creates a ClassifierError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a ClassifierError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a ClassifierError for model load failures.
    pub fn model_load_error(
        path: &Path,
        context: impl Into<String>,
        source: Option<ort::Error>,
    ) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.into(),
            source,
        }
    }
}

impl From<image::ImageError> for ClassifierError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageDecode(error)
    }
}

/// A simple error type carrying only a message.
///
/// Used as the source of errors that have no underlying library error.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}
