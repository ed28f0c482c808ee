//! ONNX Runtime inference engine for the damage classifier.
//!
//! Wraps one or more mutex-guarded ONNX Runtime sessions and exposes a
//! single-probability forward pass. Sessions are committed from the model
//! file at startup; the handle is immutable afterwards and may be shared
//! across request workers.

use crate::core::Tensor4D;
use crate::core::errors::{ClassifierError, ClassifierResult, SimpleError};
use crate::core::traits::ProbabilityModel;
use crate::domain::ModelDescription;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// ONNX Runtime inference engine holding a pool of sessions.
///
/// The pool is dispatched round-robin; each session is guarded by a mutex
/// held only for the duration of one forward pass, which serializes calls
/// into the runtime without blocking preprocessing.
pub struct OrtInfer {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
    model_name: String,
    description: ModelDescription,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

/// Formats a declared tensor shape, rendering dynamic dimensions as `None`.
fn format_shape(dims: &[i64]) -> String {
    let rendered: Vec<String> = dims
        .iter()
        .map(|d| {
            if *d < 0 {
                "None".to_string()
            } else {
                d.to_string()
            }
        })
        .collect();
    format!("[{}]", rendered.join(", "))
}

impl OrtInfer {
    /// Creates a new OrtInfer instance with a single session.
    ///
    /// The primary input and output names are discovered from the session
    /// rather than assumed, since exported graphs name them unpredictably.
    ///
    /// # Errors
    ///
    /// Returns a `ModelLoad` error if the file is missing, corrupt, or its
    /// serialized graph cannot be reconstructed by the runtime. This
    /// failure is fatal to the process.
    pub fn new(model_path: impl AsRef<Path>) -> ClassifierResult<Self> {
        Self::with_pool_size(model_path, 1)
    }

    /// Creates a new OrtInfer instance with a pool of `pool_size` sessions.
    ///
    /// A pool size above 1 allows concurrent forward passes at the cost of
    /// loading the weights once per session.
    pub fn with_pool_size(model_path: impl AsRef<Path>, pool_size: usize) -> ClassifierResult<Self> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);

        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = Session::builder()?
                .with_log_level(LogLevel::Error)?
                .commit_from_file(path)
                .map_err(|e| {
                    ClassifierError::model_load_error(
                        path,
                        "failed to create ONNX session",
                        Some(e),
                    )
                })?;
            sessions.push(Mutex::new(session));
        }

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        let (input_name, output_name, description) = {
            let session = sessions[0].lock().map_err(|_| {
                ClassifierError::model_load_error(
                    path,
                    "failed to acquire session lock during load",
                    None,
                )
            })?;

            let input = session.inputs.first().ok_or_else(|| {
                ClassifierError::model_load_error(path, "model declares no inputs", None)
            })?;
            let output = session.outputs.first().ok_or_else(|| {
                ClassifierError::model_load_error(path, "model declares no outputs", None)
            })?;

            let mut summary = format!("Model: {model_name}\n");
            for io in &session.inputs {
                if let ValueType::Tensor { shape, .. } = &io.input_type {
                    let dims: Vec<i64> = shape.iter().copied().collect();
                    summary.push_str(&format!(
                        "  input  {} {}\n",
                        io.name,
                        format_shape(&dims)
                    ));
                }
            }
            for io in &session.outputs {
                if let ValueType::Tensor { shape, .. } = &io.output_type {
                    let dims: Vec<i64> = shape.iter().copied().collect();
                    summary.push_str(&format!(
                        "  output {} {}\n",
                        io.name,
                        format_shape(&dims)
                    ));
                }
            }

            (
                input.name.clone(),
                output.name.clone(),
                ModelDescription {
                    architecture_name: model_name.clone(),
                    summary,
                },
            )
        };

        Ok(OrtInfer {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            output_name,
            model_path: path.to_path_buf(),
            model_name,
            description,
        })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Runs one forward pass and extracts the scalar probability.
    ///
    /// Expects the model to end in a single-unit sigmoid head, i.e. an
    /// output of shape `[batch, 1]`.
    fn predict_scalar(&self, x: &Tensor4D) -> ClassifierResult<f32> {
        let input_shape = x.shape().to_vec();
        let batch_size = input_shape[0];

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ClassifierError::tensor_operation(
                &format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            ClassifierError::inference_error(SimpleError::new(format!(
                "failed to acquire session lock for session {}/{}",
                idx,
                self.sessions.len()
            )))
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            ClassifierError::inference_error(SimpleError::new(format!(
                "ONNX Runtime forward pass failed for model '{}' with input '{}': {e}",
                self.model_name, self.input_name
            )))
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifierError::inference_error(SimpleError::new(format!(
                    "failed to extract output tensor '{}' as f32: {e}",
                    self.output_name
                )))
            })?;

        if output_shape.len() != 2 || output_shape[1] != 1 {
            return Err(ClassifierError::inference_error(SimpleError::new(format!(
                "model '{}': expected output shape [batch, 1], got {output_shape:?}",
                self.model_name
            ))));
        }

        if output_data.len() != batch_size {
            return Err(ClassifierError::inference_error(SimpleError::new(format!(
                "model '{}': output data size mismatch, expected {batch_size}, got {}",
                self.model_name,
                output_data.len()
            ))));
        }

        Ok(output_data[0])
    }
}

impl ProbabilityModel for OrtInfer {
    fn predict(&self, batch: &Tensor4D) -> ClassifierResult<f32> {
        self.predict_scalar(batch)
    }

    fn describe(&self) -> ClassifierResult<ModelDescription> {
        Ok(self.description.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fails_for_missing_model_file() {
        let result = OrtInfer::new("no_such_model.onnx");
        assert!(matches!(
            result,
            Err(ClassifierError::ModelLoad { .. }) | Err(ClassifierError::Session(_))
        ));
    }

    #[test]
    fn pool_size_is_clamped_to_one() {
        // A pool size of 0 must not produce an empty pool; the load still
        // fails here because the artifact does not exist.
        let result = OrtInfer::with_pool_size("no_such_model.onnx", 0);
        assert!(result.is_err());
    }

    #[test]
    fn shapes_render_dynamic_dims_as_none() {
        assert_eq!(format_shape(&[-1, 128, 128, 3]), "[None, 128, 128, 3]");
        assert_eq!(format_shape(&[-1, 1]), "[None, 1]");
    }
}
