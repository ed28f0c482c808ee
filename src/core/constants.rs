//! Constants used throughout the classification service.
//!
//! This module defines the fixed values of the inference contract: the
//! canonical model input size, the pixel scaling factor, and the decision
//! threshold, along with default filesystem and network settings.

/// The width of the canonical model input, in pixels.
///
/// This must match the size the model was trained against; feeding any
/// other width silently produces meaningless predictions.
pub const MODEL_INPUT_WIDTH: u32 = 128;

/// The height of the canonical model input, in pixels.
pub const MODEL_INPUT_HEIGHT: u32 = 128;

/// The number of color channels in the canonical model input.
pub const MODEL_INPUT_CHANNELS: usize = 3;

/// The scaling factor applied to 8-bit pixel values.
///
/// Maps the integer range `[0, 255]` onto `[0.0, 1.0]`, matching the
/// normalization used during training.
pub const PIXEL_SCALE: f32 = 1.0 / 255.0;

/// The probability threshold separating the two output classes.
///
/// The boundary is inclusive on the "damage" side: a probability of
/// exactly 0.5 classifies as damage.
pub const DAMAGE_THRESHOLD: f32 = 0.5;

/// The two output classes, indexed by the model's class id.
pub const PREDICTION_CLASSES: [&str; 2] = ["no_damage", "damage"];

/// The default path of the serialized model artifact.
pub const DEFAULT_MODEL_PATH: &str = "best_model.onnx";

/// The default path of the optional model-metadata sidecar.
pub const DEFAULT_MODEL_INFO_PATH: &str = "best_model_info.json";

/// The default host the HTTP server binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The default port the HTTP server binds to.
pub const DEFAULT_PORT: u16 = 5000;

/// The maximum accepted request body size, in bytes.
///
/// Applies to both raw-body and multipart image uploads.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
