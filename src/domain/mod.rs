//! Domain types for damage classification.
//!
//! This module defines the typed records that flow through the service:
//! the two-valued classification label, the model-metadata record loaded
//! from the optional sidecar file, and the structural description of a
//! loaded model.

use crate::core::constants::DAMAGE_THRESHOLD;
use crate::core::errors::ClassifierResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The two-valued classification verdict.
///
/// Serializes to exactly `"damage"` or `"no_damage"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// The model considers the building undamaged.
    NoDamage,
    /// The model considers the building damaged.
    Damage,
}

impl Label {
    /// Applies the fixed threshold rule to a model probability.
    ///
    /// The boundary is inclusive on the damage side: a probability of
    /// exactly [`DAMAGE_THRESHOLD`] classifies as [`Label::Damage`].
    pub fn from_probability(probability: f32) -> Self {
        if probability >= DAMAGE_THRESHOLD {
            Label::Damage
        } else {
            Label::NoDamage
        }
    }

    /// Returns the wire representation of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Damage => "damage",
            Label::NoDamage => "no_damage",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk shape of the metadata sidecar. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ModelInfoFile {
    model_name: Option<String>,
    test_accuracy: Option<f64>,
    total_parameters: Option<u64>,
}

/// Metadata about the deployed model, loaded once at startup.
///
/// The backing sidecar file is optional; absent fields take the
/// documented sentinel defaults (`"Unknown"` for the name, `"N/A"` for
/// the accuracy on the wire, zero parameters). The record is never
/// mutated after load.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Human-readable model name.
    pub model_name: String,
    /// Held-out test accuracy recorded at training time, if known.
    pub test_accuracy: Option<f64>,
    /// Trainable parameter count recorded at export time, if known.
    pub total_parameters: u64,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            model_name: "Unknown".to_string(),
            test_accuracy: None,
            total_parameters: 0,
        }
    }
}

impl ModelInfo {
    /// Loads the metadata sidecar from the given path.
    ///
    /// An absent file yields the defaults; a present but unreadable or
    /// unparseable file is an error, which is fatal at startup.
    pub fn load(path: &Path) -> ClassifierResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "model info sidecar absent, using defaults");
            return Ok(Self::default());
        }

        let data = std::fs::read(path)?;
        let file: ModelInfoFile = serde_json::from_slice(&data)?;

        Ok(Self {
            model_name: file.model_name.unwrap_or_else(|| "Unknown".to_string()),
            test_accuracy: file.test_accuracy,
            total_parameters: file.total_parameters.unwrap_or(0),
        })
    }

    /// Returns the accuracy as a JSON value, `"N/A"` when unknown.
    pub fn test_accuracy_json(&self) -> serde_json::Value {
        match self.test_accuracy {
            Some(accuracy) => serde_json::json!(accuracy),
            None => serde_json::json!("N/A"),
        }
    }
}

/// Structural description of a loaded model.
///
/// Computed once at load time from session introspection; read-only
/// afterwards. Consumed by the summary endpoint.
#[derive(Debug, Clone)]
pub struct ModelDescription {
    /// Architecture name, derived from the model artifact.
    pub architecture_name: String,
    /// Textual summary of the graph's inputs and outputs.
    pub summary: String,
}
