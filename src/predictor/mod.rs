//! Task predictors.
//!
//! This module provides the high-level classification pipeline built on
//! top of the processors and the model adapter.

pub mod damage_classifier;

pub use damage_classifier::DamageClassifier;
