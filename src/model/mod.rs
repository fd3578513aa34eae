//! Model Module - Classifier Inference
//!
//! The forest is loaded once at startup and shared read-only behind the
//! `Classifier` trait, so handlers never touch the artifact file.

pub mod forest;
pub mod predictor;

pub use forest::{ForestArtifact, ModelError, ModelInfo, RandomForest};
pub use predictor::{Classifier, PredictError, PredictionResult, Predictor};
