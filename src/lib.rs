//! Inference service for net cash flow forecasting.
//!
//! Loads a trained sequence model and its two fitted scalers once at
//! startup, then serves forecasts for 7-day windows of 6 financial
//! features over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod predictor;
pub mod scaler;
pub mod sequence;

pub use config::{ArtifactPaths, Config};
pub use error::{ConfigError, PredictError};
pub use model::{LinearModel, OnnxModel, SequenceModel};
pub use predictor::{CashflowPredictor, Forecast};
pub use scaler::Scaler;
pub use sequence::{ObservedShape, Sequence, ShapeMismatch, NUM_FEATURES, SEQUENCE_LENGTH};

/// Library-wide error type.
pub type Result<T> = anyhow::Result<T>;
