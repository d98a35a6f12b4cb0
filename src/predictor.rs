//! Cash flow prediction pipeline.
//!
//! Holds the loaded model and both fitted scalers, and turns a validated
//! input window into a forecast in real currency units.

use crate::config::ArtifactPaths;
use crate::error::PredictError;
use crate::model::{load_model, SequenceModel, BATCH_SHAPE};
use crate::scaler::Scaler;
use crate::sequence::{Sequence, NUM_FEATURES};
use crate::Result;
use anyhow::Context;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A de-normalized net cash flow forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub predicted_net_cashflow: f64,
}

/// Model plus scalers, loaded once and shared read-only by every request.
pub struct CashflowPredictor {
    model: Box<dyn SequenceModel>,

    /// Maps raw features into the space the model was trained on
    input_scaler: Scaler,

    /// Maps model output back to currency units
    target_scaler: Scaler,
}

impl CashflowPredictor {
    /// Assemble a predictor from already-loaded parts.
    pub fn new(
        model: Box<dyn SequenceModel>,
        input_scaler: Scaler,
        target_scaler: Scaler,
    ) -> Result<Self> {
        if input_scaler.n_features() != NUM_FEATURES {
            anyhow::bail!(
                "input scaler has {} columns, expected {}",
                input_scaler.n_features(),
                NUM_FEATURES
            );
        }
        if target_scaler.n_features() != 1 {
            anyhow::bail!(
                "target scaler has {} columns, expected 1",
                target_scaler.n_features()
            );
        }

        Ok(Self {
            model,
            input_scaler,
            target_scaler,
        })
    }

    /// Load the model and both scalers from disk.
    ///
    /// # Example
    /// ```no_run
    /// use cashflow_forecast::{ArtifactPaths, CashflowPredictor};
    ///
    /// let predictor = CashflowPredictor::load(&ArtifactPaths::in_dir("model")).unwrap();
    /// ```
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        info!("Loading model from {}", paths.model.display());
        let model = load_model(&paths.model)?;

        info!("Loading input scaler from {}", paths.input_scaler.display());
        let input_scaler = Scaler::from_file(&paths.input_scaler)?;

        info!("Loading target scaler from {}", paths.target_scaler.display());
        let target_scaler = Scaler::from_file(&paths.target_scaler)?;

        let predictor = Self::new(model, input_scaler, target_scaler)
            .context("artifacts do not fit together")?;
        info!("Loaded {} model", predictor.model.name());
        Ok(predictor)
    }

    /// Forecast the next net cash flow from a 7-step window.
    pub fn predict(&self, sequence: &Sequence) -> std::result::Result<Forecast, PredictError> {
        info!(raw = ?sequence.values(), "Predict input");

        let scaled = self.input_scaler.transform(sequence.values())?;
        let batch = Self::to_batch(&scaled)?;

        let y_scaled = self.model.infer(batch)?;
        if !y_scaled.is_finite() {
            return Err(PredictError::NonFinite {
                stage: "inference",
                value: y_scaled,
            });
        }
        info!(y_scaled, "Predicted scaled cash flow");

        let y = self
            .target_scaler
            .inverse_transform(&Array2::from_elem((1, 1), y_scaled))?[[0, 0]];
        if !y.is_finite() {
            return Err(PredictError::NonFinite {
                stage: "inverse target scaling",
                value: y,
            });
        }
        info!(y, "Predicted cash flow");

        Ok(Forecast {
            predicted_net_cashflow: y,
        })
    }

    /// Wrap a scaled window into a single-sample `f32` batch.
    fn to_batch(scaled: &Array2<f64>) -> std::result::Result<Array3<f32>, PredictError> {
        if let Some(bad) = scaled.iter().find(|v| !v.is_finite() || v.abs() > f32::MAX as f64) {
            return Err(PredictError::NonFinite {
                stage: "input scaling",
                value: *bad,
            });
        }

        let flat: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        Array3::from_shape_vec(BATCH_SHAPE, flat)
            .map_err(|e| PredictError::scaling(format!("cannot reshape to batch: {}", e)))
    }
}
