//! Model backends.
//!
//! A model maps one `(1, SEQUENCE_LENGTH, NUM_FEATURES)` batch of
//! normalized features to a single normalized forecast. The production
//! artifact is an ONNX graph; a JSON linear readout is supported as a
//! baseline.

use crate::error::PredictError;
use crate::sequence::{NUM_FEATURES, SEQUENCE_LENGTH};
use crate::Result;
use anyhow::Context;
use ndarray::{Array2, Array3, Axis};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

/// Shape of the single-sample batch every backend receives.
pub const BATCH_SHAPE: (usize, usize, usize) = (1, SEQUENCE_LENGTH, NUM_FEATURES);

/// A loaded, immutable forecasting model.
pub trait SequenceModel: Send + Sync {
    /// Run inference on one batch, returning the normalized prediction.
    fn infer(&self, batch: Array3<f32>) -> std::result::Result<f64, PredictError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Load a model artifact, choosing the backend from the file extension.
pub fn load_model(path: &Path) -> Result<Box<dyn SequenceModel>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("onnx") => Ok(Box::new(OnnxModel::new(path)?)),
        Some("json") => Ok(Box::new(LinearModel::from_file(path)?)),
        _ => anyhow::bail!(
            "unsupported model format {} (expected .onnx or .json)",
            path.display()
        ),
    }
}

/// ONNX Runtime backed model.
pub struct OnnxModel {
    /// `Session::run` needs exclusive access.
    session: Mutex<Session>,

    /// Name of the graph output holding the forecast
    output_name: String,
}

impl OnnxModel {
    /// Load an ONNX graph for single-threaded, deterministic inference.
    ///
    /// # Example
    /// ```no_run
    /// use cashflow_forecast::model::OnnxModel;
    /// use std::path::Path;
    ///
    /// let model = OnnxModel::new(Path::new("model/best_model.onnx")).unwrap();
    /// ```
    pub fn new(model_path: &Path) -> Result<Self> {
        if !model_path.is_file() {
            anyhow::bail!("model file not found: {}", model_path.display());
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(model_path)
            .with_context(|| format!("loading ONNX model {}", model_path.display()))?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .context("ONNX model declares no outputs")?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl SequenceModel for OnnxModel {
    fn infer(&self, batch: Array3<f32>) -> std::result::Result<f64, PredictError> {
        let input_tensor =
            Tensor::from_array(batch).map_err(|e| PredictError::inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictError::inference("ONNX session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PredictError::inference(e.to_string()))?;

        let output = outputs.get(&self.output_name).ok_or_else(|| {
            PredictError::inference(format!("missing model output {}", self.output_name))
        })?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictError::inference(e.to_string()))?;

        let y = *data
            .first()
            .ok_or_else(|| PredictError::inference("model returned an empty tensor"))?;
        Ok(y as f64)
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Linear readout over the whole window: `y = bias + sum(weights * x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One row of per-feature weights per time step
    pub weights: Vec<Vec<f64>>,

    pub bias: f64,
}

impl LinearModel {
    /// Build a model, checking the weight matrix matches the input window.
    pub fn new(weights: Vec<Vec<f64>>, bias: f64) -> Result<Self> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    /// Load a `{"weights": [[..]], "bias": ..}` artifact.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading model {}", path.display()))?;
        let model: LinearModel = serde_json::from_str(&raw)
            .with_context(|| format!("parsing model {}", path.display()))?;
        model
            .validate()
            .with_context(|| format!("invalid model {}", path.display()))?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let rows = self.weights.len();
        if rows != SEQUENCE_LENGTH {
            anyhow::bail!(
                "weights must have {} rows, got {}",
                SEQUENCE_LENGTH,
                rows
            );
        }
        if let Some((t, row)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != NUM_FEATURES)
        {
            anyhow::bail!(
                "weights row {} must have {} columns, got {}",
                t,
                NUM_FEATURES,
                row.len()
            );
        }
        let finite = self.bias.is_finite() && self.weights.iter().flatten().all(|w| w.is_finite());
        if !finite {
            anyhow::bail!("weights and bias must be finite");
        }
        Ok(())
    }

    fn weight_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((SEQUENCE_LENGTH, NUM_FEATURES), |(t, f)| self.weights[t][f])
    }
}

impl SequenceModel for LinearModel {
    fn infer(&self, batch: Array3<f32>) -> std::result::Result<f64, PredictError> {
        if batch.dim() != BATCH_SHAPE {
            return Err(PredictError::inference(format!(
                "expected batch shape {:?}, got {:?}",
                BATCH_SHAPE,
                batch.dim()
            )));
        }

        let sample = batch.index_axis(Axis(0), 0).mapv(|x| x as f64);
        Ok(self.bias + (&sample * &self.weight_matrix()).sum())
    }

    fn name(&self) -> &str {
        "linear"
    }
}
