//! Fitted feature scalers.
//!
//! Scalers are fitted offline and exported as JSON. At serving time they
//! only apply the stored per-column affine maps, forward for model inputs
//! and inverse for model outputs.

use crate::error::PredictError;
use crate::Result;
use anyhow::Context;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A fitted per-column linear scaler.
///
/// Artifact format is tagged by `kind`:
/// ```json
/// {"kind": "min_max", "scale": [0.5, 0.25], "min": [0.0, -1.0]}
/// {"kind": "standard", "mean": [10.0, 3.0], "scale": [2.0, 1.5]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `x' = x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },

    /// `x' = (x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Load and validate a scaler artifact.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scaler {}", path.display()))?;
        let scaler: Scaler = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scaler {}", path.display()))?;
        scaler
            .validate()
            .with_context(|| format!("invalid scaler {}", path.display()))?;
        Ok(scaler)
    }

    /// Number of columns this scaler was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::MinMax { scale, .. } => scale.len(),
            Scaler::Standard { mean, .. } => mean.len(),
        }
    }

    /// Check that parameter vectors agree in length and hold finite values.
    pub fn validate(&self) -> Result<()> {
        let (a, b) = self.params();
        if a.is_empty() {
            anyhow::bail!("scaler has no columns");
        }
        if a.len() != b.len() {
            anyhow::bail!(
                "parameter length mismatch: {} vs {}",
                a.len(),
                b.len()
            );
        }
        if let Some(bad) = a.iter().chain(b).find(|v| !v.is_finite()) {
            anyhow::bail!("non-finite scaler parameter {}", bad);
        }
        Ok(())
    }

    /// Map raw values to the normalized space, column by column.
    pub fn transform(&self, data: &Array2<f64>) -> std::result::Result<Array2<f64>, PredictError> {
        self.check_width(data)?;
        let (slope, intercept) = self.forward_coefficients();

        let mut out = data.clone();
        for (mut column, (m, c)) in out.axis_iter_mut(Axis(1)).zip(slope.iter().zip(&intercept)) {
            column.mapv_inplace(|x| x * m + c);
        }
        Ok(out)
    }

    /// Map normalized values back to real units, column by column.
    pub fn inverse_transform(
        &self,
        data: &Array2<f64>,
    ) -> std::result::Result<Array2<f64>, PredictError> {
        self.check_width(data)?;
        let (slope, intercept) = self.forward_coefficients();

        let mut out = data.clone();
        for (mut column, (m, c)) in out.axis_iter_mut(Axis(1)).zip(slope.iter().zip(&intercept)) {
            column.mapv_inplace(|y| (y - c) / m);
        }
        Ok(out)
    }

    fn params(&self) -> (&[f64], &[f64]) {
        match self {
            Scaler::MinMax { scale, min } => (scale, min),
            Scaler::Standard { mean, scale } => (mean, scale),
        }
    }

    /// Express either kind as `x' = x * slope + intercept`.
    fn forward_coefficients(&self) -> (Vec<f64>, Vec<f64>) {
        match self {
            Scaler::MinMax { scale, min } => (
                scale.iter().map(|&s| nonzero(s)).collect(),
                min.clone(),
            ),
            Scaler::Standard { mean, scale } => {
                let slope: Vec<f64> = scale.iter().map(|&s| 1.0 / nonzero(s)).collect();
                let intercept = mean.iter().zip(&slope).map(|(mu, m)| -mu * m).collect();
                (slope, intercept)
            }
        }
    }

    fn check_width(&self, data: &Array2<f64>) -> std::result::Result<(), PredictError> {
        let expected = self.n_features();
        let got = data.ncols();
        if got != expected {
            return Err(PredictError::scaling(format!(
                "scaler expects {} columns, got {}",
                expected, got
            )));
        }
        Ok(())
    }
}

// Constant columns are fitted with a zero spread; treat them as identity.
fn nonzero(s: f64) -> f64 {
    if s == 0.0 {
        1.0
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    fn min_max() -> Scaler {
        // fitted on columns with ranges [0, 200] and [-10, 10]
        Scaler::MinMax {
            scale: vec![0.005, 0.05],
            min: vec![0.0, 0.5],
        }
    }

    fn standard() -> Scaler {
        Scaler::Standard {
            mean: vec![100.0, 2.0],
            scale: vec![20.0, 0.0],
        }
    }

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9 * (1.0 + y.abs()), "{} != {}", x, y);
        }
    }

    #[test]
    fn test_min_max_transform() {
        let data = array![[0.0, -10.0], [200.0, 10.0], [100.0, 0.0]];
        let scaled = min_max().transform(&data).unwrap();
        assert_close(&scaled, &array![[0.0, 0.0], [1.0, 1.0], [0.5, 0.5]]);
    }

    #[test]
    fn test_standard_transform_with_constant_column() {
        let data = array![[120.0, 2.0], [80.0, 5.0]];
        let scaled = standard().transform(&data).unwrap();
        assert_close(&scaled, &array![[1.0, 0.0], [-1.0, 3.0]]);
    }

    #[test]
    fn test_round_trip() {
        let data = array![[100.0, 50.0], [-3.5, 0.0], [1.0e6, 7.25]];
        for scaler in [min_max(), standard()] {
            let scaled = scaler.transform(&data).unwrap();
            let restored = scaler.inverse_transform(&scaled).unwrap();
            assert_close(&restored, &data);
        }
    }

    #[test]
    fn test_width_mismatch() {
        let data = array![[1.0, 2.0, 3.0]];
        let err = min_max().transform(&data).unwrap_err();
        assert!(err.to_string().contains("expects 2 columns, got 3"));
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let empty = Scaler::MinMax {
            scale: vec![],
            min: vec![],
        };
        assert!(empty.validate().is_err());

        let uneven = Scaler::Standard {
            mean: vec![1.0, 2.0],
            scale: vec![1.0],
        };
        assert!(uneven.validate().is_err());

        let nan = Scaler::Standard {
            mean: vec![f64::NAN],
            scale: vec![1.0],
        };
        assert!(nan.validate().is_err());

        assert!(min_max().validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"kind": "standard", "mean": [5.0], "scale": [2.0]}}"#).unwrap();

        let scaler = Scaler::from_file(file.path()).unwrap();
        assert_eq!(scaler.n_features(), 1);
        assert_eq!(
            scaler,
            Scaler::Standard {
                mean: vec![5.0],
                scale: vec![2.0]
            }
        );
    }

    #[test]
    fn test_from_file_missing() {
        let err = Scaler::from_file(Path::new("/nonexistent/scaler_X.json")).unwrap_err();
        assert!(err.to_string().contains("scaler_X.json"));
    }

    #[test]
    fn test_from_file_unknown_kind() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"kind": "robust", "center": [0.0]}}"#).unwrap();
        assert!(Scaler::from_file(file.path()).is_err());
    }
}
