//! Error types for the forecast service.
//!
//! Artifact loading uses the crate-wide `anyhow` alias. Failures inside a
//! single prediction are typed so the HTTP layer can map them to a status.

use thiserror::Error;

/// Failure while scaling or running inference for one request.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Scaler could not be applied to the input or output.
    #[error("Scaling failed: {0}")]
    Scaling(String),

    /// Model rejected the batch or produced unusable output.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// A stage produced NaN or infinity.
    #[error("Non-finite value {value} after {stage}")]
    NonFinite { stage: &'static str, value: f64 },
}

impl PredictError {
    /// Create a scaling error.
    pub fn scaling(msg: impl Into<String>) -> Self {
        Self::Scaling(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }
}

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_error_display() {
        let err = PredictError::scaling("expected 6 columns, got 5");
        assert_eq!(err.to_string(), "Scaling failed: expected 6 columns, got 5");

        let err = PredictError::inference("session poisoned");
        assert!(err.to_string().contains("session poisoned"));
    }

    #[test]
    fn test_non_finite_display() {
        let err = PredictError::NonFinite {
            stage: "inverse target scaling",
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "Non-finite value inf after inverse target scaling");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidVar {
            name: "PORT",
            reason: "invalid digit found in string".to_string(),
        };
        assert!(err.to_string().starts_with("Invalid value for PORT"));
    }
}
