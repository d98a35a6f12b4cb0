//! Service configuration from environment variables.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Default directory holding the three serving artifacts.
pub const DEFAULT_MODEL_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/model");

pub const MODEL_FILE: &str = "best_model.onnx";
pub const SCALER_X_FILE: &str = "scaler_X.json";
pub const SCALER_Y_FILE: &str = "scaler_y.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub artifacts: ArtifactPaths,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Locations of the model and both fitted scalers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub input_scaler: PathBuf,
    pub target_scaler: PathBuf,
}

impl ArtifactPaths {
    /// Standard artifact file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model: dir.join(MODEL_FILE),
            input_scaler: dir.join(SCALER_X_FILE),
            target_scaler: dir.join(SCALER_Y_FILE),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidVar {
                    name: "PORT",
                    reason: e.to_string(),
                }
            })?,
            None => 8060,
        };

        let dir = lookup("MODEL_DIR").unwrap_or_else(|| DEFAULT_MODEL_DIR.to_string());
        let defaults = ArtifactPaths::in_dir(dir);
        let artifacts = ArtifactPaths {
            model: lookup("MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.model),
            input_scaler: lookup("SCALER_X_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_scaler),
            target_scaler: lookup("SCALER_Y_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.target_scaler),
        };

        Ok(Self {
            server: ServerConfig { host, port },
            artifacts,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8060,
            },
            artifacts: ArtifactPaths::in_dir(DEFAULT_MODEL_DIR),
        }
    }
}
