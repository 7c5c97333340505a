//! Error types for binning configuration.
//!
//! Every variant is raised while building a binning context. The
//! per-observation path never returns errors.

use planetary_grid::GridError;
use thiserror::Error;

/// Errors that can occur while configuring a binning run.
#[derive(Debug, Error)]
pub enum BinningError {
    /// Grid construction or geometry query failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Algorithm name not recognised.
    #[error("unknown binning algorithm: '{0}' (expected AME, ML or MIN_MAX)")]
    UnknownAlgorithm(String),

    /// A numeric parameter could not be parsed or is out of range.
    #[error("invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Configuration is inconsistent.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// A date string could not be parsed.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// YAML configuration could not be parsed.
    #[error("failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration could not be parsed.
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl BinningError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for binning operations.
pub type Result<T> = std::result::Result<T, BinningError>;
