//! Error types for grid construction and geometry queries.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised by planetary grids.
///
/// All of these are configuration or caller errors. Coordinate lookups
/// (`bin_index`) never fail; out-of-range coordinates are clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("row index {row} out of range, grid has {num_rows} rows")]
    InvalidRow { row: usize, num_rows: usize },

    #[error("bin index {id} out of range, grid has {num_bins} bins")]
    BinIdOutOfRange { id: u64, num_bins: u64 },

    #[error("unsupported Gaussian grid number: N{0}")]
    InvalidGridNumber(u32),

    #[error("invalid grid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl GridError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
