//! Bin records exchanged between the binning stages.

use planetary_grid::BinId;
use serde::{Deserialize, Serialize};

/// Accumulator state of one grid cell during one pass.
///
/// `features` holds one slice of accumulated slots per variable, laid out
/// variable-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialBin {
    pub index: BinId,
    pub num_obs: u64,
    pub features: Vec<f64>,
}

impl SpatialBin {
    pub fn new(index: BinId, num_features: usize) -> Self {
        Self {
            index,
            num_obs: 0,
            features: vec![0.0; num_features],
        }
    }
}

/// Composite of any number of spatial passes for one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalBin {
    pub index: BinId,
    pub num_obs: u64,
    pub num_passes: u32,
    pub features: Vec<f64>,
}

impl TemporalBin {
    pub fn new(index: BinId, num_features: usize) -> Self {
        Self {
            index,
            num_obs: 0,
            num_passes: 0,
            features: vec![0.0; num_features],
        }
    }
}

/// Output quantities of a temporal bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedBin {
    pub index: BinId,
    pub num_obs: u64,
    pub num_passes: u32,
    pub values: Vec<f64>,
}
