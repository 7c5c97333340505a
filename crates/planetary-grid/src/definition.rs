//! Serializable grid definitions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GridResult;
use crate::gaussian::{GaussianGrid, GridNumber, ReducedGaussianGrid};
use crate::grid::PlanetaryGrid;
use crate::plate_carree::PlateCarreeGrid;
use crate::rotated::RotatedLatLonGrid;
use crate::sea::{SeaGrid, DEFAULT_NUM_ROWS};

/// Topology tag plus resolution parameters of a grid.
///
/// ```
/// use planetary_grid::GridDefinition;
///
/// let grid = GridDefinition::PlateCarree { num_rows: 180 }.build().unwrap();
/// assert_eq!(grid.num_bins(), 180 * 360);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridDefinition {
    PlateCarree {
        num_rows: usize,
    },
    Gaussian {
        grid_number: GridNumber,
        #[serde(default)]
        reduced: bool,
    },
    ReducedGaussian {
        grid_number: GridNumber,
    },
    RotatedLatLon {
        num_rows: usize,
        pole_lat: f64,
        pole_lon: f64,
    },
    Sea {
        num_rows: usize,
    },
}

impl Default for GridDefinition {
    fn default() -> Self {
        GridDefinition::Sea {
            num_rows: DEFAULT_NUM_ROWS,
        }
    }
}

impl GridDefinition {
    /// Construct the grid. Validation errors surface here, never later.
    pub fn build(&self) -> GridResult<Arc<dyn PlanetaryGrid>> {
        let grid: Arc<dyn PlanetaryGrid> = match *self {
            GridDefinition::PlateCarree { num_rows } => Arc::new(PlateCarreeGrid::new(num_rows)?),
            GridDefinition::Gaussian {
                grid_number,
                reduced,
            } => Arc::new(GaussianGrid::new(grid_number, reduced)),
            GridDefinition::ReducedGaussian { grid_number } => {
                Arc::new(ReducedGaussianGrid::new(grid_number))
            }
            GridDefinition::RotatedLatLon {
                num_rows,
                pole_lat,
                pole_lon,
            } => Arc::new(RotatedLatLonGrid::new(num_rows, pole_lat, pole_lon)?),
            GridDefinition::Sea { num_rows } => Arc::new(SeaGrid::new(num_rows)?),
        };

        debug!(
            grid = grid.name(),
            num_rows = grid.num_rows(),
            num_bins = grid.num_bins(),
            "Built planetary grid"
        );
        Ok(grid)
    }

    /// Number of rows the grid will have.
    pub fn num_rows(&self) -> usize {
        match self {
            GridDefinition::PlateCarree { num_rows }
            | GridDefinition::RotatedLatLon { num_rows, .. }
            | GridDefinition::Sea { num_rows } => *num_rows,
            GridDefinition::Gaussian { grid_number, .. }
            | GridDefinition::ReducedGaussian { grid_number } => grid_number.num_rows(),
        }
    }

    /// Replace the row count of row-count based topologies.
    ///
    /// Gaussian definitions are keyed by grid number and stay unchanged.
    pub fn with_num_rows(mut self, rows: usize) -> Self {
        match &mut self {
            GridDefinition::PlateCarree { num_rows }
            | GridDefinition::RotatedLatLon { num_rows, .. }
            | GridDefinition::Sea { num_rows } => *num_rows = rows,
            GridDefinition::Gaussian { .. } | GridDefinition::ReducedGaussian { .. } => {}
        }
        self
    }
}
