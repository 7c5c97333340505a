//! SEA (integerized sinusoidal) equal-area grid.
//!
//! The grid used by ocean-colour Level-3 binning: rows of equal latitude
//! height, each holding `round(2 * num_rows * cos(lat))` bins so that every
//! bin covers roughly the same area. 2160 rows give bins of about 9.28 km.

use crate::error::{GridError, GridResult};
use crate::grid::{
    check_bin, check_row, clamp_index, first_bin_offsets, row_of_bin, BinId, PlanetaryGrid,
};

/// Default row count (about 9.28 km bins).
pub const DEFAULT_NUM_ROWS: usize = 2160;

/// Integerized sinusoidal grid.
#[derive(Debug, Clone)]
pub struct SeaGrid {
    num_rows: usize,
    latitudes: Vec<f64>,
    num_cols: Vec<u32>,
    first_bins: Vec<BinId>,
    num_bins: u64,
}

impl SeaGrid {
    /// Create a grid with the given number of rows (more than 2).
    pub fn new(num_rows: usize) -> GridResult<Self> {
        if num_rows <= 2 {
            return Err(GridError::invalid_parameter(
                "num_rows",
                format!("must be greater than 2, got {}", num_rows),
            ));
        }

        Ok(Self::build(num_rows))
    }

    fn build(num_rows: usize) -> Self {
        let latitudes: Vec<f64> = (0..num_rows)
            .map(|row| 90.0 - (row as f64 + 0.5) * 180.0 / num_rows as f64)
            .collect();
        let num_cols: Vec<u32> = latitudes
            .iter()
            .map(|lat| ((2.0 * num_rows as f64 * lat.to_radians().cos() + 0.5) as u32).max(1))
            .collect();
        let (first_bins, num_bins) = first_bin_offsets(&num_cols);

        Self {
            num_rows,
            latitudes,
            num_cols,
            first_bins,
            num_bins,
        }
    }

    fn row_of_lat(&self, lat: f64) -> usize {
        let from_south = clamp_index((lat + 90.0) * self.num_rows as f64 / 180.0, self.num_rows);
        (self.num_rows - 1) - from_south
    }
}

impl Default for SeaGrid {
    fn default() -> Self {
        Self::build(DEFAULT_NUM_ROWS)
    }
}

impl PlanetaryGrid for SeaGrid {
    fn name(&self) -> &'static str {
        "sea"
    }

    fn bin_index(&self, lat: f64, lon: f64) -> BinId {
        let row = self.row_of_lat(lat);
        let cols = self.num_cols[row] as usize;
        let col = clamp_index((lon + 180.0) * cols as f64 / 360.0, cols);
        self.first_bins[row] + col as BinId
    }

    fn row_index(&self, id: BinId) -> GridResult<usize> {
        check_bin(id, self.num_bins)?;
        Ok(row_of_bin(&self.first_bins, id))
    }

    fn num_bins(&self) -> u64 {
        self.num_bins
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self, row: usize) -> GridResult<u32> {
        check_row(row, self.num_rows)?;
        Ok(self.num_cols[row])
    }

    fn first_bin_index(&self, row: usize) -> GridResult<BinId> {
        check_row(row, self.num_rows)?;
        Ok(self.first_bins[row])
    }

    fn center_lat(&self, row: usize) -> GridResult<f64> {
        check_row(row, self.num_rows)?;
        Ok(self.latitudes[row])
    }

    fn center_lat_lon(&self, id: BinId) -> GridResult<(f64, f64)> {
        let row = self.row_index(id)?;
        let col = id - self.first_bins[row];
        let lon = -180.0 + (col as f64 + 0.5) * 360.0 / self.num_cols[row] as f64;
        Ok((self.latitudes[row], lon))
    }
}
