//! Gaussian grids (regular and reduced).
//!
//! Row latitudes are the Gauss-Legendre nodes for the grid number `N`
//! (`2N` rows, not evenly spaced). The regular variant has `4N` columns in
//! every row; the reduced variant drops columns toward the poles so that
//! bins keep a roughly constant area.
//!
//! Latitude and reduced column tables are computed once per grid number and
//! shared read-only between all grid instances.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::grid::{
    check_bin, check_row, clamp_index, find_nearest, first_bin_offsets, row_of_bin, BinId,
    PlanetaryGrid,
};

/// Fewest columns a reduced row may have.
pub const MIN_REDUCED_COLS: u32 = 20;

/// Supported Gaussian resolutions, named by the number of rows between a
/// pole and the equator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum GridNumber {
    N32,
    N48,
    N80,
    N128,
    N160,
    N200,
    N256,
    N320,
    N400,
    N512,
    N640,
}

impl GridNumber {
    /// All supported grid numbers, coarsest first.
    pub const ALL: [GridNumber; 11] = [
        GridNumber::N32,
        GridNumber::N48,
        GridNumber::N80,
        GridNumber::N128,
        GridNumber::N160,
        GridNumber::N200,
        GridNumber::N256,
        GridNumber::N320,
        GridNumber::N400,
        GridNumber::N512,
        GridNumber::N640,
    ];

    /// Rows between pole and equator.
    pub fn n(&self) -> usize {
        match self {
            GridNumber::N32 => 32,
            GridNumber::N48 => 48,
            GridNumber::N80 => 80,
            GridNumber::N128 => 128,
            GridNumber::N160 => 160,
            GridNumber::N200 => 200,
            GridNumber::N256 => 256,
            GridNumber::N320 => 320,
            GridNumber::N400 => 400,
            GridNumber::N512 => 512,
            GridNumber::N640 => 640,
        }
    }

    /// Total number of rows (`2N`).
    pub fn num_rows(&self) -> usize {
        2 * self.n()
    }

    /// Columns of a regular row (`4N`).
    pub fn regular_cols(&self) -> usize {
        4 * self.n()
    }

    fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl TryFrom<u32> for GridNumber {
    type Error = GridError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        GridNumber::ALL
            .iter()
            .copied()
            .find(|g| g.n() == value as usize)
            .ok_or(GridError::InvalidGridNumber(value))
    }
}

impl From<GridNumber> for u32 {
    fn from(value: GridNumber) -> Self {
        value.n() as u32
    }
}

impl fmt::Display for GridNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.n())
    }
}

/// Per grid number tables, filled on first use.
static LATITUDES: Lazy<[OnceCell<Arc<[f64]>>; 11]> =
    Lazy::new(|| std::array::from_fn(|_| OnceCell::new()));

static REDUCED_LAYOUTS: Lazy<[OnceCell<Arc<ReducedLayout>>; 11]> =
    Lazy::new(|| std::array::from_fn(|_| OnceCell::new()));

/// Gaussian latitudes for the grid number, north to south, in degrees.
pub fn gaussian_latitudes(number: GridNumber) -> Arc<[f64]> {
    LATITUDES[number.ordinal()]
        .get_or_init(|| {
            debug!(grid = %number, "Computing Gaussian latitudes");
            compute_gaussian_latitudes(number.num_rows()).into()
        })
        .clone()
}

/// Roots of the Legendre polynomial of degree `num_rows`, as latitudes.
fn compute_gaussian_latitudes(num_rows: usize) -> Vec<f64> {
    let n = num_rows as f64;
    let mut latitudes = vec![0.0; num_rows];

    for i in 0..num_rows / 2 {
        // Initial guess for the i-th root counted from x = 1
        let mut x = (PI * (i as f64 + 0.75) / (n + 0.5)).cos();
        for _ in 0..100 {
            let mut p_prev = 1.0;
            let mut p = x;
            for k in 2..=num_rows {
                let k = k as f64;
                let p_next = ((2.0 * k - 1.0) * x * p - (k - 1.0) * p_prev) / k;
                p_prev = p;
                p = p_next;
            }
            let derivative = n * (x * p - p_prev) / (x * x - 1.0);
            let dx = p / derivative;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let lat = x.asin().to_degrees();
        latitudes[i] = lat;
        latitudes[num_rows - 1 - i] = -lat;
    }
    latitudes
}

/// Column layout of the reduced variant.
#[derive(Debug)]
struct ReducedLayout {
    num_cols: Vec<u32>,
    first_bins: Vec<BinId>,
    /// Cell-centre longitudes of every row, west to east.
    longitudes: Vec<Vec<f64>>,
    num_bins: u64,
}

impl ReducedLayout {
    fn build(number: GridNumber, latitudes: &[f64]) -> Self {
        let max_cols = number.regular_cols() as f64;
        let num_cols: Vec<u32> = latitudes
            .iter()
            .map(|lat| reduced_cols(max_cols, *lat))
            .collect();
        let (first_bins, num_bins) = first_bin_offsets(&num_cols);
        let longitudes = num_cols
            .iter()
            .map(|&cols| {
                (0..cols)
                    .map(|j| -180.0 + (j as f64 + 0.5) * 360.0 / cols as f64)
                    .collect()
            })
            .collect();

        debug!(grid = %number, num_bins, "Built reduced Gaussian layout");

        Self {
            num_cols,
            first_bins,
            longitudes,
            num_bins,
        }
    }

    fn shared(number: GridNumber, latitudes: &[f64]) -> Arc<ReducedLayout> {
        REDUCED_LAYOUTS[number.ordinal()]
            .get_or_init(|| Arc::new(ReducedLayout::build(number, latitudes)))
            .clone()
    }
}

/// Columns of a reduced row: proportional to `cos(lat)`, a multiple of 4 and
/// never below [`MIN_REDUCED_COLS`].
fn reduced_cols(max_cols: f64, lat: f64) -> u32 {
    let cols = (max_cols * lat.to_radians().cos()).round() as u32;
    let cols = cols.div_ceil(4) * 4;
    cols.max(MIN_REDUCED_COLS)
}

#[derive(Debug, Clone)]
enum Layout {
    Regular { num_cols: usize },
    Reduced(Arc<ReducedLayout>),
}

/// Gaussian grid, regular or reduced.
#[derive(Debug, Clone)]
pub struct GaussianGrid {
    number: GridNumber,
    latitudes: Arc<[f64]>,
    layout: Layout,
}

impl GaussianGrid {
    /// Create a Gaussian grid for the given resolution.
    pub fn new(number: GridNumber, reduced: bool) -> Self {
        let latitudes = gaussian_latitudes(number);
        let layout = if reduced {
            Layout::Reduced(ReducedLayout::shared(number, &latitudes))
        } else {
            Layout::Regular {
                num_cols: number.regular_cols(),
            }
        };
        Self {
            number,
            latitudes,
            layout,
        }
    }

    /// Create a Gaussian grid from a raw grid number such as `80`.
    pub fn from_number(number: u32, reduced: bool) -> GridResult<Self> {
        Ok(Self::new(GridNumber::try_from(number)?, reduced))
    }

    pub fn grid_number(&self) -> GridNumber {
        self.number
    }

    pub fn is_reduced(&self) -> bool {
        matches!(self.layout, Layout::Reduced(_))
    }

    /// Row latitudes, north to south.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    fn col_index(&self, row: usize, lon: f64) -> usize {
        match &self.layout {
            Layout::Regular { num_cols } => {
                clamp_index((180.0 + lon) * *num_cols as f64 / 360.0, *num_cols)
            }
            Layout::Reduced(layout) => find_nearest(&layout.longitudes[row], lon),
        }
    }
}

impl PlanetaryGrid for GaussianGrid {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn bin_index(&self, lat: f64, lon: f64) -> BinId {
        let row = find_nearest(&self.latitudes, lat);
        let col = self.col_index(row, lon) as BinId;
        match &self.layout {
            Layout::Regular { num_cols } => (row * num_cols) as BinId + col,
            Layout::Reduced(layout) => layout.first_bins[row] + col,
        }
    }

    fn row_index(&self, id: BinId) -> GridResult<usize> {
        check_bin(id, self.num_bins())?;
        Ok(match &self.layout {
            Layout::Regular { num_cols } => (id / *num_cols as u64) as usize,
            Layout::Reduced(layout) => row_of_bin(&layout.first_bins, id),
        })
    }

    fn num_bins(&self) -> u64 {
        match &self.layout {
            Layout::Regular { num_cols } => (self.latitudes.len() * num_cols) as u64,
            Layout::Reduced(layout) => layout.num_bins,
        }
    }

    fn num_rows(&self) -> usize {
        self.latitudes.len()
    }

    fn num_cols(&self, row: usize) -> GridResult<u32> {
        check_row(row, self.num_rows())?;
        Ok(match &self.layout {
            Layout::Regular { num_cols } => *num_cols as u32,
            Layout::Reduced(layout) => layout.num_cols[row],
        })
    }

    fn first_bin_index(&self, row: usize) -> GridResult<BinId> {
        check_row(row, self.num_rows())?;
        Ok(match &self.layout {
            Layout::Regular { num_cols } => (row * num_cols) as BinId,
            Layout::Reduced(layout) => layout.first_bins[row],
        })
    }

    fn center_lat(&self, row: usize) -> GridResult<f64> {
        check_row(row, self.num_rows())?;
        Ok(self.latitudes[row])
    }

    fn center_lat_lon(&self, id: BinId) -> GridResult<(f64, f64)> {
        let row = self.row_index(id)?;
        let col = (id - self.first_bin_index(row)?) as usize;
        let lon = match &self.layout {
            Layout::Regular { num_cols } => -180.0 + (col as f64 + 0.5) * 360.0 / *num_cols as f64,
            Layout::Reduced(layout) => layout.longitudes[row][col],
        };
        Ok((self.latitudes[row], lon))
    }
}

/// Reduced Gaussian grid as a topology of its own.
///
/// Shares latitude and column tables with [`GaussianGrid`] in reduced mode.
#[derive(Debug, Clone)]
pub struct ReducedGaussianGrid {
    inner: GaussianGrid,
}

impl ReducedGaussianGrid {
    pub fn new(number: GridNumber) -> Self {
        Self {
            inner: GaussianGrid::new(number, true),
        }
    }

    pub fn from_number(number: u32) -> GridResult<Self> {
        Ok(Self::new(GridNumber::try_from(number)?))
    }

    pub fn grid_number(&self) -> GridNumber {
        self.inner.grid_number()
    }

    pub fn latitudes(&self) -> &[f64] {
        self.inner.latitudes()
    }
}

impl PlanetaryGrid for ReducedGaussianGrid {
    fn name(&self) -> &'static str {
        "reduced_gaussian"
    }

    fn bin_index(&self, lat: f64, lon: f64) -> BinId {
        self.inner.bin_index(lat, lon)
    }

    fn row_index(&self, id: BinId) -> GridResult<usize> {
        self.inner.row_index(id)
    }

    fn num_bins(&self) -> u64 {
        self.inner.num_bins()
    }

    fn num_rows(&self) -> usize {
        self.inner.num_rows()
    }

    fn num_cols(&self, row: usize) -> GridResult<u32> {
        self.inner.num_cols(row)
    }

    fn first_bin_index(&self, row: usize) -> GridResult<BinId> {
        self.inner.first_bin_index(row)
    }

    fn center_lat(&self, row: usize) -> GridResult<f64> {
        self.inner.center_lat(row)
    }

    fn center_lat_lon(&self, id: BinId) -> GridResult<(f64, f64)> {
        self.inner.center_lat_lon(id)
    }
}
