//! The shared contract of all binning grids.

use std::fmt;

use crate::error::{GridError, GridResult};

/// Linear identifier of a grid cell.
///
/// Bin ids are dense in `[0, num_bins)` and never decrease with the row index.
pub type BinId = u64;

/// A global grid mapping geographic coordinates to bins and back.
///
/// Rows are ordered north to south; within a row, columns run west to east
/// starting at the antimeridian. Implementations are immutable after
/// construction and safe to share across threads.
pub trait PlanetaryGrid: Send + Sync + fmt::Debug {
    /// Short topology name, e.g. `"plate_carree"`.
    fn name(&self) -> &'static str;

    /// Bin containing the given coordinate. Out-of-range coordinates are
    /// clamped to the nearest valid row and column.
    fn bin_index(&self, lat: f64, lon: f64) -> BinId;

    /// Row containing the given bin.
    fn row_index(&self, id: BinId) -> GridResult<usize>;

    /// Total number of bins.
    fn num_bins(&self) -> u64;

    /// Number of rows.
    fn num_rows(&self) -> usize;

    /// Number of bins in the given row.
    fn num_cols(&self, row: usize) -> GridResult<u32>;

    /// Id of the westernmost bin in the given row.
    fn first_bin_index(&self, row: usize) -> GridResult<BinId>;

    /// Latitude of the row centre in degrees.
    fn center_lat(&self, row: usize) -> GridResult<f64>;

    /// Centre coordinate `(lat, lon)` of the given bin in degrees.
    fn center_lat_lon(&self, id: BinId) -> GridResult<(f64, f64)>;
}

/// Index of the value closest to `target` in a monotonic sequence.
///
/// The distance to the target shrinks until the closest element and grows
/// afterwards, so the scan stops at the first increase and returns the
/// element before it. If the distance never increases the closest element is
/// the last one. An empty slice yields 0.
pub fn find_nearest(values: &[f64], target: f64) -> usize {
    let Some(first) = values.first() else {
        return 0;
    };

    let mut min_distance = (first - target).abs();
    for (i, value) in values.iter().enumerate().skip(1) {
        let distance = (value - target).abs();
        if distance > min_distance {
            return i - 1;
        }
        min_distance = distance;
    }
    values.len() - 1
}

/// Floor `value` and clamp it into `[0, n)`.
#[inline]
pub(crate) fn clamp_index(value: f64, n: usize) -> usize {
    if n == 0 || value.is_nan() || value < 0.0 {
        return 0;
    }
    let index = value.floor();
    if index >= n as f64 {
        n - 1
    } else {
        index as usize
    }
}

#[inline]
pub(crate) fn check_row(row: usize, num_rows: usize) -> GridResult<()> {
    if row < num_rows {
        Ok(())
    } else {
        Err(GridError::InvalidRow { row, num_rows })
    }
}

#[inline]
pub(crate) fn check_bin(id: BinId, num_bins: u64) -> GridResult<()> {
    if id < num_bins {
        Ok(())
    } else {
        Err(GridError::BinIdOutOfRange { id, num_bins })
    }
}

/// Row of `id` given the ascending first-bin offsets of every row.
///
/// The caller guarantees `id < num_bins` and that `first_bins[0] == 0`.
pub(crate) fn row_of_bin(first_bins: &[BinId], id: BinId) -> usize {
    first_bins.partition_point(|&first| first <= id) - 1
}

/// Cumulative first-bin offsets for the given per-row column counts.
pub(crate) fn first_bin_offsets(num_cols: &[u32]) -> (Vec<BinId>, u64) {
    let mut offsets = Vec::with_capacity(num_cols.len());
    let mut total = 0u64;
    for &cols in num_cols {
        offsets.push(total);
        total += cols as u64;
    }
    (offsets, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nearest_interior() {
        let lats = [80.0, 60.0, 40.0, 20.0, 0.0, -20.0];
        assert_eq!(find_nearest(&lats, 41.0), 2);
        assert_eq!(find_nearest(&lats, 29.0), 3);
        assert_eq!(find_nearest(&lats, -1.0), 4);
    }

    #[test]
    fn test_find_nearest_first_element() {
        let lats = [80.0, 60.0, 40.0];
        assert_eq!(find_nearest(&lats, 90.0), 0);
        assert_eq!(find_nearest(&lats, 75.0), 0);
    }

    #[test]
    fn test_find_nearest_last_element() {
        // Minimum at the last element must not produce an out-of-range index
        let lats = [80.0, 60.0, 40.0];
        assert_eq!(find_nearest(&lats, 40.0), 2);
        assert_eq!(find_nearest(&lats, -90.0), 2);
    }

    #[test]
    fn test_find_nearest_single_and_empty() {
        assert_eq!(find_nearest(&[5.0], 100.0), 0);
        assert_eq!(find_nearest(&[], 1.0), 0);
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-0.5, 10), 0);
        assert_eq!(clamp_index(3.7, 10), 3);
        assert_eq!(clamp_index(10.0, 10), 9);
        assert_eq!(clamp_index(f64::NAN, 10), 0);
    }

    #[test]
    fn test_row_of_bin() {
        let (offsets, total) = first_bin_offsets(&[3, 5, 2]);
        assert_eq!(offsets, vec![0, 3, 8]);
        assert_eq!(total, 10);
        assert_eq!(row_of_bin(&offsets, 0), 0);
        assert_eq!(row_of_bin(&offsets, 2), 0);
        assert_eq!(row_of_bin(&offsets, 3), 1);
        assert_eq!(row_of_bin(&offsets, 7), 1);
        assert_eq!(row_of_bin(&offsets, 9), 2);
    }
}
