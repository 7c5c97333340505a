//! Observation generators for creating synthetic satellite passes.
//!
//! The deterministic generators produce predictable values that can be
//! checked exactly; the random ones take a seed so failures reproduce.

use binning_core::Observation;
use planetary_grid::PlanetaryGrid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates one observation at the centre of every bin of `grid`.
///
/// Each observation carries a single value equal to its bin id, which makes
/// it easy to check that it landed in the right bin.
///
/// # Example
///
/// ```
/// use planetary_grid::PlateCarreeGrid;
/// use test_utils::bin_center_observations;
///
/// let grid = PlateCarreeGrid::new(4).unwrap();
/// let obs = bin_center_observations(&grid, 0.0);
/// assert_eq!(obs.len(), 32);
/// assert_eq!(obs[5].values, vec![5.0]);
/// ```
pub fn bin_center_observations(grid: &dyn PlanetaryGrid, time: f64) -> Vec<Observation> {
    (0..grid.num_bins())
        .filter_map(|id| {
            grid.center_lat_lon(id)
                .ok()
                .map(|(lat, lon)| Observation::new(lat, lon, time, vec![id as f64]))
        })
        .collect()
}

/// Creates a regular lat/lon raster of observations covering a box.
///
/// Samples sit at cell centres of a `width × height` raster; the value of
/// variable `v` at `(row, col)` is `v * 1000 + row * width + col`.
pub fn raster_swath(
    bbox: (f64, f64, f64, f64),
    width: usize,
    height: usize,
    num_variables: usize,
    time: f64,
) -> Vec<Observation> {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    let dx = (max_lon - min_lon) / width.max(1) as f64;
    let dy = (max_lat - min_lat) / height.max(1) as f64;

    let mut observations = Vec::with_capacity(width * height);
    for row in 0..height {
        let lat = max_lat - (row as f64 + 0.5) * dy;
        for col in 0..width {
            let lon = min_lon + (col as f64 + 0.5) * dx;
            let cell = (row * width + col) as f64;
            let values = (0..num_variables).map(|v| v as f64 * 1000.0 + cell).collect();
            observations.push(Observation::new(lat, lon, time, values));
        }
    }
    observations
}

/// Creates `count` observations uniformly distributed over the globe.
///
/// Values are drawn from `value_range`; times fall within one day of
/// `start_time`.
pub fn random_swath(
    seed: u64,
    count: usize,
    num_variables: usize,
    start_time: f64,
    value_range: (f64, f64),
) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let lat = rng.gen_range(-90.0..90.0);
            let lon = rng.gen_range(-180.0..180.0);
            let time = start_time + rng.gen_range(0.0..1.0);
            let values = (0..num_variables)
                .map(|_| rng.gen_range(value_range.0..value_range.1))
                .collect();
            Observation::new(lat, lon, time, values)
        })
        .collect()
}

/// Creates log-normally distributed, strictly positive values, typical of
/// ocean-colour quantities such as chlorophyll.
pub fn lognormal_values(seed: u64, count: usize, mu: f64, sigma: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            // Box-Muller
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen_range(0.0..1.0);
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            (mu + sigma * z).exp()
        })
        .collect()
}

/// Creates observations that all fall on one point with the given values.
pub fn point_observations(lat: f64, lon: f64, time: f64, values: &[f64]) -> Vec<Observation> {
    values
        .iter()
        .map(|&v| Observation::new(lat, lon, time, vec![v]))
        .collect()
}
