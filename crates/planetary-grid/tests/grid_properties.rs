//! Property tests shared by every grid topology.

use planetary_grid::{
    find_nearest, GaussianGrid, GridDefinition, GridError, GridNumber, PlanetaryGrid,
    PlateCarreeGrid, ReducedGaussianGrid, RotatedLatLonGrid, SeaGrid,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn all_grids() -> Vec<Box<dyn PlanetaryGrid>> {
    vec![
        Box::new(PlateCarreeGrid::new(36).unwrap()),
        Box::new(GaussianGrid::new(GridNumber::N32, false)),
        Box::new(GaussianGrid::new(GridNumber::N32, true)),
        Box::new(ReducedGaussianGrid::new(GridNumber::N48)),
        Box::new(RotatedLatLonGrid::new(36, 45.0, 100.0).unwrap()),
        Box::new(SeaGrid::new(36).unwrap()),
    ]
}

// ============================================================================
// Row coverage
// ============================================================================

#[test]
fn test_row_coverage() {
    for grid in all_grids() {
        let mut total = 0u64;
        for row in 0..grid.num_rows() {
            let first = grid.first_bin_index(row).unwrap();
            let cols = grid.num_cols(row).unwrap() as u64;
            assert_eq!(first, total, "{}: row {} starts at wrong bin", grid.name(), row);
            if row + 1 < grid.num_rows() {
                assert_eq!(grid.first_bin_index(row + 1).unwrap(), first + cols);
            }
            total += cols;
        }
        assert_eq!(total, grid.num_bins(), "{}: column sum mismatch", grid.name());
    }
}

#[test]
fn test_row_index_brackets_bin() {
    for grid in all_grids() {
        let step = (grid.num_bins() / 500).max(1) as usize;
        for id in (0..grid.num_bins()).step_by(step) {
            let row = grid.row_index(id).unwrap();
            let first = grid.first_bin_index(row).unwrap();
            let cols = grid.num_cols(row).unwrap() as u64;
            assert!(first <= id && id < first + cols, "{}: bin {}", grid.name(), id);
        }
        let last = grid.num_bins() - 1;
        assert_eq!(grid.row_index(last).unwrap(), grid.num_rows() - 1);
    }
}

#[test]
fn test_out_of_range_requests() {
    for grid in all_grids() {
        let rows = grid.num_rows();
        assert_eq!(
            grid.num_cols(rows),
            Err(GridError::InvalidRow { row: rows, num_rows: rows })
        );
        assert!(grid.first_bin_index(rows).is_err());
        assert!(grid.center_lat(rows).is_err());
        assert!(matches!(
            grid.row_index(grid.num_bins()),
            Err(GridError::BinIdOutOfRange { .. })
        ));
        assert!(grid.center_lat_lon(grid.num_bins()).is_err());
    }
}

// ============================================================================
// Bijection
// ============================================================================

#[test]
fn test_center_bijection_for_every_topology() {
    for grid in all_grids() {
        let step = (grid.num_bins() / 2000).max(1) as usize;
        for id in (0..grid.num_bins()).step_by(step) {
            let (lat, lon) = grid.center_lat_lon(id).unwrap();
            assert_eq!(grid.bin_index(lat, lon), id, "{}: bin {}", grid.name(), id);
        }
    }
}

#[test]
fn test_plate_carree_bijection_exhaustive() {
    let grid = PlateCarreeGrid::new(90).unwrap();
    for id in 0..grid.num_bins() {
        let (lat, lon) = grid.center_lat_lon(id).unwrap();
        assert_eq!(grid.bin_index(lat, lon), id);
    }
}

#[test]
fn test_gaussian_row_is_nearest_latitude() {
    let mut rng = StdRng::seed_from_u64(42);
    for grid in [
        GaussianGrid::new(GridNumber::N32, false),
        GaussianGrid::new(GridNumber::N80, true),
    ] {
        for _ in 0..2000 {
            let lat: f64 = rng.gen_range(-90.0..=90.0);
            let lon: f64 = rng.gen_range(-180.0..=180.0);
            let row = grid.row_index(grid.bin_index(lat, lon)).unwrap();

            let expected = (0..grid.num_rows())
                .min_by(|&a, &b| {
                    let da = (grid.center_lat(a).unwrap() - lat).abs();
                    let db = (grid.center_lat(b).unwrap() - lat).abs();
                    da.total_cmp(&db)
                })
                .unwrap();
            let got_distance = (grid.center_lat(row).unwrap() - lat).abs();
            let best_distance = (grid.center_lat(expected).unwrap() - lat).abs();
            assert_eq!(got_distance, best_distance, "lat {}", lat);
        }
    }
}

#[test]
fn test_gaussian_pole_rows() {
    let grid = GaussianGrid::new(GridNumber::N32, false);
    // Nearest row of the south pole is the last array element
    assert_eq!(grid.row_index(grid.bin_index(-90.0, 0.0)).unwrap(), 63);
    assert_eq!(grid.row_index(grid.bin_index(-89.999, 0.0)).unwrap(), 63);
    // ... and of the north pole the first one
    assert_eq!(grid.row_index(grid.bin_index(90.0, 0.0)).unwrap(), 0);
    assert_eq!(find_nearest(grid.latitudes(), -90.0), 63);
}

#[test]
fn test_boundary_coordinates_never_escape() {
    for grid in all_grids() {
        for lat in [-90.0, 90.0, -100.0, 100.0] {
            for lon in [-180.0, 180.0, -200.0, 200.0] {
                let id = grid.bin_index(lat, lon);
                assert!(id < grid.num_bins(), "{}: ({}, {})", grid.name(), lat, lon);
            }
        }
    }
}

#[test]
fn test_definition_matches_direct_construction() {
    let from_definition = GridDefinition::PlateCarree { num_rows: 36 }.build().unwrap();
    let direct = PlateCarreeGrid::new(36).unwrap();
    assert_eq!(from_definition.num_bins(), direct.num_bins());
    assert_eq!(
        from_definition.bin_index(48.1, 11.6),
        direct.bin_index(48.1, 11.6)
    );
}
