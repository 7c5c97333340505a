//! Common test fixtures for binning tests.
//!
//! This module provides pre-defined regions, configurations and contexts
//! that represent common binning scenarios.

use std::sync::{Arc, Once};

use binning_core::{Algorithm, BinManager, BinningContext, CompositingType, VariableContext};
use planetary_grid::{PlanetaryGrid, PlateCarreeGrid};

/// Common bounding boxes as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// North Sea, a typical ocean-colour region of interest
    pub const NORTH_SEA: (f64, f64, f64, f64) = (-4.0, 51.0, 9.0, 61.0);

    /// Mediterranean Sea
    pub const MEDITERRANEAN: (f64, f64, f64, f64) = (-6.0, 30.0, 36.0, 46.0);

    /// Western-hemisphere strip against the date line
    pub const DATE_LINE_WEST: (f64, f64, f64, f64) = (-180.0, -30.0, -175.0, 30.0);

    /// Eastern-hemisphere strip against the date line
    pub const DATE_LINE_EAST: (f64, f64, f64, f64) = (175.0, -30.0, 180.0, 30.0);

    /// Polar cap above 80N
    pub const ARCTIC: (f64, f64, f64, f64) = (-180.0, 80.0, 180.0, 90.0);
}

/// Common time values (MJD) for testing.
pub mod time {
    /// 2024-01-15T00:00:00Z
    pub const REFERENCE_MJD: f64 = 60_324.0;

    /// 2024-01-15, the date of [`REFERENCE_MJD`]
    pub const REFERENCE_DATE: &str = "2024-01-15";
}

/// Common configuration documents.
pub mod configs {
    /// Minimal YAML configuration: SEA grid, AME, one variable.
    pub const MINIMAL_YAML: &str = r#"
variables:
  - name: chl
"#;

    /// Daily ocean-colour composite on a coarse grid.
    pub const DAILY_YAML: &str = r#"
grid:
  type: plate_carree
  num_rows: 180
variables:
  - name: chl
  - name: tsm
valid_mask_expression: "!CLOUD && !LAND"
algorithm:
  name: ML
  weight_coeff: "0.5"
super_sampling: 1
data_period:
  start_date: "2024-01-15"
  duration_days: 1
  min_data_hour: 0
start_date: "2024-01-15"
end_date: "2024-01-15"
"#;

    /// JSON configuration selecting the range algorithm.
    pub const MIN_MAX_JSON: &str = r#"{
  "grid": {"type": "reduced_gaussian", "grid_number": 32},
  "variables": [{"name": "sst"}],
  "algorithm": {"name": "MIN_MAX"}
}"#;
}

static TRACING: Once = Once::new();

/// Install a test-writer tracing subscriber once per test binary.
///
/// Honours `RUST_LOG`; defaults to `warn`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Binning context over a Plate-Carrée grid with one variable per name.
///
/// Panics on invalid arguments; meant for tests only.
pub fn plate_carree_context(
    num_rows: usize,
    algorithm: &str,
    weight_coeff: Option<&str>,
    variables: &[&str],
) -> BinningContext {
    let mut context = VariableContext::new();
    for name in variables {
        context.define_variable(name, None);
    }
    let algorithm = Algorithm::from_name(algorithm, weight_coeff).expect("valid algorithm");
    let manager = BinManager::new(&context, algorithm, 1).expect("valid bin manager");
    let grid: Arc<dyn PlanetaryGrid> =
        Arc::new(PlateCarreeGrid::new(num_rows).expect("valid row count"));
    BinningContext::new(grid, context, manager, CompositingType::Binning)
}
