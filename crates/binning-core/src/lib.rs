//! Level-3 binning engine.
//!
//! Scattered observations `(lat, lon, time, values)` are accumulated into
//! the bins of a [`PlanetaryGrid`](planetary_grid::PlanetaryGrid) pass by
//! pass, folded into temporal composites and interpreted into output
//! statistics.
//!
//! ```
//! use std::sync::Arc;
//! use binning_core::{BinningConfig, Observation, SpatialBinner, TemporalBinner};
//!
//! let config = BinningConfig::from_yaml_str(
//!     "grid: {type: plate_carree, num_rows: 180}\nvariables: [{name: chl}]",
//! )
//! .unwrap();
//! let context = Arc::new(config.create_binning_context().unwrap());
//!
//! let mut pass = SpatialBinner::new(context.clone());
//! pass.process_observation(&Observation::new(45.2, 7.1, 60_000.5, vec![0.8]));
//! let (bins, _stats) = pass.complete();
//!
//! let mut composite = TemporalBinner::new(context);
//! composite.add_pass(&bins);
//! let output = composite.interpret_all();
//! assert_eq!(output[0].values[0], 0.8);
//! ```

pub mod algorithm;
pub mod bin;
pub mod bin_manager;
pub mod binner;
pub mod config;
pub mod context;
pub mod data_period;
pub mod error;
pub mod observation;
pub mod variable;

pub use algorithm::{
    Algorithm, AlgorithmKind, ArithmeticMean, BinAlgorithm, MaximumLikelihood, MinMax,
    DEFAULT_WEIGHT_COEFF,
};
pub use bin::{InterpretedBin, SpatialBin, TemporalBin};
pub use bin_manager::BinManager;
pub use binner::{PassStats, SpatialBinner, TemporalBinner};
pub use config::{AlgorithmConfig, BinningConfig, DataPeriodConfig, VariableConfig};
pub use context::{BinningContext, CompositingType};
pub use data_period::{
    datetime_from_mjd, mjd_from_date, mjd_from_datetime, parse_date, parse_date_mjd, DataPeriod,
    DataPeriodMembership, TimeRange,
};
pub use error::{BinningError, Result};
pub use observation::Observation;
pub use variable::VariableContext;

pub use planetary_grid;
