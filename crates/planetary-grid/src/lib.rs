//! Global binning grids.
//!
//! A planetary grid divides the globe into discrete cells ("bins") with dense
//! linear ids. All topologies implement [`PlanetaryGrid`]:
//!
//! - [`PlateCarreeGrid`]: equirectangular, `2 * num_rows` columns per row
//! - [`GaussianGrid`]: Gauss-Legendre latitudes, regular or reduced columns
//! - [`ReducedGaussianGrid`]: the reduced Gaussian layout on its own
//! - [`RotatedLatLonGrid`]: equirectangular on a rotated pole
//! - [`SeaGrid`]: integerized sinusoidal equal-area grid
//!
//! Grids are immutable and meant to be shared behind an `Arc`.

pub mod definition;
pub mod error;
pub mod gaussian;
pub mod grid;
pub mod plate_carree;
pub mod region;
pub mod rotated;
pub mod sea;

pub use definition::GridDefinition;
pub use error::{GridError, GridResult};
pub use gaussian::{gaussian_latitudes, GaussianGrid, GridNumber, ReducedGaussianGrid};
pub use grid::{find_nearest, BinId, PlanetaryGrid};
pub use plate_carree::{PlateCarreeGrid, TileRect};
pub use region::{GeoBoundingBox, Region};
pub use rotated::RotatedLatLonGrid;
pub use sea::SeaGrid;
