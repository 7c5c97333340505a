//! Rotated lat/lon grid.
//!
//! An equirectangular layout defined in a coordinate frame whose north pole
//! sits at `(pole_lat, pole_lon)`. Geographic coordinates are rotated into
//! that frame before indexing; bin centres are rotated back. Row latitudes
//! reported by [`PlanetaryGrid::center_lat`] are in the rotated frame.

use nalgebra::{Rotation3, Vector3};

use crate::error::{GridError, GridResult};
use crate::grid::{BinId, PlanetaryGrid};
use crate::plate_carree::PlateCarreeGrid;

/// Plate-Carrée layout on a rotated sphere.
#[derive(Debug, Clone)]
pub struct RotatedLatLonGrid {
    base: PlateCarreeGrid,
    pole_lat: f64,
    pole_lon: f64,
    to_rotated: Rotation3<f64>,
    to_geographic: Rotation3<f64>,
}

impl RotatedLatLonGrid {
    /// Create a rotated grid with the given row count and rotated north pole
    /// position in geographic degrees.
    pub fn new(num_rows: usize, pole_lat: f64, pole_lon: f64) -> GridResult<Self> {
        if !pole_lat.is_finite() || !(-90.0..=90.0).contains(&pole_lat) {
            return Err(GridError::invalid_parameter(
                "pole_lat",
                format!("must be within [-90, 90], got {}", pole_lat),
            ));
        }
        if !pole_lon.is_finite() || !(-180.0..=180.0).contains(&pole_lon) {
            return Err(GridError::invalid_parameter(
                "pole_lon",
                format!("must be within [-180, 180], got {}", pole_lon),
            ));
        }

        let base = PlateCarreeGrid::new(num_rows)?;

        // Bring the pole onto the meridian 0, then tilt it onto the z axis
        let spin = Rotation3::from_axis_angle(&Vector3::z_axis(), -pole_lon.to_radians());
        let tilt = Rotation3::from_axis_angle(&Vector3::y_axis(), (pole_lat - 90.0).to_radians());
        let to_rotated = tilt * spin;

        Ok(Self {
            base,
            pole_lat,
            pole_lon,
            to_rotated,
            to_geographic: to_rotated.inverse(),
        })
    }

    pub fn pole(&self) -> (f64, f64) {
        (self.pole_lat, self.pole_lon)
    }

    /// Geographic to rotated-frame coordinates `(lat, lon)`.
    pub fn rotate(&self, lat: f64, lon: f64) -> (f64, f64) {
        from_cartesian(self.to_rotated * to_cartesian(lat, lon))
    }

    /// Rotated-frame to geographic coordinates `(lat, lon)`.
    pub fn unrotate(&self, lat: f64, lon: f64) -> (f64, f64) {
        from_cartesian(self.to_geographic * to_cartesian(lat, lon))
    }
}

fn to_cartesian(lat: f64, lon: f64) -> Vector3<f64> {
    let (lat, lon) = (lat.to_radians(), lon.to_radians());
    Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

fn from_cartesian(v: Vector3<f64>) -> (f64, f64) {
    let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    (lat, lon)
}

impl PlanetaryGrid for RotatedLatLonGrid {
    fn name(&self) -> &'static str {
        "rotated_lat_lon"
    }

    fn bin_index(&self, lat: f64, lon: f64) -> BinId {
        let (rlat, rlon) = self.rotate(lat.clamp(-90.0, 90.0), lon);
        self.base.bin_index(rlat, rlon)
    }

    fn row_index(&self, id: BinId) -> GridResult<usize> {
        self.base.row_index(id)
    }

    fn num_bins(&self) -> u64 {
        self.base.num_bins()
    }

    fn num_rows(&self) -> usize {
        self.base.num_rows()
    }

    fn num_cols(&self, row: usize) -> GridResult<u32> {
        self.base.num_cols(row)
    }

    fn first_bin_index(&self, row: usize) -> GridResult<BinId> {
        self.base.first_bin_index(row)
    }

    fn center_lat(&self, row: usize) -> GridResult<f64> {
        self.base.center_lat(row)
    }

    fn center_lat_lon(&self, id: BinId) -> GridResult<(f64, f64)> {
        let (rlat, rlon) = self.base.center_lat_lon(id)?;
        Ok(self.unrotate(rlat, rlon))
    }
}
