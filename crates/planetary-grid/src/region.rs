//! Geographic bounding boxes and region-of-interest polygons.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check if this bounding box intersects another (shared edges count).
    pub fn intersects(&self, other: &GeoBoundingBox) -> bool {
        !(self.max_lon < other.min_lon
            || self.min_lon > other.max_lon
            || self.max_lat < other.min_lat
            || self.min_lat > other.max_lat)
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Corners in counter-clockwise order starting south-west, as `(lon, lat)`.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_lon, self.min_lat),
            (self.max_lon, self.min_lat),
            (self.max_lon, self.max_lat),
            (self.min_lon, self.max_lat),
        ]
    }
}

impl Default for GeoBoundingBox {
    fn default() -> Self {
        // Global coverage
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }
}

/// A simple (non self-intersecting) polygon of `(lon, lat)` vertices.
///
/// The ring is closed implicitly; repeating the first vertex is allowed.
/// Serialised as a plain list of `[lon, lat]` pairs and validated on the
/// way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct Region {
    vertices: Vec<(f64, f64)>,
    bounds: Option<GeoBoundingBox>,
}

impl TryFrom<Vec<(f64, f64)>> for Region {
    type Error = GridError;

    fn try_from(vertices: Vec<(f64, f64)>) -> GridResult<Self> {
        Self::polygon(vertices)
    }
}

impl From<Region> for Vec<(f64, f64)> {
    fn from(region: Region) -> Self {
        region.vertices
    }
}

impl Region {
    /// Build a region from polygon vertices given as `(lon, lat)`.
    pub fn polygon(vertices: Vec<(f64, f64)>) -> GridResult<Self> {
        if vertices.len() < 3 {
            return Err(GridError::invalid_parameter(
                "region",
                format!("polygon needs at least 3 vertices, got {}", vertices.len()),
            ));
        }
        if vertices.iter().any(|(lon, lat)| !lon.is_finite() || !lat.is_finite()) {
            return Err(GridError::invalid_parameter(
                "region",
                "polygon vertices must be finite",
            ));
        }
        let bounds = Some(bounds_of(&vertices));
        Ok(Self { vertices, bounds })
    }

    /// Build a rectangular region.
    pub fn from_bbox(bbox: GeoBoundingBox) -> Self {
        Self {
            vertices: bbox.corners().to_vec(),
            bounds: Some(bbox),
        }
    }

    /// Polygon vertices as `(lon, lat)`.
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Bounding box of the polygon.
    pub fn bounds(&self) -> GeoBoundingBox {
        self.bounds.unwrap_or_else(|| bounds_of(&self.vertices))
    }

    /// Even-odd point-in-polygon test.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.vertices[i];
            let (xj, yj) = self.vertices[j];
            if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Check if the polygon and the rectangle share any area or boundary.
    pub fn intersects_bbox(&self, bbox: &GeoBoundingBox) -> bool {
        if !self.bounds().intersects(bbox) {
            return false;
        }
        if self.vertices.iter().any(|&(lon, lat)| bbox.contains(lon, lat)) {
            return true;
        }
        let corners = bbox.corners();
        if corners.iter().any(|&(lon, lat)| self.contains(lon, lat)) {
            return true;
        }

        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            for k in 0..4 {
                if segments_intersect(a, b, corners[k], corners[(k + 1) % 4]) {
                    return true;
                }
            }
        }
        false
    }
}

fn bounds_of(vertices: &[(f64, f64)]) -> GeoBoundingBox {
    let mut bbox = GeoBoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for &(lon, lat) in vertices {
        bbox.min_lon = bbox.min_lon.min(lon);
        bbox.min_lat = bbox.min_lat.min(lat);
        bbox.max_lon = bbox.max_lon.max(lon);
        bbox.max_lat = bbox.max_lat.max(lat);
    }
    bbox
}

fn orientation(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
    r.0 >= p.0.min(q.0) && r.0 <= p.0.max(q.0) && r.1 >= p.1.min(q.1) && r.1 <= p.1.max(q.1)
}

fn segments_intersect(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}
