//! Equirectangular (Plate-Carrée) binning grid.
//!
//! Every row has `2 * num_rows` bins of equal angular size, so the grid can
//! also be viewed as a `num_cols x num_rows` raster. That raster view is used
//! to split large reprojection jobs into tiles.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::grid::{check_bin, check_row, clamp_index, BinId, PlanetaryGrid};
use crate::region::{GeoBoundingBox, Region};

/// Regular lat/lon grid with `num_rows` rows and `2 * num_rows` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateCarreeGrid {
    num_rows: usize,
    num_cols: usize,
}

impl PlateCarreeGrid {
    /// Create a grid with the given (even, at least 2) number of rows.
    pub fn new(num_rows: usize) -> GridResult<Self> {
        if num_rows < 2 || num_rows % 2 != 0 {
            return Err(GridError::invalid_parameter(
                "num_rows",
                format!("must be even and >= 2, got {}", num_rows),
            ));
        }
        Ok(Self {
            num_rows,
            num_cols: 2 * num_rows,
        })
    }

    /// Number of columns, identical for every row.
    pub fn cols_per_row(&self) -> usize {
        self.num_cols
    }

    /// Size of one bin in degrees (both directions).
    pub fn resolution(&self) -> f64 {
        180.0 / self.num_rows as f64
    }

    /// Column containing the given longitude, clamped.
    pub fn col_index(&self, lon: f64) -> usize {
        clamp_index((lon + 180.0) * self.num_cols as f64 / 360.0, self.num_cols)
    }

    /// Row containing the given latitude, clamped. Row 0 is northernmost.
    pub fn row_of_lat(&self, lat: f64) -> usize {
        let from_south = clamp_index((lat + 90.0) * self.num_rows as f64 / 180.0, self.num_rows);
        (self.num_rows - 1) - from_south
    }

    /// Longitude of the centre of the given column.
    pub fn center_lon(&self, col: usize) -> f64 {
        -180.0 + (col as f64 + 0.5) * 360.0 / self.num_cols as f64
    }

    /// Split the raster into tiles of at most `tile_size x tile_size` bins.
    ///
    /// Tiles are returned in row-major order. When a region is given, only the
    /// tiles whose geographic bounds intersect it are kept.
    pub fn tile_rectangles(
        &self,
        tile_size: usize,
        region: Option<&Region>,
    ) -> GridResult<Vec<TileRect>> {
        if tile_size == 0 {
            return Err(GridError::invalid_parameter("tile_size", "must be > 0"));
        }

        let mut tiles = Vec::new();
        for y in (0..self.num_rows).step_by(tile_size) {
            let height = tile_size.min(self.num_rows - y);
            for x in (0..self.num_cols).step_by(tile_size) {
                let width = tile_size.min(self.num_cols - x);
                let rect = TileRect {
                    x,
                    y,
                    width,
                    height,
                };
                let keep = match region {
                    Some(region) => region.intersects_bbox(&self.rect_bounds(&rect)),
                    None => true,
                };
                if keep {
                    tiles.push(rect);
                }
            }
        }
        Ok(tiles)
    }

    /// Geographic bounds of a raster rectangle.
    pub fn rect_bounds(&self, rect: &TileRect) -> GeoBoundingBox {
        let res = self.resolution();
        GeoBoundingBox::new(
            -180.0 + rect.x as f64 * res,
            90.0 - (rect.y + rect.height) as f64 * res,
            -180.0 + (rect.x + rect.width) as f64 * res,
            90.0 - rect.y as f64 * res,
        )
    }
}

impl PlanetaryGrid for PlateCarreeGrid {
    fn name(&self) -> &'static str {
        "plate_carree"
    }

    fn bin_index(&self, lat: f64, lon: f64) -> BinId {
        let row = self.row_of_lat(lat);
        let col = self.col_index(lon);
        (row * self.num_cols + col) as BinId
    }

    fn row_index(&self, id: BinId) -> GridResult<usize> {
        check_bin(id, self.num_bins())?;
        Ok((id / self.num_cols as u64) as usize)
    }

    fn num_bins(&self) -> u64 {
        (self.num_rows * self.num_cols) as u64
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self, row: usize) -> GridResult<u32> {
        check_row(row, self.num_rows)?;
        Ok(self.num_cols as u32)
    }

    fn first_bin_index(&self, row: usize) -> GridResult<BinId> {
        check_row(row, self.num_rows)?;
        Ok((row * self.num_cols) as BinId)
    }

    fn center_lat(&self, row: usize) -> GridResult<f64> {
        check_row(row, self.num_rows)?;
        Ok(90.0 - (row as f64 + 0.5) * self.resolution())
    }

    fn center_lat_lon(&self, id: BinId) -> GridResult<(f64, f64)> {
        let row = self.row_index(id)?;
        let col = (id % self.num_cols as u64) as usize;
        Ok((self.center_lat(row)?, self.center_lon(col)))
    }
}

/// A rectangle of bins in the raster view of a Plate-Carrée grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    /// First column
    pub x: usize,
    /// First row (row 0 is north)
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl TileRect {
    /// Number of bins covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}
