//! XYZ (slippy map) tile coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IsobarError, Result};
use crate::geo::crs::MERCATOR_MAX_EXTENT;
use crate::geo::BoundingBox;

/// Deepest zoom level accepted
pub const MAX_ZOOM: u32 = 30;

/// A tile coordinate (z/x/y) with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    /// Create a tile coordinate, checking it exists at its zoom level
    pub fn new(z: u32, x: u32, y: u32) -> Result<Self> {
        if z > MAX_ZOOM {
            return Err(IsobarError::invalid(
                "z",
                format!("Zoom level {} exceeds the maximum of {}", z, MAX_ZOOM),
            ));
        }
        let n = 1u64 << z;
        if u64::from(x) >= n || u64::from(y) >= n {
            return Err(IsobarError::invalid(
                "tile",
                format!(
                    "Tile {}/{}/{} is outside the {}x{} grid of zoom {}",
                    z, x, y, n, n, z
                ),
            ));
        }
        Ok(Self { z, x, y })
    }

    fn tiles_per_side(&self) -> f64 {
        (1u64 << self.z) as f64
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Bounds of a tile in WGS84 degrees (west, south, east, north).
pub fn tile_bounds(coord: &TileCoord) -> BoundingBox {
    let n = coord.tiles_per_side();

    let lon_min = coord.x as f64 / n * 360.0 - 180.0;
    let lon_max = (coord.x + 1) as f64 / n * 360.0 - 180.0;

    let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * coord.y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (coord.y + 1) as f64 / n))
        .sinh()
        .atan()
        .to_degrees();

    BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
}

/// Bounds of a tile in Web Mercator meters.
pub fn tile_bounds_mercator(coord: &TileCoord) -> BoundingBox {
    let span = 2.0 * MERCATOR_MAX_EXTENT / coord.tiles_per_side();

    let min_x = -MERCATOR_MAX_EXTENT + coord.x as f64 * span;
    let max_y = MERCATOR_MAX_EXTENT - coord.y as f64 * span;

    BoundingBox::new(min_x, max_y - span, min_x + span, max_y)
}
