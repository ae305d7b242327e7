//! Geographic utilities: bounding boxes, coordinate reference systems and
//! slippy-map tiles.

pub mod bbox;
pub mod crs;
pub mod tile;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use tile::{tile_bounds, tile_bounds_mercator, TileCoord};

/// Normalize a longitude value to the range [-180, 180)
pub fn normalize_longitude(lon: f64) -> f64 {
    let normalized = ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;

    // 180.0 belongs to the western edge in the normalized form
    if normalized == 180.0 {
        -180.0
    } else {
        normalized
    }
}

/// Shift `lon` by whole turns so it falls in `[start, start + 360)`.
///
/// Used to bring request longitudes into the convention of a grid whose
/// first longitude is `start` (e.g. 0..360 grids).
pub fn wrap_longitude_from(lon: f64, start: f64) -> f64 {
    start + (lon - start).rem_euclid(360.0)
}
