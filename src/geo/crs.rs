//! Coordinate Reference System types and point transforms.
//!
//! Geographic WGS84 and spherical Web Mercator are handled with inline math.
//! Every other EPSG code (or a raw PROJ.4 string) goes through `proj4rs`.
//! All coordinates are handled in x/y order (longitude first for geographic
//! systems).

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use std::fmt;
use std::sync::Arc;

use crate::error::{IsobarError, Result};
use crate::geo::BoundingBox;

/// Earth radius used by spherical Web Mercator, in meters
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Half the Web Mercator world width, in meters
pub const MERCATOR_MAX_EXTENT: f64 = 20037508.342789244;

/// Latitude where Web Mercator becomes square
pub const MERCATOR_MAX_LAT: f64 = 85.0511287798066;

const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Points sampled along each bbox edge when projecting it to WGS84
const EDGE_SAMPLES: usize = 21;

/// A coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub enum Crs {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// Any other system `proj4rs` can build
    Proj(ProjCrs),
}

/// A `proj4rs` projection paired with WGS84 for transforms
#[derive(Clone)]
pub struct ProjCrs {
    name: String,
    geographic: bool,
    projs: Arc<(Proj, Proj)>,
}

impl ProjCrs {
    fn new(name: String, definition: &str) -> Result<Self> {
        let build = |def: &str| {
            Proj::from_proj_string(def).map_err(|e| {
                IsobarError::invalid("crs", format!("Cannot build CRS {}: {:?}", name, e))
            })
        };
        let proj = build(definition)?;
        let wgs84 = build(WGS84_PROJ)?;
        Ok(Self {
            geographic: definition.contains("+proj=longlat")
                || definition.contains("+proj=latlong"),
            name,
            projs: Arc::new((proj, wgs84)),
        })
    }

    fn to_wgs84(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (proj, wgs84) = &*self.projs;
        transform_point(proj, wgs84, (x, y), self.geographic, true)
    }

    fn from_wgs84(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (proj, wgs84) = &*self.projs;
        transform_point(wgs84, proj, (lon, lat), true, self.geographic)
    }
}

/// Run one point through `proj4rs`, which works in radians for geographic systems
fn transform_point(
    from: &Proj,
    to: &Proj,
    (x, y): (f64, f64),
    from_geographic: bool,
    to_geographic: bool,
) -> Option<(f64, f64)> {
    let mut point = if from_geographic {
        (x.to_radians(), y.to_radians(), 0.0)
    } else {
        (x, y, 0.0)
    };
    transform(from, to, &mut point).ok()?;
    let (out_x, out_y) = if to_geographic {
        (point.0.to_degrees(), point.1.to_degrees())
    } else {
        (point.0, point.1)
    };
    (out_x.is_finite() && out_y.is_finite()).then_some((out_x, out_y))
}

impl PartialEq for ProjCrs {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for ProjCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjCrs")
            .field("name", &self.name)
            .field("geographic", &self.geographic)
            .finish_non_exhaustive()
    }
}

impl Crs {
    /// Parse a CRS string from a request.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "epsg:4326", "CRS:84", "OGC:CRS84"
    /// - "EPSG:3857", "EPSG:900913", "EPSG:102100"
    /// - any other "EPSG:<code>" known to the EPSG registry, e.g. "EPSG:32633"
    /// - a PROJ.4 definition such as "+proj=utm +zone=33 +datum=WGS84"
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let normalized = trimmed.to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" | "OGC:CRS84" => return Ok(Crs::Epsg4326),
            "EPSG:3857" | "EPSG:900913" | "EPSG:102100" => return Ok(Crs::Epsg3857),
            _ => {}
        }

        if trimmed.starts_with("+proj=") {
            return Ok(Crs::Proj(ProjCrs::new(trimmed.to_string(), trimmed)?));
        }

        let definition = normalized
            .strip_prefix("EPSG:")
            .and_then(|code| code.parse::<u16>().ok())
            .and_then(crs_definitions::from_code)
            .ok_or_else(|| {
                IsobarError::invalid(
                    "crs",
                    format!(
                        "Unsupported CRS: {}. Use an EPSG code (e.g. EPSG:4326, EPSG:3857) or a PROJ.4 string",
                        s
                    ),
                )
            })?;
        Ok(Crs::Proj(ProjCrs::new(normalized, definition.proj4)?))
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        match self {
            Crs::Epsg4326 => true,
            Crs::Epsg3857 => false,
            Crs::Proj(p) => p.geographic,
        }
    }

    /// Whether longitude depends only on x and latitude only on y
    pub fn is_separable(&self) -> bool {
        matches!(self, Crs::Epsg4326 | Crs::Epsg3857)
    }

    /// Transform a point in this CRS to WGS84 lon/lat.
    ///
    /// `None` when the point lies outside the projection's domain.
    pub fn to_wgs84(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        match self {
            Crs::Epsg4326 => Some((x, y)),
            Crs::Epsg3857 => Some(mercator_to_wgs84(x, y)),
            Crs::Proj(p) => p.to_wgs84(x, y),
        }
    }

    /// Transform a WGS84 lon/lat point into this CRS.
    pub fn from_wgs84(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match self {
            Crs::Epsg4326 => Some((lon, lat)),
            Crs::Epsg3857 => Some(wgs84_to_mercator(lon, lat)),
            Crs::Proj(p) => p.from_wgs84(lon, lat),
        }
    }

    /// Transform a bbox in this CRS to a WGS84 bbox covering it.
    ///
    /// Separable systems map corner to corner. Other systems are sampled
    /// along all four edges. `None` when no edge point can be transformed.
    pub fn bbox_to_wgs84(&self, bbox: &BoundingBox) -> Option<BoundingBox> {
        match self {
            Crs::Epsg4326 => Some(*bbox),
            Crs::Epsg3857 => {
                let (min_lon, min_lat) = mercator_to_wgs84(bbox.min_x, bbox.min_y);
                let (max_lon, max_lat) = mercator_to_wgs84(bbox.max_x, bbox.max_y);
                Some(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
            }
            Crs::Proj(p) => {
                let steps = (EDGE_SAMPLES - 1) as f64;
                let points = (0..EDGE_SAMPLES).flat_map(|i| {
                    let f = i as f64 / steps;
                    let x = bbox.min_x + f * bbox.width();
                    let y = bbox.min_y + f * bbox.height();
                    [
                        (x, bbox.min_y),
                        (x, bbox.max_y),
                        (bbox.min_x, y),
                        (bbox.max_x, y),
                    ]
                });
                let mut extent: Option<BoundingBox> = None;
                for (lon, lat) in points.filter_map(|(x, y)| p.to_wgs84(x, y)) {
                    extent = Some(match extent {
                        None => BoundingBox::new(lon, lat, lon, lat),
                        Some(e) => BoundingBox::new(
                            e.min_x.min(lon),
                            e.min_y.min(lat),
                            e.max_x.max(lon),
                            e.max_y.max(lat),
                        ),
                    });
                }
                extent
            }
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg4326 => write!(f, "EPSG:4326"),
            Crs::Epsg3857 => write!(f, "EPSG:3857"),
            Crs::Proj(p) => write!(f, "{}", p.name),
        }
    }
}

/// Convert latitude to Web Mercator Y coordinate
pub fn lat_to_mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let lat_rad = lat.to_radians();
    ((std::f64::consts::PI / 4.0) + (lat_rad / 2.0)).tan().ln() * EARTH_RADIUS
}

/// Convert Web Mercator Y coordinate to latitude
pub fn mercator_y_to_lat(y: f64) -> f64 {
    let y_normalized = y / EARTH_RADIUS;
    (2.0 * y_normalized.exp().atan() - std::f64::consts::PI / 2.0).to_degrees()
}

/// Convert WGS84 lon/lat to Web Mercator x/y
pub fn wgs84_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    (lon.to_radians() * EARTH_RADIUS, lat_to_mercator_y(lat))
}

/// Convert Web Mercator x/y to WGS84 lon/lat
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    ((x / EARTH_RADIUS).to_degrees(), mercator_y_to_lat(y))
}
