//! Bounding box types and parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IsobarError, Result};

/// A geographic or projected bounding box.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a bbox request parameter: "xmin,ymin,xmax,ymax"
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(IsobarError::invalid(
                "bbox",
                format!(
                    "Bounding box must be in format 'xmin,ymin,xmax,ymax', got '{}'",
                    s
                ),
            ));
        }

        let mut values = [0.0f64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = match part.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    return Err(IsobarError::invalid(
                        "bbox",
                        format!("Invalid number in bounding box: '{}'", part),
                    ))
                }
            };
        }
        let [min_x, min_y, max_x, max_y] = values;

        if min_x >= max_x {
            return Err(IsobarError::invalid(
                "bbox",
                format!("xmin ({}) must be less than xmax ({})", min_x, max_x),
            ));
        }
        if min_y >= max_y {
            return Err(IsobarError::invalid(
                "bbox",
                format!("ymin ({}) must be less than ymax ({})", min_y, max_y),
            ));
        }

        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6},{:.6},{:.6}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
