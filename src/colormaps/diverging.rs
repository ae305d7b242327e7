//! Diverging colormaps (two-hue progression with center).
//!
//! These colormaps are suitable for anomalies and other data that diverges
//! from a central value. They are built as `colorgrad` custom gradients
//! from fixed color stops.

use colorgrad::{Color, CustomGradient};

use super::sequential::GradientColormap;
use crate::error::{IsobarError, Result};

/// Names of the diverging maps
pub const DIVERGING_NAMES: &[&str] = &["coolwarm", "rdbu", "seismic"];

/// Blue to white to red, good for temperature anomalies
const COOLWARM: [[u8; 3]; 17] = [
    [59, 76, 192], // Dark blue
    [77, 104, 215],
    [98, 130, 234],
    [119, 154, 247],
    [141, 176, 254],
    [163, 194, 255],
    [184, 208, 249],
    [204, 217, 238],
    [221, 221, 221], // White/gray in the middle
    [236, 211, 197],
    [245, 196, 173],
    [247, 177, 148],
    [244, 154, 123],
    [236, 127, 99],
    [222, 96, 77],
    [203, 62, 56],
    [192, 40, 47], // Dark red
];

/// Dark blue through white to dark red
const SEISMIC: [[u8; 3]; 15] = [
    [0, 0, 127],
    [0, 0, 191],
    [0, 63, 255],
    [0, 127, 255],
    [0, 191, 255],
    [127, 223, 255],
    [191, 239, 255],
    [255, 255, 255],
    [255, 239, 191],
    [255, 223, 127],
    [255, 191, 0],
    [255, 127, 0],
    [255, 63, 0],
    [191, 0, 0],
    [127, 0, 0],
];

fn build(name: &'static str, stops: &[[u8; 3]], reversed: bool) -> Result<GradientColormap> {
    let mut colors: Vec<Color> = stops
        .iter()
        .map(|[r, g, b]| Color::from_rgba8(*r, *g, *b, 255))
        .collect();
    if reversed {
        colors.reverse();
    }

    let gradient = CustomGradient::new()
        .colors(&colors)
        .build()
        .map_err(|e| IsobarError::ImageGeneration {
            message: format!("Failed to build colormap {}: {}", name, e),
        })?;

    Ok(GradientColormap::new(name, gradient))
}

/// Look up a diverging colormap by its lowercase name
pub fn diverging(name: &str) -> Option<Result<GradientColormap>> {
    match name {
        "coolwarm" => Some(build("coolwarm", &COOLWARM, false)),
        // Red to white to blue
        "rdbu" => Some(build("rdbu", &COOLWARM, true)),
        "seismic" => Some(build("seismic", &SEISMIC, false)),
        _ => None,
    }
}
