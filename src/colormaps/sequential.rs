//! Sequential colormaps (single-hue or multi-hue progression).
//!
//! `rainbow` reproduces matplotlib's map of the same name; the other maps
//! come from the `colorgrad` presets.

use std::f64::consts::PI;

use super::colormap::{channel_to_u8, Colormap};

/// Names of the colorgrad-backed sequential maps
pub const PRESET_NAMES: &[&str] = &[
    "viridis", "plasma", "inferno", "magma", "cividis", "turbo", "spectral", "greys", "blues",
    "reds",
];

/// Matplotlib's `rainbow`: red = |2x - 1/2|, green = sin(pi x), blue = cos(pi x / 2)
pub struct Rainbow;

impl Colormap for Rainbow {
    fn map_rgba(&self, value: f64) -> [u8; 4] {
        [
            channel_to_u8((2.0 * value - 0.5).abs()),
            channel_to_u8((PI * value).sin()),
            channel_to_u8((PI * value / 2.0).cos()),
            255,
        ]
    }

    fn name(&self) -> &str {
        "rainbow"
    }
}

/// A colormap backed by a `colorgrad` gradient
pub struct GradientColormap {
    name: &'static str,
    gradient: colorgrad::Gradient,
}

impl GradientColormap {
    pub fn new(name: &'static str, gradient: colorgrad::Gradient) -> Self {
        Self { name, gradient }
    }
}

impl Colormap for GradientColormap {
    fn map_rgba(&self, value: f64) -> [u8; 4] {
        self.gradient.at(value).to_rgba8()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Look up a colorgrad preset by its lowercase name
pub fn preset(name: &str) -> Option<GradientColormap> {
    let (name, gradient) = match name {
        "viridis" => ("viridis", colorgrad::viridis()),
        "plasma" => ("plasma", colorgrad::plasma()),
        "inferno" => ("inferno", colorgrad::inferno()),
        "magma" => ("magma", colorgrad::magma()),
        "cividis" => ("cividis", colorgrad::cividis()),
        "turbo" => ("turbo", colorgrad::turbo()),
        "spectral" => ("spectral", colorgrad::spectral()),
        "greys" => ("greys", colorgrad::greys()),
        "blues" => ("blues", colorgrad::blues()),
        "reds" => ("reds", colorgrad::reds()),
        _ => return None,
    };
    Some(GradientColormap::new(name, gradient))
}
