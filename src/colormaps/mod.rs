//! Colormap implementations for data visualization.
//!
//! Provides the matplotlib `rainbow` map used by default, perceptually
//! uniform and single-hue sequential maps, and diverging maps.

pub mod colormap;
pub mod diverging;
pub mod sequential;

pub use colormap::{available_colormaps, get_colormap, Colormap, TRANSPARENT};
