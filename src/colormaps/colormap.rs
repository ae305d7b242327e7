//! Colormap trait and registry.
//!
//! This module defines the common interface for all colormaps and the
//! name lookup used by request handlers.

use crate::error::{IsobarError, Result};

/// Color used for missing data
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Suffix selecting the reversed variant of a colormap
const REVERSED_SUFFIX: &str = "_r";

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map a value already normalized to `[0, 1]` to an RGBA color.
    fn map_rgba(&self, value: f64) -> [u8; 4];

    /// Map a normalized value, handling missing data and out-of-range input.
    fn map_normalized(&self, value: f32) -> [u8; 4] {
        if value.is_nan() {
            return TRANSPARENT;
        }
        self.map_rgba(value.clamp(0.0, 1.0) as f64)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// A colormap traversed from its high end to its low end
struct Reversed {
    inner: Box<dyn Colormap>,
    name: String,
}

impl Colormap for Reversed {
    fn map_rgba(&self, value: f64) -> [u8; 4] {
        self.inner.map_rgba(1.0 - value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Names accepted by [`get_colormap`] (each also with an `_r` suffix)
pub fn available_colormaps() -> Vec<&'static str> {
    let mut names = vec!["rainbow"];
    names.extend_from_slice(super::sequential::PRESET_NAMES);
    names.extend_from_slice(super::diverging::DIVERGING_NAMES);
    names
}

/// Get a colormap by name
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    let lower = name.trim().to_lowercase();
    if let Some(base) = lower.strip_suffix(REVERSED_SUFFIX) {
        let inner = lookup(base).ok_or_else(|| unknown(name))?;
        return Ok(Box::new(Reversed {
            inner: inner?,
            name: lower.clone(),
        }));
    }
    lookup(&lower).ok_or_else(|| unknown(name))?
}

fn lookup(name: &str) -> Option<Result<Box<dyn Colormap>>> {
    use super::{diverging, sequential};

    if name == "rainbow" {
        return Some(Ok(Box::new(sequential::Rainbow)));
    }
    if let Some(map) = sequential::preset(name) {
        return Some(Ok(Box::new(map)));
    }
    diverging::diverging(name).map(|result| result.map(|map| Box::new(map) as Box<dyn Colormap>))
}

fn unknown(name: &str) -> IsobarError {
    IsobarError::invalid(
        "cmap",
        format!(
            "Unknown colormap: {}. Available: {}",
            name,
            available_colormaps().join(", ")
        ),
    )
}

/// Convert a unit-interval channel value to a byte
pub fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
