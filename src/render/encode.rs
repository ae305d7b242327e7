//! Colorizing normalized rasters and encoding them as PNG.

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use ndarray::Array2;
use std::io::Cursor;

use crate::colormaps::Colormap;
use crate::error::{IsobarError, Result};

/// Turn a normalized `[row, col]` raster into an RGBA image
pub fn colorize(normalized: &Array2<f32>, colormap: &dyn Colormap) -> RgbaImage {
    let (rows, cols) = normalized.dim();
    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        Rgba(colormap.map_normalized(normalized[[y as usize, x as usize]]))
    })
}

/// Encode an image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| IsobarError::ImageGeneration {
            message: format!("Failed to encode PNG: {}", e),
        })?;
    Ok(buffer.into_inner())
}
