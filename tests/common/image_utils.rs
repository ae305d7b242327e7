//! Image inspection utilities for testing.

use image::{ImageFormat, RgbaImage};

/// Decode PNG bytes, checking the format on the way
pub fn decode_png(bytes: &[u8]) -> RgbaImage {
    assert_eq!(
        image::guess_format(bytes).expect("Unrecognized image format"),
        ImageFormat::Png
    );
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .expect("Failed to decode PNG")
        .to_rgba8()
}

/// RGBA value of one pixel
pub fn pixel(image: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    image.get_pixel(x, y).0
}

/// Whether a pixel is fully transparent (missing data)
pub fn is_transparent(image: &RgbaImage, x: u32, y: u32) -> bool {
    pixel(image, x, y)[3] == 0
}

/// Number of fully transparent pixels
pub fn transparent_count(image: &RgbaImage) -> usize {
    image.pixels().filter(|p| p.0[3] == 0).count()
}

/// Number of distinct opaque colors
pub fn distinct_colors(image: &RgbaImage) -> usize {
    let mut colors: Vec<[u8; 4]> = image
        .pixels()
        .filter(|p| p.0[3] == 255)
        .map(|p| p.0)
        .collect();
    colors.sort();
    colors.dedup();
    colors.len()
}
