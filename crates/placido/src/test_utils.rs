//! Shared test fixtures: synthetic Placido target rendering.

use image::{Rgba, RgbaImage};

/// Render a synthetic Placido target: white annuli on a black field.
///
/// A pixel at distance `d` from `center` is ring-white when `|d - r|` is
/// within `half_width` of any radius in `ring_radii`.
pub(crate) fn draw_placido_image(
    w: u32,
    h: u32,
    center: [f64; 2],
    ring_radii: &[f64],
    half_width: f64,
) -> RgbaImage {
    let mut img = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f64 - center[0];
            let dy = y as f64 - center[1];
            let d = (dx * dx + dy * dy).sqrt();
            let on_ring = ring_radii.iter().any(|&r| (d - r).abs() <= half_width);
            let pix = if on_ring {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            };
            img.put_pixel(x, y, pix);
        }
    }
    img
}
