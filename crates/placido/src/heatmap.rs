//! Heatmap synthesis: fitted surface to pseudocolor raster.

use image::{Rgba, RgbaImage};

use crate::fit::FitResult;

/// Backdrop behind the heat disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Plain white canvas.
    #[default]
    White,
    /// The analyzed photograph, stretched to the output size.
    SourceImage,
}

/// Heatmap rendering configuration.
///
/// `center` and `radius` are in source-image coordinates; when
/// `output_size` differs from the source dimensions they are rescaled so
/// the heat disk stays registered with the analyzed area.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeatmapConfig {
    /// Disk center in source-image coordinates.
    pub center: [f64; 2],
    /// Disk radius in source-image pixels.
    pub radius: f64,
    /// Output raster dimensions `[width, height]`.
    pub output_size: [u32; 2],
    /// Backdrop selection.
    pub background: Background,
}

/// Render the fitted surface as a pseudocolor heatmap.
///
/// Every pixel inside the boundary circle re-evaluates the polynomial sum at
/// its `(rho, theta)`; values are min/max-normalized over the disk (left
/// untouched when the surface is flat) and mapped through a
/// blue→cyan→green→yellow→red ramp. An empty fit renders only the backdrop
/// and a placeholder boundary circle — the designed "can't visualize yet"
/// state. The boundary circle is stroked last.
pub fn render_heatmap(
    fit: &FitResult,
    config: &HeatmapConfig,
    source: Option<&RgbaImage>,
) -> RgbaImage {
    let [out_w, out_h] = config.output_size;
    let mut out = RgbaImage::from_pixel(out_w.max(1), out_h.max(1), Rgba([255, 255, 255, 255]));
    let (out_w, out_h) = out.dimensions();

    if config.background == Background::SourceImage {
        if let Some(src) = source {
            stretch_into(&mut out, src);
        }
    }

    let (src_w, src_h) = source.map(|s| s.dimensions()).unwrap_or((out_w, out_h));
    let sx = out_w as f64 / src_w as f64;
    let sy = out_h as f64 / src_h as f64;
    let cx = config.center[0] * sx;
    let cy = config.center[1] * sy;
    let radius = config.radius * sx.min(sy);

    if fit.is_empty() {
        stroke_circle(&mut out, cx, cy, radius, Rgba([200, 200, 200, 255]), 1.0);
        return out;
    }

    // Pass 1: evaluate the surface over the disk, tracking min/max.
    let mut values = vec![f64::NAN; (out_w * out_h) as usize];
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for y in 0..out_h {
        for x in 0..out_w {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if d > radius || radius <= 0.0 {
                continue;
            }
            let rho = d / radius;
            let theta = dy.atan2(dx);
            let v = fit.evaluate(rho, theta);
            values[(y * out_w + x) as usize] = v;
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
    }

    // Pass 2: normalize and color. A flat surface (max == min) skips the
    // normalization rather than dividing by zero; the ramp clamps.
    let range = max_v - min_v;
    for y in 0..out_h {
        for x in 0..out_w {
            let v = values[(y * out_w + x) as usize];
            if v.is_nan() {
                continue;
            }
            let t = if range > 0.0 { (v - min_v) / range } else { v };
            out.put_pixel(x, y, ramp_color(t));
        }
    }

    stroke_circle(&mut out, cx, cy, radius, Rgba([0, 0, 0, 255]), 2.0);
    out
}

/// Four-segment pseudocolor ramp: blue→cyan→green→yellow→red.
///
/// Input is clamped to [0, 1]; each segment linearly interpolates a single
/// channel.
pub(crate) fn ramp_color(value: f64) -> Rgba<u8> {
    let v = value.clamp(0.0, 1.0);
    let (r, g, b) = if v < 0.25 {
        let t = v * 4.0;
        (0.0, t, 1.0)
    } else if v < 0.5 {
        let t = (v - 0.25) * 4.0;
        (0.0, 1.0, 1.0 - t)
    } else if v < 0.75 {
        let t = (v - 0.5) * 4.0;
        (t, 1.0, 0.0)
    } else {
        let t = (v - 0.75) * 4.0;
        (1.0, 1.0 - t, 0.0)
    };
    Rgba([
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        255,
    ])
}

/// Stretch `src` over the full output raster, nearest-neighbor.
fn stretch_into(out: &mut RgbaImage, src: &RgbaImage) {
    let (ow, oh) = out.dimensions();
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return;
    }
    for y in 0..oh {
        let sy = ((y as u64 * sh as u64) / oh as u64).min(sh as u64 - 1) as u32;
        for x in 0..ow {
            let sx = ((x as u64 * sw as u64) / ow as u64).min(sw as u64 - 1) as u32;
            out.put_pixel(x, y, *src.get_pixel(sx, sy));
        }
    }
}

/// Stroke a circle outline of the given width onto the raster.
fn stroke_circle(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>, width: f64) {
    if radius <= 0.0 {
        return;
    }
    let (w, h) = img.dimensions();
    let half = width / 2.0;
    let x0 = ((cx - radius - half).floor().max(0.0)) as u32;
    let y0 = ((cy - radius - half).floor().max(0.0)) as u32;
    let x1 = ((cx + radius + half).ceil().min((w - 1) as f64)) as u32;
    let y1 = ((cy + radius + half).ceil().min((h - 1) as f64)) as u32;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if (d - radius).abs() <= half {
                img.put_pixel(x, y, color);
            }
        }
    }
}
