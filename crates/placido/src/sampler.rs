//! Sub-pixel intensity sampling over RGBA rasters.

use image::RgbaImage;

/// Pixel classifier deciding whether an RGBA value belongs to a Placido ring.
///
/// Two predicate generations exist in the field and disagree; both are kept
/// selectable with their thresholds exposed. [`RingPredicate::NearWhite`] is
/// the current default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingPredicate {
    /// Near-white ring pixels: all of r, g, b at or above `color_min` and
    /// alpha at or above `alpha_min`.
    NearWhite { color_min: u8, alpha_min: u8 },
    /// Legacy red-dominant ring pixels: bright red channel, suppressed green
    /// and blue, red strictly dominant.
    RedDominant {
        red_min: u8,
        green_max: u8,
        blue_max: u8,
        alpha_min: u8,
    },
}

impl Default for RingPredicate {
    fn default() -> Self {
        Self::NearWhite {
            color_min: 150,
            alpha_min: 128,
        }
    }
}

impl RingPredicate {
    /// Legacy predicate with its historical thresholds.
    pub fn red_dominant() -> Self {
        Self::RedDominant {
            red_min: 100,
            green_max: 80,
            blue_max: 80,
            alpha_min: 128,
        }
    }

    /// Apply the predicate to one RGBA value.
    #[inline]
    pub fn matches(self, r: u8, g: u8, b: u8, a: u8) -> bool {
        match self {
            Self::NearWhite {
                color_min,
                alpha_min,
            } => r >= color_min && g >= color_min && b >= color_min && a >= alpha_min,
            Self::RedDominant {
                red_min,
                green_max,
                blue_max,
                alpha_min,
            } => r >= red_min && g <= green_max && b <= blue_max && a >= alpha_min && r > g && r > b,
        }
    }
}

/// Sample ring intensity at a sub-pixel position using bilinear interpolation.
///
/// Each of the four corner pixels contributes `r/255` if it passes the ring
/// predicate and 0 otherwise, blended with standard bilinear weights.
/// Returns intensity in [0, 1], or `None` if any corner is out of bounds.
#[inline]
pub fn intensity_at_checked(
    img: &RgbaImage,
    pred: RingPredicate,
    x: f64,
    y: f64,
) -> Option<f64> {
    let (w, h) = img.dimensions();
    if w < 2 || h < 2 || x < 0.0 || y < 0.0 {
        return None;
    }
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    if x0 >= w - 1 || y0 >= h - 1 {
        return None;
    }

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;
    let stride = w as usize * 4;
    let x0 = x0 as usize;
    let y0 = y0 as usize;
    let idx00 = y0 * stride + x0 * 4;
    let idx10 = idx00 + 4;
    let idx01 = idx00 + stride;
    let idx11 = idx01 + 4;

    let raw = img.as_raw();
    const INV_255: f64 = 1.0 / 255.0;
    let corner = |idx: usize| -> f64 {
        let (r, g, b, a) = (raw[idx], raw[idx + 1], raw[idx + 2], raw[idx + 3]);
        if pred.matches(r, g, b, a) {
            r as f64 * INV_255
        } else {
            0.0
        }
    };
    let p00 = corner(idx00);
    let p10 = corner(idx10);
    let p01 = corner(idx01);
    let p11 = corner(idx11);

    Some(
        (1.0 - fx) * (1.0 - fy) * p00
            + fx * (1.0 - fy) * p10
            + (1.0 - fx) * fy * p01
            + fx * fy * p11,
    )
}

/// Sample ring intensity at a sub-pixel position.
///
/// Out-of-bounds positions read as 0.0 rather than failing; the scan sweeps
/// rays up to the image border and relies on that.
#[inline]
pub fn intensity_at(img: &RgbaImage, pred: RingPredicate, x: f64, y: f64) -> f64 {
    intensity_at_checked(img, pred, x, y).unwrap_or(0.0)
}
