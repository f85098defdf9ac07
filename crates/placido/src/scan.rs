//! Radial ring scanning: ray sweep, threshold hits, consecutive-hit grouping.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use image::RgbaImage;

use crate::sampler::{intensity_at, RingPredicate};

/// One sub-pixel sample on a scan ray that passed the brightness threshold.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RingHit {
    /// Index of the sample along the ray (uniform radial spacing).
    pub sample_index: usize,
    /// Radius of the sample in pixels.
    pub radius: f64,
    /// Rounded pixel coordinate, for visualization overlays only.
    pub px: [i32; 2],
}

/// A detected ring crossing on one scan ray.
///
/// Collapses a maximal run of radius-consecutive hits: `radius` is the mean
/// of the member radii, and `(x, y)` is re-projected from that mean radius
/// and the ray angle rather than averaged from member coordinates, which
/// keeps repeated scans bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ring {
    /// Distance from the scan center in pixels.
    pub radius: f64,
    /// Projected x position in image coordinates.
    pub x: f64,
    /// Projected y position in image coordinates.
    pub y: f64,
}

/// Per-angle ring detections, keyed by integer angle-degrees.
///
/// A key is present only when at least one ring was detected on that ray;
/// rings are ordered by increasing radius. Iteration order is ascending by
/// angle, which downstream stages rely on for reproducibility.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RingMap {
    rings: BTreeMap<u16, Vec<Ring>>,
}

impl RingMap {
    /// Build a map from per-angle ring lists, dropping empty lists.
    pub fn from_entries(entries: impl IntoIterator<Item = (u16, Vec<Ring>)>) -> Self {
        let rings = entries
            .into_iter()
            .filter(|(_, list)| !list.is_empty())
            .collect();
        Self { rings }
    }

    /// True when no angle detected any ring.
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Number of angle keys with at least one detection.
    pub fn angle_count(&self) -> usize {
        self.rings.len()
    }

    /// Total ring count across all angles.
    pub fn total_rings(&self) -> usize {
        self.rings.values().map(Vec::len).sum()
    }

    /// Rings detected at one angle, ordered by increasing radius.
    pub fn rings_at(&self, angle_deg: u16) -> Option<&[Ring]> {
        self.rings.get(&angle_deg).map(Vec::as_slice)
    }

    /// Iterate angles in ascending order with their ring lists.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &[Ring])> {
        self.rings.iter().map(|(&a, list)| (a, list.as_slice()))
    }

    /// All ring positions flattened to `(x, y, radius, angle_deg)`, angle-ordered.
    pub fn flat_points(&self) -> Vec<(f64, f64, f64, u16)> {
        self.iter()
            .flat_map(|(angle, list)| list.iter().map(move |r| (r.x, r.y, r.radius, angle)))
            .collect()
    }

    pub(crate) fn insert(&mut self, angle_deg: u16, rings: Vec<Ring>) {
        if !rings.is_empty() {
            self.rings.insert(angle_deg, rings);
        }
    }

    /// Remove one ring by angle and in-sequence index; drops the angle key
    /// when its list empties. Returns the removed ring.
    pub(crate) fn remove_ring(&mut self, angle_deg: u16, index: usize) -> Option<Ring> {
        let list = self.rings.get_mut(&angle_deg)?;
        if index >= list.len() {
            return None;
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.rings.remove(&angle_deg);
        }
        Some(removed)
    }

    /// Remove all rings failing the predicate; drops emptied angle keys.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(u16, &Ring) -> bool) {
        self.rings.retain(|&angle, list| {
            list.retain(|ring| keep(angle, ring));
            !list.is_empty()
        });
    }
}

/// Ring scan configuration.
///
/// `center` and `max_radius` default to the image center and
/// `0.9 × min(w, h) / 2` when unset. Out-of-range values are clamped onto
/// the documented bounds by [`ScanConfig::normalized`], which the scan
/// applies internally.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of equally spaced scan rays in `[0, 2π)`; 72–720 in steps of 36.
    pub num_angles: u32,
    /// Samples per ray; 100–1000 in steps of 50.
    pub num_samples: u32,
    /// Intensity threshold in (0, 1] above which a sample counts as a hit; 0.1–1.0.
    pub threshold: f64,
    /// Scan center in image coordinates; image center when `None`.
    pub center: Option<[f64; 2]>,
    /// Maximum ray radius in pixels; derived from the image when `None`.
    pub max_radius: Option<f64>,
    /// Ring-pixel classifier applied at every sample.
    pub predicate: RingPredicate,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            num_angles: 360,
            num_samples: 500,
            threshold: 0.5,
            center: None,
            max_radius: None,
            predicate: RingPredicate::default(),
        }
    }
}

impl ScanConfig {
    const ANGLE_STEP: u32 = 36;
    const SAMPLE_STEP: u32 = 50;

    /// Return a copy with all tunables clamped onto their documented bounds.
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        out.num_angles = snap(out.num_angles, 72, 720, Self::ANGLE_STEP);
        out.num_samples = snap(out.num_samples, 100, 1000, Self::SAMPLE_STEP);
        out.threshold = if out.threshold.is_finite() {
            out.threshold.clamp(0.1, 1.0)
        } else {
            Self::default().threshold
        };
        if let Some(r) = out.max_radius {
            if !(r.is_finite() && r > 0.0) {
                out.max_radius = None;
            }
        }
        out
    }

    /// Effective scan center for an image.
    pub fn center_for(&self, img: &RgbaImage) -> [f64; 2] {
        self.center.unwrap_or_else(|| {
            let (w, h) = img.dimensions();
            [w as f64 / 2.0, h as f64 / 2.0]
        })
    }

    /// Effective maximum ray radius for an image.
    pub fn max_radius_for(&self, img: &RgbaImage) -> f64 {
        self.max_radius.unwrap_or_else(|| {
            let (w, h) = img.dimensions();
            0.9 * (w.min(h) as f64 / 2.0)
        })
    }
}

fn snap(v: u32, min: u32, max: u32, step: u32) -> u32 {
    let v = v.clamp(min, max);
    let offset = v - min;
    min + (offset + step / 2) / step * step
}

/// Scan result: grouped rings plus the raw hit lists behind them.
///
/// The hit lists exist for editor overlays and diagnostics; all downstream
/// stages consume only the ring map.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ScanOutput {
    /// Grouped per-angle ring detections.
    pub ring_map: RingMap,
    /// Raw threshold hits per angle, in sample order.
    pub hits: BTreeMap<u16, Vec<RingHit>>,
}

/// Sweep scan rays over the image and group threshold hits into rings.
///
/// Cannot fail structurally: a degenerate image yields an empty [`RingMap`],
/// which downstream stages treat as "no data".
pub fn scan_with_hits(img: &RgbaImage, config: &ScanConfig) -> ScanOutput {
    let config = config.normalized();
    let [cx, cy] = config.center_for(img);
    let max_radius = config.max_radius_for(img);
    let num_angles = config.num_angles as usize;
    let num_samples = config.num_samples as usize;

    let mut out = ScanOutput::default();

    for angle_index in 0..num_angles {
        let angle = angle_index as f64 * 2.0 * PI / num_angles as f64;
        let angle_deg = (angle_index * 360 / num_angles) as u16;
        let (sin_a, cos_a) = angle.sin_cos();

        let mut hits: Vec<RingHit> = Vec::new();
        for sample_index in 0..num_samples {
            let radius = sample_index as f64 * max_radius / num_samples as f64;
            let x = cx + radius * cos_a;
            let y = cy + radius * sin_a;
            let intensity = intensity_at(img, config.predicate, x, y);
            if intensity > config.threshold {
                hits.push(RingHit {
                    sample_index,
                    radius,
                    px: [x.round() as i32, y.round() as i32],
                });
            }
        }

        let rings = group_consecutive_hits(&hits, cx, cy, cos_a, sin_a);
        out.ring_map.insert(angle_deg, rings);
        if !hits.is_empty() {
            out.hits.insert(angle_deg, hits);
        }
    }

    out
}

/// Scan and return only the grouped ring map.
pub fn scan(img: &RgbaImage, config: &ScanConfig) -> RingMap {
    scan_with_hits(img, config).ring_map
}

/// Merge maximal runs of consecutive sample indices into rings.
fn group_consecutive_hits(hits: &[RingHit], cx: f64, cy: f64, cos_a: f64, sin_a: f64) -> Vec<Ring> {
    let mut rings = Vec::new();
    let mut group: Vec<f64> = Vec::new();
    let mut prev_index: Option<usize> = None;

    let flush = |group: &mut Vec<f64>, rings: &mut Vec<Ring>| {
        if group.is_empty() {
            return;
        }
        let radius = group.iter().sum::<f64>() / group.len() as f64;
        rings.push(Ring {
            radius,
            x: cx + radius * cos_a,
            y: cy + radius * sin_a,
        });
        group.clear();
    };

    for hit in hits {
        if let Some(prev) = prev_index {
            if hit.sample_index != prev + 1 {
                flush(&mut group, &mut rings);
            }
        }
        group.push(hit.radius);
        prev_index = Some(hit.sample_index);
    }
    flush(&mut group, &mut rings);

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_placido_image;

    #[test]
    fn config_normalization_clamps_and_snaps() {
        let cfg = ScanConfig {
            num_angles: 1000,
            num_samples: 7,
            threshold: 3.0,
            ..ScanConfig::default()
        }
        .normalized();
        assert_eq!(cfg.num_angles, 720);
        assert_eq!(cfg.num_samples, 100);
        assert!((cfg.threshold - 1.0).abs() < 1e-12);

        let cfg = ScanConfig {
            num_angles: 100,
            num_samples: 460,
            threshold: 0.01,
            max_radius: Some(f64::NAN),
            ..ScanConfig::default()
        }
        .normalized();
        assert_eq!(cfg.num_angles, 108, "snapped to the nearest 36-step");
        assert_eq!(cfg.num_samples, 450, "snapped to the nearest 50-step");
        assert!((cfg.threshold - 0.1).abs() < 1e-12);
        assert!(cfg.max_radius.is_none());
    }

    #[test]
    fn empty_image_yields_empty_map() {
        let img = RgbaImage::new(64, 64);
        let map = scan(&img, &ScanConfig::default());
        assert!(map.is_empty());
        assert_eq!(map.total_rings(), 0);
    }

    #[test]
    fn recovers_known_ring_count_per_angle() {
        let radii = [30.0, 60.0, 90.0];
        let img = draw_placido_image(300, 300, [150.0, 150.0], &radii, 2.0);
        let map = scan(&img, &ScanConfig::default());

        assert_eq!(map.angle_count(), 360);
        let max_radius = 0.9 * 150.0;
        let tol = max_radius / 500.0; // one sample-radius
        for (angle, rings) in map.iter() {
            assert_eq!(rings.len(), radii.len(), "angle {angle} ring count");
            for (ring, &expected) in rings.iter().zip(radii.iter()) {
                assert!(
                    (ring.radius - expected).abs() <= tol + 2.0,
                    "angle {angle}: radius {:.2} vs expected {expected:.2}",
                    ring.radius
                );
            }
        }
    }

    #[test]
    fn rings_are_ordered_by_increasing_radius() {
        let img = draw_placido_image(300, 300, [150.0, 150.0], &[25.0, 70.0, 110.0], 2.5);
        let map = scan(&img, &ScanConfig::default());
        for (_, rings) in map.iter() {
            for pair in rings.windows(2) {
                assert!(pair[0].radius < pair[1].radius);
            }
        }
    }

    #[test]
    fn ring_position_is_reprojected_from_mean_radius() {
        let img = draw_placido_image(200, 200, [100.0, 100.0], &[40.0], 3.0);
        let map = scan(&img, &ScanConfig::default());
        let rings = map.rings_at(0).expect("ray at 0 degrees crosses the ring");
        let ring = rings[0];
        // 0-degree ray: y stays at the center row, x = cx + radius.
        assert!((ring.y - 100.0).abs() < 1e-9);
        assert!((ring.x - (100.0 + ring.radius)).abs() < 1e-9);
    }

    #[test]
    fn scan_is_deterministic() {
        let img = draw_placido_image(240, 240, [120.0, 120.0], &[30.0, 55.0, 80.0], 2.0);
        let cfg = ScanConfig::default();
        let a = scan_with_hits(&img, &cfg);
        let b = scan_with_hits(&img, &cfg);
        assert_eq!(a.ring_map, b.ring_map);
        assert_eq!(a.hits, b.hits);
    }

    #[test]
    fn off_center_scan_respects_configured_center() {
        let img = draw_placido_image(300, 300, [180.0, 140.0], &[50.0], 2.5);
        let cfg = ScanConfig {
            center: Some([180.0, 140.0]),
            ..ScanConfig::default()
        };
        let map = scan(&img, &cfg);
        assert!(!map.is_empty());
        for (_, rings) in map.iter() {
            for ring in rings {
                assert!((ring.radius - 50.0).abs() < 4.0);
            }
        }
    }
}
