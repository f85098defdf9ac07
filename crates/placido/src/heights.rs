//! Polar-to-height mapping: ring radii into a synthetic height series.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::scan::RingMap;

/// One `(radius, height)` pair derived from a ring's position in its
/// angle's sequence.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeightSample {
    /// Ring radius in pixels.
    pub radius: f64,
    /// Synthetic height value.
    pub height: f64,
}

/// Flattened parallel arrays consumed by the polynomial fitter.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeightField {
    /// Sample radii in pixels.
    pub radii: Vec<f64>,
    /// Sample angles in radians.
    pub theta: Vec<f64>,
    /// Synthetic heights.
    pub heights: Vec<f64>,
}

impl HeightField {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    /// True when the field carries no samples.
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }
}

/// Height-mapping output: per-angle samples plus the flattened field.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PolarHeights {
    /// `(radius, height)` samples grouped per angle, radius-ordered.
    pub per_angle: BTreeMap<u16, Vec<HeightSample>>,
    /// The same samples flattened for fitting.
    pub field: HeightField,
}

impl PolarHeights {
    /// True when the source ring map was empty.
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}

/// Convert per-angle ring radii into a synthetic height series.
///
/// Heights are an explicitly heuristic proxy: each ring's height follows a
/// parabola in its sequence index, perturbed by how far the spacing to the
/// previous ring deviates from `reference_distance`. For ring index `i > 0`
/// with spacing `d`:
///
/// ```text
/// j = if d < ref { d - ref } else { ref - d }
/// z = 0.01 * (i + j)^2
/// ```
///
/// `reference_distance` is clamped to [0, 20]. An empty ring map yields an
/// empty result, never an error.
pub fn map_heights(map: &RingMap, reference_distance: f64) -> PolarHeights {
    let reference = if reference_distance.is_finite() {
        reference_distance.clamp(0.0, 20.0)
    } else {
        5.5
    };

    let mut out = PolarHeights::default();

    for (angle_deg, rings) in map.iter() {
        let theta = angle_deg as f64 * PI / 180.0;
        let mut samples = Vec::with_capacity(rings.len());

        for (index, ring) in rings.iter().enumerate() {
            let j = if index == 0 {
                0.0
            } else {
                let d = (ring.radius - rings[index - 1].radius).abs();
                if d < reference {
                    d - reference
                } else {
                    reference - d
                }
            };
            let z = 0.01 * (index as f64 + j).powi(2);

            out.field.radii.push(ring.radius);
            out.field.theta.push(theta);
            out.field.heights.push(z);
            samples.push(HeightSample {
                radius: ring.radius,
                height: z,
            });
        }

        out.per_angle.insert(angle_deg, samples);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{Ring, RingMap};

    fn ring(radius: f64) -> Ring {
        Ring {
            radius,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn empty_map_maps_to_empty_heights() {
        let out = map_heights(&RingMap::default(), 5.5);
        assert!(out.is_empty());
        assert!(out.per_angle.is_empty());
    }

    #[test]
    fn first_ring_height_is_zero() {
        let map = RingMap::from_entries([(0u16, vec![ring(12.0)])]);
        let out = map_heights(&map, 5.5);
        assert_eq!(out.field.heights, vec![0.0]);
    }

    #[test]
    fn spacing_at_reference_gives_pure_index_parabola() {
        // Spacing d == ref hits the `else` branch: j = ref - d = 0.
        let map = RingMap::from_entries([(0u16, vec![ring(10.0), ring(15.5), ring(21.0)])]);
        let out = map_heights(&map, 5.5);
        assert!((out.field.heights[1] - 0.01).abs() < 1e-12);
        assert!((out.field.heights[2] - 0.04).abs() < 1e-12);
    }

    #[test]
    fn tight_spacing_perturbs_downward() {
        // d = 2.0 < ref = 5.5 -> j = -3.5, z = 0.01 * (1 - 3.5)^2
        let map = RingMap::from_entries([(0u16, vec![ring(10.0), ring(12.0)])]);
        let out = map_heights(&map, 5.5);
        assert!((out.field.heights[1] - 0.01 * 2.5f64.powi(2)).abs() < 1e-12);
    }

    #[test]
    fn wide_spacing_perturbs_via_negative_branch() {
        // d = 9.0 >= ref -> j = ref - d = -3.5
        let map = RingMap::from_entries([(0u16, vec![ring(10.0), ring(19.0)])]);
        let out = map_heights(&map, 5.5);
        assert!((out.field.heights[1] - 0.01 * (1.0f64 - 3.5).powi(2)).abs() < 1e-12);
    }

    #[test]
    fn theta_is_angle_degrees_in_radians() {
        let map = RingMap::from_entries([(90u16, vec![ring(10.0)])]);
        let out = map_heights(&map, 5.5);
        assert!((out.field.theta[0] - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn flattened_field_parallels_per_angle_groups() {
        let map = RingMap::from_entries([
            (0u16, vec![ring(10.0), ring(20.0)]),
            (180u16, vec![ring(11.0)]),
        ]);
        let out = map_heights(&map, 5.5);
        assert_eq!(out.field.len(), 3);
        assert_eq!(out.per_angle[&0].len(), 2);
        assert_eq!(out.per_angle[&180].len(), 1);
        assert_eq!(out.field.radii, vec![10.0, 20.0, 11.0]);
    }
}
