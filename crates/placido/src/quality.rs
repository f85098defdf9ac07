//! Ring-map data quality scoring.

use crate::scan::RingMap;

/// Raw coverage read-outs behind a quality score.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QualityBreakdown {
    /// Total ring detections across all angles.
    pub total_points: usize,
    /// Number of angles with at least one detection.
    pub angle_count: usize,
    /// Integer average rings per detected angle (ties round down).
    pub avg_rings: usize,
    /// Weighted score in [0, 100].
    pub score: f64,
}

/// Score the density and coverage of a ring map on a 0–100 scale.
///
/// Fewer than 20 rings per angle on average is a hard floor: the map is too
/// sparse for any score to be meaningful. Above it, the score blends point
/// density (weight 0.4), angular coverage (0.3) and a ring-count term (0.3)
/// that saturates at 32 average rings and decays back to zero by ~112 to
/// penalize over-detection.
pub fn quality_score(map: &RingMap) -> f64 {
    quality_breakdown(map).score
}

/// Score a ring map and return the read-outs alongside the score.
pub fn quality_breakdown(map: &RingMap) -> QualityBreakdown {
    let total_points = map.total_rings();
    let angle_count = map.angle_count();
    let avg_rings = if angle_count > 0 {
        total_points / angle_count
    } else {
        0
    };

    let score = if avg_rings < 20 {
        0.0
    } else {
        let points_score = (total_points as f64 / 1000.0).min(1.0);
        let angle_score = (angle_count as f64 / 360.0).min(1.0);
        let ring_norm = if avg_rings <= 32 {
            avg_rings as f64 / 32.0
        } else {
            (1.0 - (avg_rings as f64 - 32.0) / 80.0).max(0.0)
        };
        100.0 * (0.4 * points_score + 0.3 * angle_score + 0.3 * ring_norm)
    };

    QualityBreakdown {
        total_points,
        angle_count,
        avg_rings,
        score,
    }
}
