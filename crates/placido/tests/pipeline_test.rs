//! End-to-end pipeline acceptance tests over synthetic Placido targets.

use image::{Rgba, RgbaImage};
use placido::{quality_score, scan, AnalysisConfig, Analyzer, RingMapEditor, ScanConfig};

/// White annuli on a black field.
fn draw_placido_image(
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

fn twenty_ring_target() -> RgbaImage {
    let radii: Vec<f64> = (0..20)
        .map(|i| 20.0 + i as f64 * (180.0 - 20.0) / 19.0)
        .collect();
    draw_placido_image(400, 400, [200.0, 200.0], &radii, 2.0)
}

#[test]
fn end_to_end_twenty_ring_acceptance() {
    let img = twenty_ring_target();
    let result = Analyzer::new().analyze(&img);

    assert!(
        result.quality.score >= 50.0,
        "quality {:.1} below acceptance floor",
        result.quality.score
    );
    assert_eq!(
        result.fit.coefficients.len(),
        28,
        "max_order 6 must produce 28 coefficients"
    );
    assert_eq!(result.fit.modes.len(), 28);
    assert!(!result.heights.is_empty());
    assert_eq!(result.heatmap.dimensions(), (400, 400));
}

#[test]
fn scanner_recovers_known_ring_count_at_every_angle() {
    let radii = [40.0, 80.0, 120.0, 160.0];
    let img = draw_placido_image(400, 400, [200.0, 200.0], &radii, 2.0);
    let map = scan(&img, &ScanConfig::default());

    assert_eq!(map.angle_count(), 360);
    for (angle, rings) in map.iter() {
        assert_eq!(rings.len(), radii.len(), "ring count at angle {angle}");
        for (ring, &expected) in rings.iter().zip(radii.iter()) {
            assert!(
                (ring.radius - expected).abs() < 1.5,
                "angle {angle}: {:.2} vs {expected}",
                ring.radius
            );
        }
    }
}

#[test]
fn repeated_analysis_is_bit_identical() {
    let img = twenty_ring_target();
    let analyzer = Analyzer::new();
    let a = analyzer.analyze(&img);
    let b = analyzer.analyze(&img);

    assert_eq!(a.ring_map, b.ring_map);
    assert_eq!(a.fit, b.fit);
    assert_eq!(a.heights, b.heights);
    assert_eq!(a.heatmap.as_raw(), b.heatmap.as_raw());
}

#[test]
fn edited_map_reenters_after_the_scan_stage() {
    let img = twenty_ring_target();
    let analyzer = Analyzer::new();
    let full = analyzer.analyze(&img);
    let score_before = full.quality.score;

    // Brush away everything near one detection, as a point editor would.
    let target = full.ring_map.rings_at(0).unwrap()[0];
    let mut editor = RingMapEditor::new(full.ring_map.clone());
    let removed = editor.delete_within(target.x, target.y, 3.0);
    assert!(removed >= 1);
    let edited = editor.finish();

    let reentered = analyzer.analyze_ring_map(&edited, Some(&img), [400, 400]);
    assert_eq!(
        reentered.ring_map.total_rings(),
        full.ring_map.total_rings() - removed
    );
    assert!(reentered.quality.score <= score_before);
    assert_eq!(reentered.fit.coefficients.len(), 28);
}

#[test]
fn quality_scales_with_angular_coverage() {
    let radii: Vec<f64> = (0..22).map(|i| 15.0 + i as f64 * 7.0).collect();
    let img = draw_placido_image(400, 400, [200.0, 200.0], &radii, 1.8);

    let dense = scan(
        &img,
        &ScanConfig {
            num_angles: 360,
            ..ScanConfig::default()
        },
    );
    let sparse = scan(
        &img,
        &ScanConfig {
            num_angles: 72,
            ..ScanConfig::default()
        },
    );
    assert!(
        quality_score(&dense) > quality_score(&sparse),
        "more angular coverage must not score lower"
    );
}

#[test]
fn custom_parameters_flow_through_the_facade() {
    let img = twenty_ring_target();
    let analyzer = Analyzer::with_config(AnalysisConfig {
        max_order: 4,
        heatmap_size: Some([128, 128]),
        ..AnalysisConfig::default()
    });
    let result = analyzer.analyze(&img);
    assert_eq!(result.fit.coefficients.len(), 15, "order 4 yields 15 modes");
    assert_eq!(result.heatmap.dimensions(), (128, 128));
}
