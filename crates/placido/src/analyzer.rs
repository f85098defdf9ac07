//! High-level analysis pipeline.
//!
//! This is the glue layer wiring the stages together:
//! scan → quality → heights → fit → heatmap. Algorithmic primitives live in
//! their own modules; this layer owns call order, data flow and stage
//! logging. All entry points are synchronous, re-entrant and free of shared
//! mutable state — threading and cancellation policy belong to the caller,
//! and the cheapest cancellation is to let a pass finish and discard its
//! result.

use image::RgbaImage;

use crate::fit::{fit_zernike, FitResult};
use crate::heatmap::{render_heatmap, Background, HeatmapConfig};
use crate::heights::{map_heights, PolarHeights};
use crate::quality::{quality_breakdown, QualityBreakdown};
use crate::scan::{scan, RingMap, ScanConfig};

/// Parameters for one full analysis run.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ring scan stage parameters.
    pub scan: ScanConfig,
    /// Expected ring spacing for the height heuristic, in pixels; 0–20.
    pub reference_distance: f64,
    /// Maximum Zernike radial order; 6 yields 28 modes.
    pub max_order: u32,
    /// Heatmap output dimensions; source-image size when `None`.
    pub heatmap_size: Option<[u32; 2]>,
    /// Heatmap backdrop.
    pub heatmap_background: Background,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            reference_distance: 5.5,
            max_order: 6,
            heatmap_size: None,
            heatmap_background: Background::White,
        }
    }
}

/// All derived artifacts of one analysis run.
///
/// A re-scan discards and fully recomputes every field; there is no
/// incremental update path.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Per-angle ring detections.
    pub ring_map: RingMap,
    /// Coverage score and read-outs for the ring map.
    pub quality: QualityBreakdown,
    /// Synthetic height series derived from the ring map.
    pub heights: PolarHeights,
    /// Fitted Zernike coefficients; empty when the fit failed.
    pub fit: FitResult,
    /// Rendered surface heatmap.
    pub heatmap: RgbaImage,
}

/// Primary analysis interface.
///
/// Wraps an [`AnalysisConfig`]; create once, analyze many images. Parameters
/// are read per call and never mutated by the pipeline itself.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Analyzer with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with full config control.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Mutable access for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.config
    }

    /// Run the full pipeline over one photograph.
    pub fn analyze(&self, image: &RgbaImage) -> AnalysisResult {
        let (w, h) = image.dimensions();
        tracing::info!(width = w, height = h, "scanning rings");
        let ring_map = scan(image, &self.config.scan);
        tracing::info!(
            rings = ring_map.total_rings(),
            angles = ring_map.angle_count(),
            "ring scan complete"
        );
        self.analyze_ring_map(&ring_map, Some(image), [w, h])
    }

    /// Re-enter the pipeline after the scan stage with an existing ring map.
    ///
    /// This is the entry point for maps produced by an external point editor
    /// (deletions, auto-clean). `source` supplies the heatmap backdrop when
    /// the config asks for one; `source_size` is the coordinate frame the
    /// ring positions live in and is used to derive the heat disk geometry.
    pub fn analyze_ring_map(
        &self,
        ring_map: &RingMap,
        source: Option<&RgbaImage>,
        source_size: [u32; 2],
    ) -> AnalysisResult {
        let quality = quality_breakdown(ring_map);
        tracing::info!(score = quality.score, "quality scored");

        let heights = map_heights(ring_map, self.config.reference_distance);
        if heights.is_empty() {
            tracing::info!("no ring data; skipping fit");
        }

        let fit = if heights.is_empty() {
            FitResult::default()
        } else {
            fit_zernike(&heights.field, self.config.max_order)
        };
        tracing::info!(
            samples = heights.field.len(),
            coefficients = fit.coefficients.len(),
            "zernike fit complete"
        );

        let heatmap_cfg = self.heatmap_config(source_size);
        let heatmap = render_heatmap(&fit, &heatmap_cfg, source);

        AnalysisResult {
            ring_map: ring_map.clone(),
            quality,
            heights,
            fit,
            heatmap,
        }
    }

    /// Heat disk geometry matching the scan geometry for a source frame.
    fn heatmap_config(&self, source_size: [u32; 2]) -> HeatmapConfig {
        let [w, h] = source_size;
        let scan = self.config.scan.normalized();
        let center = scan
            .center
            .unwrap_or([w as f64 / 2.0, h as f64 / 2.0]);
        let radius = scan
            .max_radius
            .unwrap_or(0.9 * (w.min(h) as f64 / 2.0));
        HeatmapConfig {
            center,
            radius,
            output_size: self.config.heatmap_size.unwrap_or(source_size),
            background: self.config.heatmap_background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_image_flows_through_as_no_data() {
        let img = RgbaImage::new(120, 120);
        let result = Analyzer::new().analyze(&img);
        assert!(result.ring_map.is_empty());
        assert_eq!(result.quality.score, 0.0);
        assert!(result.heights.is_empty());
        assert!(result.fit.is_empty());
        // Heatmap still renders: background plus placeholder circle.
        assert_eq!(result.heatmap.dimensions(), (120, 120));
    }

    #[test]
    fn config_mut_tunes_subsequent_runs() {
        let mut analyzer = Analyzer::new();
        analyzer.config_mut().scan.num_angles = 72;
        analyzer.config_mut().max_order = 4;
        assert_eq!(analyzer.config().scan.num_angles, 72);
        assert_eq!(analyzer.config().max_order, 4);
    }

    #[test]
    fn heatmap_size_override_is_respected() {
        let mut analyzer = Analyzer::new();
        analyzer.config_mut().heatmap_size = Some([48, 32]);
        let img = RgbaImage::new(200, 200);
        let result = analyzer.analyze(&img);
        assert_eq!(result.heatmap.dimensions(), (48, 32));
    }
}
