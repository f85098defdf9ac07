//! placido — pure-Rust computational core for Placido-disc corneal topography.
//!
//! Given a photograph of concentric bright rings reflected off the cornea,
//! the pipeline stages are:
//!
//! 1. **Scan** – radial ray sweep with sub-pixel bilinear sampling; consecutive
//!    threshold hits are grouped into per-angle rings.
//! 2. **Quality** – density/coverage score of the detected ring map.
//! 3. **Heights** – ring radii converted into a synthetic per-angle height
//!    series (ring-spacing heuristic, not a calibrated measurement).
//! 4. **Fit** – weighted Zernike polynomial sum fitted to the height field via
//!    normal equations.
//! 5. **Heatmap** – fitted surface re-evaluated per pixel and rendered through
//!    a pseudocolor ramp with a boundary circle overlay.
//!
//! # Public API
//! - [`Analyzer`] and [`AnalysisConfig`] as the primary entry points
//! - [`ScanConfig`] / [`RingPredicate`] for scan tuning
//! - [`RingMapEditor`] for the out-of-band point-editing contract
//!
//! Every stage is a deterministic pure function over immutable input; the
//! crate holds no cross-call state and leaves threading policy to the caller.

mod analyzer;
mod editor;
mod fit;
mod heatmap;
mod heights;
mod quality;
mod sampler;
mod scan;
#[cfg(test)]
mod test_utils;
mod zernike;

pub use analyzer::{AnalysisConfig, AnalysisResult, Analyzer};
pub use editor::RingMapEditor;
pub use fit::{fit_zernike, FitResult};
pub use heatmap::{render_heatmap, Background, HeatmapConfig};
pub use heights::{map_heights, HeightField, HeightSample, PolarHeights};
pub use quality::{quality_breakdown, quality_score, QualityBreakdown};
pub use sampler::{intensity_at, RingPredicate};
pub use scan::{scan, scan_with_hits, Ring, RingHit, RingMap, ScanConfig, ScanOutput};
pub use zernike::{mode_set, ZernikeMode};
