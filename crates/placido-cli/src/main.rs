//! placido CLI — command-line interface for corneal Placido-ring analysis.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use placido::{
    quality_breakdown, AnalysisConfig, Analyzer, Background, FitResult, PolarHeights,
    QualityBreakdown, RingMap, RingPredicate,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "placido")]
#[command(about = "Reconstruct an approximate corneal surface map from a Placido ring photograph")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline over a photograph.
    Analyze(CliAnalyzeArgs),

    /// Score (and optionally re-fit) a previously exported ring map.
    Quality(CliQualityArgs),
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write analysis results (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Path to write the rendered heatmap (PNG).
    #[arg(long)]
    heatmap: Option<PathBuf>,

    /// Number of scan rays; 72-720 in steps of 36.
    #[arg(long, default_value = "360")]
    num_angles: u32,

    /// Samples per scan ray; 100-1000 in steps of 50.
    #[arg(long, default_value = "500")]
    num_samples: u32,

    /// Intensity threshold for a ring hit; 0.1-1.0.
    #[arg(long, default_value = "0.5")]
    threshold: f64,

    /// Expected ring spacing for the height heuristic, in pixels; 0-20.
    #[arg(long, default_value = "5.5")]
    reference_distance: f64,

    /// Maximum Zernike radial order.
    #[arg(long, default_value = "6")]
    max_order: u32,

    /// Heatmap output size as WxH (default: source image size).
    #[arg(long, value_parser = parse_size)]
    heatmap_size: Option<[u32; 2]>,

    /// Heatmap backdrop.
    #[arg(long, value_enum, default_value_t = BackgroundArg::White)]
    background: BackgroundArg,

    /// Ring-pixel classifier.
    #[arg(long, value_enum, default_value_t = PredicateArg::NearWhite)]
    predicate: PredicateArg,

    /// Scan center override as X,Y in pixels (default: image center).
    #[arg(long, value_parser = parse_point)]
    center: Option<[f64; 2]>,

    /// Maximum scan radius in pixels (default: 0.9 x half the short side).
    #[arg(long)]
    max_radius: Option<f64>,
}

#[derive(Debug, Clone, Args)]
struct CliQualityArgs {
    /// Path to a ring-map JSON exported by a previous run or a point editor.
    #[arg(long)]
    ring_map: PathBuf,

    /// Re-run the height/fit/heatmap stages on the (edited) map.
    #[arg(long)]
    refit: bool,

    /// Source frame width in pixels (required with --refit).
    #[arg(long)]
    width: Option<u32>,

    /// Source frame height in pixels (required with --refit).
    #[arg(long)]
    height: Option<u32>,

    /// Path to write re-fit results (JSON, with --refit).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the re-fit heatmap (PNG, with --refit).
    #[arg(long)]
    heatmap: Option<PathBuf>,

    /// Expected ring spacing for the height heuristic, in pixels.
    #[arg(long, default_value = "5.5")]
    reference_distance: f64,

    /// Maximum Zernike radial order.
    #[arg(long, default_value = "6")]
    max_order: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackgroundArg {
    White,
    Source,
}

impl BackgroundArg {
    fn to_core(self) -> Background {
        match self {
            Self::White => Background::White,
            Self::Source => Background::SourceImage,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PredicateArg {
    /// Near-white ring pixels (current predicate).
    NearWhite,
    /// Legacy red-dominant ring pixels.
    RedDominant,
}

impl PredicateArg {
    fn to_core(self) -> RingPredicate {
        match self {
            Self::NearWhite => RingPredicate::default(),
            Self::RedDominant => RingPredicate::red_dominant(),
        }
    }
}

fn parse_size(s: &str) -> Result<[u32; 2], String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("heatmap size must be non-zero".into());
    }
    Ok([w, h])
}

fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok([x, y])
}

impl CliAnalyzeArgs {
    fn to_config(&self) -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.scan.num_angles = self.num_angles;
        config.scan.num_samples = self.num_samples;
        config.scan.threshold = self.threshold;
        config.scan.center = self.center;
        config.scan.max_radius = self.max_radius;
        config.scan.predicate = self.predicate.to_core();
        config.reference_distance = self.reference_distance;
        config.max_order = self.max_order;
        config.heatmap_size = self.heatmap_size;
        config.heatmap_background = self.background.to_core();
        config
    }
}

/// Serializable artifact bundle written by both subcommands.
#[derive(serde::Serialize)]
struct Report {
    image_size: [u32; 2],
    quality: QualityBreakdown,
    ring_map: RingMap,
    heights: PolarHeights,
    fit: FitResult,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Quality(args) => run_quality(&args),
    }
}

// ── analyze ────────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());
    let img = image::open(&args.image)
        .map_err(|e| -> CliError {
            format!("Failed to open image {}: {}", args.image.display(), e).into()
        })?
        .to_rgba8();
    let (w, h) = img.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let analyzer = Analyzer::with_config(args.to_config());
    let result = analyzer.analyze(&img);

    tracing::info!(
        "Detected {} rings at {} angles (quality {:.0}%)",
        result.quality.total_points,
        result.quality.angle_count,
        result.quality.score,
    );
    if result.fit.is_empty() {
        tracing::warn!("fit produced no coefficients; heatmap shows the boundary only");
    }

    let report = Report {
        image_size: [w, h],
        quality: result.quality,
        ring_map: result.ring_map,
        heights: result.heights,
        fit: result.fit,
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());

    if let Some(path) = &args.heatmap {
        result.heatmap.save(path)?;
        tracing::info!("Heatmap written to {}", path.display());
    }

    Ok(())
}

// ── quality ────────────────────────────────────────────────────────────

fn run_quality(args: &CliQualityArgs) -> CliResult<()> {
    let json = std::fs::read_to_string(&args.ring_map).map_err(|e| -> CliError {
        format!("Failed to read {}: {}", args.ring_map.display(), e).into()
    })?;
    let map: RingMap = serde_json::from_str(&json)?;

    let breakdown = quality_breakdown(&map);
    println!("ring map quality");
    println!("  points:          {}", breakdown.total_points);
    println!("  angles detected: {}", breakdown.angle_count);
    println!("  avg rings:       {}", breakdown.avg_rings);
    println!("  score:           {:.0}%", breakdown.score);

    if !args.refit {
        return Ok(());
    }

    let (w, h) = match (args.width, args.height) {
        (Some(w), Some(h)) => (w, h),
        _ => return Err("--refit requires --width and --height".into()),
    };

    let mut config = AnalysisConfig::default();
    config.reference_distance = args.reference_distance;
    config.max_order = args.max_order;
    let analyzer = Analyzer::with_config(config);
    let result = analyzer.analyze_ring_map(&map, None, [w, h]);

    tracing::info!(
        "Re-fit complete: {} coefficients",
        result.fit.coefficients.len()
    );

    if let Some(out) = &args.out {
        let report = Report {
            image_size: [w, h],
            quality: result.quality,
            ring_map: result.ring_map,
            heights: result.heights,
            fit: result.fit,
        };
        std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("Results written to {}", out.display());
    }
    if let Some(path) = &args.heatmap {
        result.heatmap.save(path)?;
        tracing::info!("Heatmap written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parser_accepts_wxh() {
        assert_eq!(parse_size("256x128").unwrap(), [256, 128]);
        assert_eq!(parse_size("64X64").unwrap(), [64, 64]);
        assert!(parse_size("256").is_err());
        assert!(parse_size("0x10").is_err());
    }

    #[test]
    fn point_parser_accepts_xy() {
        assert_eq!(parse_point("200.5,199").unwrap(), [200.5, 199.0]);
        assert!(parse_point("200").is_err());
    }

    #[test]
    fn cli_parses_analyze_defaults() {
        let cli = Cli::parse_from(["placido", "analyze", "--image", "a.png", "--out", "r.json"]);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.num_angles, 360);
        assert_eq!(args.num_samples, 500);
        assert!((args.threshold - 0.5).abs() < 1e-12);
        assert!((args.reference_distance - 5.5).abs() < 1e-12);
        assert_eq!(args.max_order, 6);
    }
}
