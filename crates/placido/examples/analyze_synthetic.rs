use image::{Rgba, RgbaImage};
use placido::Analyzer;
use std::error::Error;

/// Render a synthetic 20-ring Placido target and run the full pipeline on it.
fn main() -> Result<(), Box<dyn Error>> {
    let size = 400u32;
    let center = size as f64 / 2.0;
    let radii: Vec<f64> = (0..20)
        .map(|i| 20.0 + i as f64 * (180.0 - 20.0) / 19.0)
        .collect();

    let mut img = RgbaImage::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let d = (dx * dx + dy * dy).sqrt();
            let on_ring = radii.iter().any(|&r| (d - r).abs() <= 2.0);
            let pix = if on_ring {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            };
            img.put_pixel(x, y, pix);
        }
    }

    let result = Analyzer::new().analyze(&img);
    println!(
        "Detected {} rings at {} angles (quality {:.0}%).",
        result.quality.total_points, result.quality.angle_count, result.quality.score
    );
    println!("Fitted {} Zernike coefficients.", result.fit.coefficients.len());

    if let Some(out_path) = std::env::args().nth(1) {
        result.heatmap.save(&out_path)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
