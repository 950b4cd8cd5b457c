//! Landscape Stream: Regime Change in a Synthetic Multivariate Series
//!
//! This binary demonstrates the sliding-window landscape norm on a series
//! whose topology changes halfway through.
//!
//! ## Protocol
//!
//! 1. First half: isotropic Gaussian noise (no persistent loop)
//! 2. Second half: repeated noisy ellipse traversals (one H₁ class per window)
//! 3. Compute the H₁ landscape L² norm per window
//! 4. Compute the L² distance between consecutive windows
//! 5. Compare mean signal before and after the change
//!
//! An optional JSON configuration path may be given as the only argument.

use ndarray::{concatenate, s, Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use tda_landscape_stream::synthetic::{fuzzy_ellipse, gaussian_cloud};
use tda_landscape_stream::{
    streaming_landscape_norms, PNorm, PipelineConfig, Result, StreamingReport,
};

fn build_series(rng: &mut StdRng, half: usize, period: usize) -> Result<Array2<f64>> {
    let noise = gaussian_cloud(half, 2, 0.4, rng)?;

    let mut loops = Vec::new();
    for _ in 0..(half + period - 1) / period {
        loops.push(fuzzy_ellipse(period, 1.0, 0.8, (0.0, 0.0), 0.05, rng)?);
    }
    let loop_views: Vec<_> = loops.iter().map(|l| l.view()).collect();
    let loops = concatenate(Axis(0), &loop_views)?;
    let planar = concatenate(Axis(0), &[noise.view(), loops.slice(s![..half, ..])])?;

    // Third feature: small noise carried through both regimes
    let extra = gaussian_cloud(2 * half, 1, 0.05, rng)?;
    Ok(concatenate(Axis(1), &[planar.view(), extra.view()])?)
}

/// Mean value of windows entirely before / after the change point
fn regime_means(report: &StreamingReport, change_at: usize, width: usize) -> (f64, f64) {
    let mean = |vals: Vec<f64>| {
        if vals.is_empty() { 0.0 } else { vals.iter().sum::<f64>() / vals.len() as f64 }
    };
    let before: Vec<f64> = report.results.iter()
        .filter(|r| r.window_index + width <= change_at)
        .map(|r| r.value)
        .collect();
    let after: Vec<f64> = report.results.iter()
        .filter(|r| r.window_index >= change_at)
        .map(|r| r.value)
        .collect();
    (mean(before), mean(after))
}

fn print_series(report: &StreamingReport, every: usize) {
    let scaled = report.min_max_scaled();
    for (k, (r, s)) in report.results.iter().zip(scaled.iter()).enumerate() {
        if k % every == 0 {
            let bar = "█".repeat((s * 40.0).round() as usize);
            println!("  {:4}  {:8.4}  {}", r.window_index, r.value, bar);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  Landscape Stream: Topological Regime Change Detection");
    println!("═══════════════════════════════════════════════════════════════\n");

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::new(40, 5, PNorm::Finite(2.0))
            .with_homology_dim(1)
            .with_max_radius(1.5)
            .with_resolution(100),
    };

    let half = 300;
    let mut rng = StdRng::seed_from_u64(2026);
    let series = build_series(&mut rng, half, config.window_width)?;

    println!("Series:");
    println!("  {} samples × {} features", series.nrows(), series.ncols());
    println!("  Regime change at sample {}", half);
    println!();
    println!("Parameters:");
    println!("  window = {}, stride = {}", config.window_width, config.stride);
    println!("  H{}, maxrad = {:.2}, p = {}", config.homology_dim, config.max_radius, config.p_norm);
    println!("  workers = {} ({:?})", config.worker_count, config.dispatch);
    println!();

    // Norm per window
    let norms = streaming_landscape_norms(series.view(), &config)?;
    println!("══════════════════════════════════════════════════════════════");
    println!("  Landscape norms");
    println!("══════════════════════════════════════════════════════════════\n");
    print_series(&norms, 4);

    // Distance between consecutive windows
    let delta_config = config.clone().with_delta_mode(true);
    let deltas = streaming_landscape_norms(series.view(), &delta_config)?;
    println!("\n══════════════════════════════════════════════════════════════");
    println!("  Landscape distances to previous window");
    println!("══════════════════════════════════════════════════════════════\n");
    print_series(&deltas, 4);

    let (before, after) = regime_means(&norms, half, config.window_width);
    println!("\n─────────────────────────────────────────────────────────────");
    println!("Results:");
    println!("  Mean norm, noise regime:   {:.4}", before);
    println!("  Mean norm, loop regime:    {:.4}", after);
    println!(
        "  Throughput: {:.1} / {:.1} windows/sec",
        norms.throughput(),
        deltas.throughput()
    );

    if after > before {
        println!("\n  ✓ Loop regime carries the larger H₁ signal");
    } else {
        println!("\n  × No separation between regimes at these parameters");
    }

    let failed = norms.failures.len() + deltas.failures.len();
    if failed > 0 {
        println!("  {} windows failed", failed);
    }

    println!("\n═══════════════════════════════════════════════════════════════");
    println!("  Analysis Complete");
    println!("═══════════════════════════════════════════════════════════════");

    Ok(())
}
