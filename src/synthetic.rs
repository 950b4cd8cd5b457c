//! Noisy Shape Generators
//!
//! Point clouds with known topology for exercising the pipeline: an
//! ellipse (one persistent loop) and a "bent" circle whose lower arc is
//! pushed up by a cos² term, with isotropic Gaussian noise added to every
//! coordinate.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use crate::error::{Result, TdaError};

fn noise(sigma: f64) -> Result<Normal<f64>> {
    if !(sigma >= 0.0 && sigma.is_finite()) {
        return Err(TdaError::invalid(format!(
            "noise level must be finite and non-negative, got {}", sigma
        )));
    }
    Normal::new(0.0, sigma)
        .map_err(|e| TdaError::invalid(format!("noise level {}: {}", sigma, e)))
}

/// n points on x = r1 cos t + cx, y = r2 sin t + cy for t evenly spaced in
/// [0, 2π], plus N(0, σ²) noise
pub fn fuzzy_ellipse<R: Rng + ?Sized>(
    n: usize,
    r1: f64,
    r2: f64,
    center: (f64, f64),
    sigma: f64,
    rng: &mut R,
) -> Result<Array2<f64>> {
    fuzzy_bent_circle(n, r1, r2, center, 0.0, sigma, rng)
}

/// Like [`fuzzy_ellipse`] with `a cos² t` added to the y coordinate
pub fn fuzzy_bent_circle<R: Rng + ?Sized>(
    n: usize,
    r1: f64,
    r2: f64,
    center: (f64, f64),
    a: f64,
    sigma: f64,
    rng: &mut R,
) -> Result<Array2<f64>> {
    let normal = noise(sigma)?;
    let step = if n > 1 { 2.0 * PI / (n - 1) as f64 } else { 0.0 };

    let mut points = Array2::<f64>::zeros((n, 2));
    for i in 0..n {
        let t = i as f64 * step;
        points[[i, 0]] = r1 * t.cos() + center.0 + normal.sample(rng);
        points[[i, 1]] = r2 * t.sin() + a * t.cos().powi(2) + center.1 + normal.sample(rng);
    }

    Ok(points)
}

/// n samples of d-dimensional N(0, σ²) noise
pub fn gaussian_cloud<R: Rng + ?Sized>(n: usize, d: usize, sigma: f64, rng: &mut R) -> Result<Array2<f64>> {
    let normal = noise(sigma)?;
    Ok(Array2::from_shape_fn((n, d), |_| normal.sample(rng)))
}
