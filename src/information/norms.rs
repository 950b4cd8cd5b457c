//! L^p Norms and Distances of Persistence Landscapes
//!
//! Each landscape level is integrated numerically over its sampling grid:
//!
//!   ‖λₖ‖_p = ( Δ · ∫₀^{n-1} λₖ(⌊x⌋)^p dx )^{1/p},   Δ = (t_max - t_min) / n
//!
//! The sampled level is treated as a step function on the index domain, so
//! the integral is exact. Distances replace λₖ with |λₖ - μₖ| after the
//! shorter landscape is padded with zero levels.
//!
//! Per-level values are then combined into one scalar, the landscape
//! analogue of a Wasserstein p-distance:
//!
//! - p = 1:      Σ vₖ
//! - 1 < p < ∞: (Σ vₖ^p)^{1/p}
//! - p = ∞:      max vₖ

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::landscape::PersistenceLandscape;
use crate::error::{Result, TdaError};

/// Exponent of an L^p norm, 1 ≤ p ≤ ∞
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PNormRepr", into = "PNormRepr")]
pub enum PNorm {
    Finite(f64),
    Infinity,
}

impl PNorm {
    pub fn new(p: f64) -> Result<Self> {
        if p == f64::INFINITY {
            Ok(PNorm::Infinity)
        } else if p >= 1.0 {
            Ok(PNorm::Finite(p))
        } else {
            Err(TdaError::invalid(format!("p must satisfy 1 <= p <= inf, got {}", p)))
        }
    }

    /// Re-check a value that may have been built from a bare variant
    pub fn checked(self) -> Result<Self> {
        PNorm::new(self.value())
    }

    pub fn value(&self) -> f64 {
        match self {
            PNorm::Finite(p) => *p,
            PNorm::Infinity => f64::INFINITY,
        }
    }
}

impl Default for PNorm {
    fn default() -> Self {
        PNorm::Finite(1.0)
    }
}

impl fmt::Display for PNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PNorm::Finite(p) => write!(f, "{}", p),
            PNorm::Infinity => write!(f, "inf"),
        }
    }
}

/// JSON has no infinity literal: accept a number or "inf"
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PNormRepr {
    Number(f64),
    Name(String),
}

impl TryFrom<PNormRepr> for PNorm {
    type Error = TdaError;

    fn try_from(repr: PNormRepr) -> Result<Self> {
        match repr {
            PNormRepr::Number(p) => PNorm::new(p),
            PNormRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "inf" | "infinity" => Ok(PNorm::Infinity),
                other => other.parse::<f64>()
                    .map_err(|_| TdaError::invalid(format!("unrecognised p-norm '{}'", name)))
                    .and_then(PNorm::new),
            },
        }
    }
}

impl From<PNorm> for PNormRepr {
    fn from(p: PNorm) -> Self {
        match p {
            PNorm::Finite(v) => PNormRepr::Number(v),
            PNorm::Infinity => PNormRepr::Name("inf".to_string()),
        }
    }
}

/// ∫₀^{n-1} g(⌊x⌋) dx for a step function sampled at 0..n
fn step_integral(samples: impl Iterator<Item = f64>, n: usize) -> f64 {
    samples.take(n.saturating_sub(1)).sum()
}

/// Reduce the pointwise magnitudes of one level to its L^p value
fn reduce_level(
    magnitudes: impl Iterator<Item = f64>,
    n: usize,
    t_min: f64,
    t_max: f64,
    p: PNorm,
) -> f64 {
    match p {
        PNorm::Infinity => magnitudes.fold(0.0, f64::max),
        PNorm::Finite(p) => {
            let integral = step_integral(magnitudes.map(|m| m.powf(p)), n);
            let scale = (t_max - t_min) / n as f64;
            (integral * scale).powf(1.0 / p)
        }
    }
}

/// L^p norm of level `level` of a sampled landscape on [t_min, t_max]
pub(crate) fn level_norm(values: ArrayView2<f64>, level: usize, t_min: f64, t_max: f64, p: PNorm) -> f64 {
    let row = values.row(level);
    reduce_level(row.iter().map(|&v| v.max(0.0)), row.len(), t_min, t_max, p)
}

/// L^p distance between level `level` of two equally shaped landscapes
pub(crate) fn level_distance(
    a: ArrayView2<f64>,
    b: ArrayView2<f64>,
    level: usize,
    t_min: f64,
    t_max: f64,
    p: PNorm,
) -> f64 {
    let (ra, rb) = (a.row(level), b.row(level));
    let magnitudes = ra.iter().zip(rb.iter()).map(|(&x, &y)| (x.max(0.0) - y.max(0.0)).abs());
    reduce_level(magnitudes, ra.len(), t_min, t_max, p)
}

/// Per-level L^p norms of a landscape
pub fn landscape_lp_norms(landscape: &PersistenceLandscape, p: PNorm) -> Result<Vec<f64>> {
    let p = p.checked()?;
    let values = landscape.values();
    Ok((0..landscape.levels())
        .map(|k| level_norm(values, k, landscape.t_min, landscape.t_max, p))
        .collect())
}

/// Per-level L^p distances between two landscapes.
///
/// The landscape with fewer levels is padded with zero rows; the integration
/// range is the union of both sampling ranges.
pub fn landscape_lp_distances(
    a: &PersistenceLandscape,
    b: &PersistenceLandscape,
    p: PNorm,
) -> Result<Vec<f64>> {
    let p = p.checked()?;
    if a.n_points() != b.n_points() {
        return Err(TdaError::invalid(format!(
            "landscapes must share a resolution, got {} and {}",
            a.n_points(), b.n_points()
        )));
    }

    let levels = a.levels().max(b.levels());
    let (pa, pb) = (a.padded(levels), b.padded(levels));
    let t_min = a.t_min.min(b.t_min);
    let t_max = a.t_max.max(b.t_max);

    Ok((0..levels)
        .map(|k| level_distance(pa.view(), pb.view(), k, t_min, t_max, p))
        .collect())
}

/// Combine per-level values into a single scalar
pub fn landscape_lp_norm(level_values: &[f64], p: PNorm) -> Result<f64> {
    Ok(match p.checked()? {
        PNorm::Infinity => level_values.iter().copied().fold(0.0, f64::max),
        PNorm::Finite(p) if p == 1.0 => level_values.iter().sum(),
        PNorm::Finite(p) => level_values.iter()
            .map(|v| v.powf(p))
            .sum::<f64>()
            .powf(1.0 / p),
    })
}
