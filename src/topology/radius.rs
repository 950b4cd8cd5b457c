//! Scale heuristics for choosing the Rips cutoff.
//!
//! For standardized features, a point is roughly a vector of d independent
//! N(0, 1) components. Its norm follows a chi distribution with mean
//!
//!   E‖x‖ = √2 Γ((d+1)/2) / Γ(d/2)
//!
//! and the distance between two such points is on the order of twice that.

use statrs::function::gamma::ln_gamma;

use crate::error::{Result, TdaError};

/// Expected norm of a `dof`-dimensional standard normal vector
pub fn mean_chi(dof: usize) -> Result<f64> {
    if dof == 0 {
        return Err(TdaError::invalid("chi distribution needs at least one degree of freedom"));
    }
    let k = dof as f64;
    Ok((ln_gamma((k + 1.0) / 2.0) - ln_gamma(k / 2.0)).exp() * 2.0_f64.sqrt())
}

/// Scale of the distance between two standard normal vectors
pub fn mean_dist(dof: usize) -> Result<f64> {
    Ok(2.0 * mean_chi(dof)?)
}

/// Rips cutoff suggestion for standardized `n_features`-dimensional data:
/// `fraction` of the typical pairwise distance.
pub fn suggested_max_radius(n_features: usize, fraction: f64) -> Result<f64> {
    if !(fraction > 0.0) {
        return Err(TdaError::invalid(format!("fraction must be positive, got {}", fraction)));
    }
    Ok(fraction * mean_dist(n_features)?)
}
