//! Persistence Landscapes: Functional Summaries of Persistence Diagrams
//!
//! Each pair (b, d) defines a tent function
//!
//!   f_(b,d)(t) = min(t - b, d - t)  for b ≤ t ≤ d, 0 otherwise
//!
//! and the k-th landscape λₖ(t) is the k-th largest tent value at t.
//! Sampled on a uniform grid, this is a (levels × n_points) matrix whose
//! columns are sorted in descending order.

use ndarray::{s, Array2, ArrayView1, ArrayView2};

use crate::error::{Result, TdaError};
use crate::topology::PersistenceDiagram;

/// Sampled persistence landscape
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceLandscape {
    /// Row k holds λ_{k+1} sampled on the grid
    values: Array2<f64>,
    /// Left end of the sampling grid
    pub t_min: f64,
    /// Right end of the sampling grid
    pub t_max: f64,
}

impl PersistenceLandscape {
    /// All-zero landscape of shape (1, n_points) on [0, 0]
    pub fn zeros(n_points: usize) -> Self {
        Self {
            values: Array2::zeros((1, n_points)),
            t_min: 0.0,
            t_max: 0.0,
        }
    }

    /// Sample the landscape of `pd` at `n_points` evenly spaced values.
    ///
    /// Bounds default to the smallest / largest finite value in the diagram.
    /// When the upper bound is derived, essential classes are clamped to it.
    /// A derived bound that falls on the wrong side of a fixed one collapses
    /// onto it. Empty and degenerate diagrams give [`Self::zeros`].
    pub fn from_diagram(
        pd: &PersistenceDiagram,
        n_points: usize,
        t_min: Option<f64>,
        t_max: Option<f64>,
    ) -> Result<Self> {
        if n_points == 0 {
            return Err(TdaError::invalid("landscape resolution must be at least 1"));
        }
        if pd.is_empty() || pd.is_degenerate() {
            return Ok(Self::zeros(n_points));
        }

        let finite = || {
            pd.intervals.iter()
                .flat_map(|i| [i.birth, i.death])
                .filter(|v| v.is_finite())
        };

        let derived_min = finite().fold(f64::INFINITY, f64::min);
        let derived_max = finite().fold(f64::NEG_INFINITY, f64::max);

        let (start, end, clamp_essential) = match (t_min, t_max) {
            (Some(lo), Some(hi)) => (lo, hi, false),
            (Some(lo), None) => (lo, derived_max.max(lo), true),
            (None, Some(hi)) => (derived_min.min(hi), hi, false),
            (None, None) => (derived_min, derived_max, true),
        };

        if !(start <= end) {
            return Err(TdaError::invalid(format!(
                "landscape bounds must satisfy t_min <= t_max, got [{}, {}]", start, end
            )));
        }

        let pairs: Vec<(f64, f64)> = pd.intervals.iter()
            .map(|i| {
                let death = if clamp_essential && i.is_essential() { end } else { i.death };
                (i.birth, death)
            })
            .collect();

        let dt = if n_points > 1 { (end - start) / (n_points - 1) as f64 } else { 0.0 };

        let mut values = Array2::<f64>::zeros((pairs.len(), n_points));
        for j in 0..n_points {
            let t = start + j as f64 * dt;

            let mut column: Vec<f64> = pairs.iter()
                .map(|&(birth, death)| tent_function(t, birth, death))
                .collect();

            // Sort descending so row k is the k-th largest value
            column.sort_by(|a, b| b.total_cmp(a));

            for (k, v) in column.into_iter().enumerate() {
                values[[k, j]] = v;
            }
        }

        Ok(Self { values, t_min: start, t_max: end })
    }

    /// Build directly from a sampled matrix (rows must already be ordered)
    pub fn from_values(values: Array2<f64>, t_min: f64, t_max: f64) -> Self {
        Self { values, t_min, t_max }
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Number of landscape functions
    pub fn levels(&self) -> usize {
        self.values.nrows()
    }

    /// Grid resolution
    pub fn n_points(&self) -> usize {
        self.values.ncols()
    }

    /// λ_{k+1} as a sampled vector
    pub fn level(&self, k: usize) -> ArrayView1<'_, f64> {
        self.values.row(k)
    }

    /// Copy with zero rows appended up to `levels` rows
    pub fn padded(&self, levels: usize) -> Array2<f64> {
        if levels <= self.levels() {
            return self.values.clone();
        }
        let mut out = Array2::<f64>::zeros((levels, self.n_points()));
        out.slice_mut(s![..self.levels(), ..]).assign(&self.values);
        out
    }
}

/// Tent function for a persistence interval
fn tent_function(t: f64, birth: f64, death: f64) -> f64 {
    if t < birth || t > death {
        0.0
    } else {
        (t - birth).min(death - t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_landscape_single() {
        let pd = PersistenceDiagram::from_pairs(1, &[(0.0, 2.0)]);
        let landscape = PersistenceLandscape::from_diagram(&pd, 101, None, None).unwrap();

        // Maximum should be at midpoint with value 1.0
        let max_val = landscape.level(0).iter().copied().fold(0.0, f64::max);
        assert!((max_val - 1.0).abs() < 1e-12);
        assert_eq!((landscape.t_min, landscape.t_max), (0.0, 2.0));
    }

    #[test]
    fn test_columns_sorted_descending() {
        let pd = PersistenceDiagram::from_pairs(1, &[
            (0.0, 3.0),
            (0.5, 1.5),
            (1.0, 4.0),
            (2.5, 2.75),
            (0.2, f64::INFINITY),
        ]);
        let landscape = PersistenceLandscape::from_diagram(&pd, 100, None, None).unwrap();
        let values = landscape.values();

        assert_eq!(values.dim(), (5, 100));
        for k in 0..values.nrows() - 1 {
            for j in 0..values.ncols() {
                assert!(values[[k, j]] >= values[[k + 1, j]]);
                assert!(values[[k + 1, j]] >= 0.0);
            }
        }
    }

    #[test]
    fn test_essential_clamped_to_max_finite() {
        let pd = PersistenceDiagram::from_pairs(0, &[(0.0, 1.0), (0.0, f64::INFINITY)]);
        let landscape = PersistenceLandscape::from_diagram(&pd, 3, None, None).unwrap();

        // Grid is [0, 0.5, 1]; both pairs become (0, 1)
        assert_eq!(landscape.t_max, 1.0);
        assert_eq!(landscape.values(), array![[0.0, 0.5, 0.0], [0.0, 0.5, 0.0]].view());
    }

    #[test]
    fn test_fixed_bounds() {
        let pd = PersistenceDiagram::from_pairs(1, &[(1.0, 3.0)]);
        let landscape = PersistenceLandscape::from_diagram(&pd, 5, Some(0.0), Some(4.0)).unwrap();
        assert_eq!(landscape.level(0), array![0.0, 0.0, 1.0, 0.0, 0.0].view());

        assert!(PersistenceLandscape::from_diagram(&pd, 5, Some(4.0), Some(0.0)).is_err());
    }

    #[test]
    fn test_empty_and_degenerate() {
        let empty = PersistenceDiagram::new(1);
        let landscape = PersistenceLandscape::from_diagram(&empty, 100, None, None).unwrap();
        assert_eq!(landscape, PersistenceLandscape::zeros(100));

        let degenerate = PersistenceDiagram::from_pairs(1, &[(0.0, 0.0)]);
        let landscape = PersistenceLandscape::from_diagram(&degenerate, 100, None, None).unwrap();
        assert_eq!(landscape.values().dim(), (1, 100));
        assert!(landscape.values().iter().all(|&v| v == 0.0));
        assert_eq!((landscape.t_min, landscape.t_max), (0.0, 0.0));
    }

    #[test]
    fn test_one_fixed_bound_never_inverts() {
        let degenerate = PersistenceDiagram::from_pairs(1, &[(0.0, 0.0)]);
        let landscape = PersistenceLandscape::from_diagram(&degenerate, 10, Some(0.5), None).unwrap();
        assert_eq!(landscape, PersistenceLandscape::zeros(10));

        // Everything dies before the fixed lower bound
        let early = PersistenceDiagram::from_pairs(1, &[(0.1, 0.3)]);
        let landscape = PersistenceLandscape::from_diagram(&early, 10, Some(0.5), None).unwrap();
        assert_eq!((landscape.t_min, landscape.t_max), (0.5, 0.5));
        assert!(landscape.values().iter().all(|&v| v == 0.0));

        // Everything is born after the fixed upper bound
        let late = PersistenceDiagram::from_pairs(1, &[(2.0, 3.0)]);
        let landscape = PersistenceLandscape::from_diagram(&late, 10, None, Some(1.0)).unwrap();
        assert_eq!((landscape.t_min, landscape.t_max), (1.0, 1.0));
        assert!(landscape.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let pd = PersistenceDiagram::from_pairs(1, &[(0.0, 1.0)]);
        assert!(matches!(
            PersistenceLandscape::from_diagram(&pd, 0, None, None),
            Err(TdaError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_padded() {
        let landscape = PersistenceLandscape::from_values(array![[1.0, 2.0]], 0.0, 1.0);
        assert_eq!(landscape.padded(3), array![[1.0, 2.0], [0.0, 0.0], [0.0, 0.0]]);
        assert_eq!(landscape.padded(1), array![[1.0, 2.0]]);
    }
}
