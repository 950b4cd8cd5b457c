//! Vietoris-Rips Filtration Construction
//!
//! The Vietoris-Rips complex VR_ε(X) is a simplicial complex where:
//! - 0-simplices are the points in X
//! - A k-simplex [v₀, ..., vₖ] exists iff d(vᵢ, vⱼ) ≤ ε for all i,j
//!
//! Every simplex enters the filtration at its radius, the largest pairwise
//! distance among its vertices. Simplices are enumerated by clique
//! expansion of the ε-neighbourhood graph, up to a fixed dimension.
//!
//! To compute Hₖ the complex must contain (k+1)-simplices; otherwise every
//! k-cycle would be reported as an essential class.

use ndarray::{Array2, ArrayView2};

use super::simplex::Simplex;
use crate::error::{Result, TdaError};

/// Vietoris-Rips filtration builder
#[derive(Debug, Clone)]
pub struct VietorisRips {
    /// Distance matrix (precomputed)
    distances: Array2<f64>,
    /// Maximum edge length
    max_radius: f64,
    /// Highest simplex dimension to build
    max_simplex_dim: usize,
}

/// A simplex together with the filtration value at which it appears
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSimplex {
    pub simplex: Simplex,
    pub value: f64,
}

impl FilteredSimplex {
    pub fn dimension(&self) -> usize {
        self.simplex.vertices().len().saturating_sub(1)
    }
}

/// Simplices sorted by (value, dimension, vertices); faces always precede cofaces
#[derive(Debug, Clone, Default)]
pub struct Filtration {
    simplices: Vec<FilteredSimplex>,
}

impl Filtration {
    pub fn len(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    pub fn simplices(&self) -> &[FilteredSimplex] {
        &self.simplices
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilteredSimplex> {
        self.simplices.iter()
    }

    /// Number of simplices of dimension `d`
    pub fn count_dim(&self, d: usize) -> usize {
        self.simplices.iter().filter(|s| s.dimension() == d).count()
    }

    /// Largest simplex dimension present
    pub fn max_dimension(&self) -> Option<usize> {
        self.simplices.iter().map(|s| s.dimension()).max()
    }
}

impl VietorisRips {
    /// Create from a precomputed distance matrix.
    ///
    /// `homology_dim` is the dimension of interest; simplices are built up
    /// to `homology_dim + 1`.
    pub fn from_distance_matrix(
        distances: Array2<f64>,
        max_radius: f64,
        homology_dim: usize,
    ) -> Result<Self> {
        if !(max_radius > 0.0) {
            return Err(TdaError::invalid(format!(
                "max radius must be positive, got {}", max_radius
            )));
        }
        if distances.nrows() != distances.ncols() {
            return Err(TdaError::invalid(format!(
                "distance matrix must be square, got {:?}", distances.dim()
            )));
        }
        Ok(Self {
            distances,
            max_radius,
            max_simplex_dim: homology_dim + 1,
        })
    }

    /// Create from point cloud (rows are points, computes distance matrix)
    pub fn from_points(points: ArrayView2<f64>, max_radius: f64, homology_dim: usize) -> Result<Self> {
        Self::from_distance_matrix(distance_matrix(points), max_radius, homology_dim)
    }

    /// Number of points
    pub fn n_points(&self) -> usize {
        self.distances.nrows()
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn max_simplex_dim(&self) -> usize {
        self.max_simplex_dim
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[[i, j]]
    }

    /// Build the full filtration up to `homology_dim + 1`
    pub fn filtration(&self) -> Filtration {
        let n = self.n_points();

        // Upper neighbourhoods: j > i with d(i, j) ≤ ε
        let upper: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (i + 1..n)
                    .filter(|&j| self.distances[[i, j]] <= self.max_radius)
                    .collect()
            })
            .collect();

        let mut simplices = Vec::new();
        for v in 0..n {
            self.expand(vec![v], 0.0, &upper[v], &upper, &mut simplices);
        }

        simplices.sort_by(|a, b| {
            a.value.total_cmp(&b.value)
                .then(a.dimension().cmp(&b.dimension()))
                .then_with(|| a.simplex.cmp(&b.simplex))
        });

        Filtration { simplices }
    }

    /// Incremental clique expansion: emit `clique`, then extend it by each
    /// common upper neighbour.
    fn expand(
        &self,
        clique: Vec<usize>,
        value: f64,
        candidates: &[usize],
        upper: &[Vec<usize>],
        out: &mut Vec<FilteredSimplex>,
    ) {
        let dim = clique.len() - 1;
        if dim < self.max_simplex_dim {
            for (pos, &v) in candidates.iter().enumerate() {
                let new_value = clique.iter()
                    .map(|&u| self.distances[[u, v]])
                    .fold(value, f64::max);

                // Remaining candidates must also neighbour v; both lists are sorted
                let next: Vec<usize> = candidates[pos + 1..].iter()
                    .copied()
                    .filter(|w| upper[v].binary_search(w).is_ok())
                    .collect();

                let mut coface = clique.clone();
                coface.push(v);
                self.expand(coface, new_value, &next, upper, out);
            }
        }

        out.push(FilteredSimplex {
            simplex: Simplex::from_sorted(clique),
            value,
        });
    }
}

/// Compute Euclidean distance matrix between the rows of `points`
pub fn distance_matrix(points: ArrayView2<f64>) -> Array2<f64> {
    let n = points.nrows();
    let dim = points.ncols();

    let mut dm = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in i+1..n {
            let mut dist_sq = 0.0;
            for d in 0..dim {
                let diff = points[[i, d]] - points[[j, d]];
                dist_sq += diff * diff;
            }
            let dist = dist_sq.sqrt();
            dm[[i, j]] = dist;
            dm[[j, i]] = dist;
        }
    }

    dm
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_triangle() {
        // Equilateral triangle with side 1
        let points = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.5, 0.866]
        ];

        let vr = VietorisRips::from_points(points.view(), 2.0, 1).unwrap();
        let filtration = vr.filtration();

        assert_eq!(filtration.count_dim(0), 3);
        assert_eq!(filtration.count_dim(1), 3);
        assert_eq!(filtration.count_dim(2), 1);
        assert_eq!(filtration.max_dimension(), Some(2));
    }

    #[test]
    fn test_radius_cutoff() {
        let points = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [5.0, 0.0]
        ];

        let vr = VietorisRips::from_points(points.view(), 1.5, 1).unwrap();
        let filtration = vr.filtration();

        // Only the edge [0, 1] survives the cutoff, so no triangle
        assert_eq!(filtration.count_dim(1), 1);
        assert_eq!(filtration.count_dim(2), 0);
    }

    #[test]
    fn test_dimension_cap() {
        // Four mutually close points form a tetrahedron, but H0 only needs edges
        let points = array![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0]
        ];

        let h0 = VietorisRips::from_points(points.view(), 3.0, 0).unwrap().filtration();
        assert_eq!(h0.max_dimension(), Some(1));

        let h2 = VietorisRips::from_points(points.view(), 3.0, 2).unwrap().filtration();
        assert_eq!(h2.count_dim(2), 4);
        assert_eq!(h2.count_dim(3), 1);
    }

    #[test]
    fn test_faces_precede_cofaces() {
        let s2 = 2.0_f64.sqrt();
        let points = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0]
        ];

        let filtration = VietorisRips::from_points(points.view(), 2.0, 1).unwrap().filtration();
        let simplices = filtration.simplices();

        for (idx, s) in simplices.iter().enumerate() {
            for face in s.simplex.boundary_faces() {
                let face_idx = simplices.iter().position(|f| f.simplex == face).unwrap();
                assert!(face_idx < idx);
            }
        }

        // Triangles enter at the diagonal length
        assert!(simplices.iter()
            .filter(|s| s.dimension() == 2)
            .all(|s| (s.value - s2).abs() < 1e-12));
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let points = array![[0.0, 0.0], [1.0, 0.0]];
        assert!(matches!(
            VietorisRips::from_points(points.view(), 0.0, 1),
            Err(TdaError::InvalidParameter(_))
        ));
        assert!(VietorisRips::from_points(points.view(), f64::NAN, 1).is_err());
    }
}
