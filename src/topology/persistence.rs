//! Persistent Homology via the Standard Algorithm
//!
//! Reduces the boundary matrix of a Vietoris-Rips filtration over Z/2Z
//! and reads off birth/death pairs for one homology dimension.
//!
//! ## Algorithm Overview
//!
//! 1. Take the filtration ordered by (radius, dimension, vertices)
//! 2. Build one sparse boundary column per simplex
//! 3. Reduce left-to-right: while low(j) collides with an earlier pivot,
//!    add that earlier column
//! 4. A non-zero column j with low(j) = i pairs birth simplex i with
//!    death simplex j; a zero column never used as a pivot is essential
//!
//! ## Reference
//!
//! Edelsbrunner, Letscher, Zomorodian (2002). "Topological Persistence
//! and Simplification". Discrete & Computational Geometry.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::simplex::Simplex;
use super::vietoris_rips::{Filtration, VietorisRips};
use crate::error::Result;

/// A persistence interval [birth, death)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistenceInterval {
    pub birth: f64,
    pub death: f64,
}

impl PersistenceInterval {
    pub fn new(birth: f64, death: f64) -> Self {
        Self { birth, death }
    }

    /// Lifetime of the feature
    pub fn persistence(&self) -> f64 {
        self.death - self.birth
    }

    /// Is this an essential feature (infinite persistence)?
    pub fn is_essential(&self) -> bool {
        self.death.is_infinite()
    }
}

/// What to report when no generator exists in the requested dimension.
///
/// `ZeroPair` substitutes a single (0, 0) pair, which makes "no feature"
/// indistinguishable from "a feature born and killed at 0". `Empty` keeps
/// the diagram empty; both produce a zero landscape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    #[default]
    ZeroPair,
    Empty,
}

/// Persistence diagram for a single homology dimension
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceDiagram {
    pub dimension: usize,
    pub intervals: Vec<PersistenceInterval>,
}

impl PersistenceDiagram {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, intervals: Vec::new() }
    }

    pub fn from_pairs(dimension: usize, pairs: &[(f64, f64)]) -> Self {
        Self {
            dimension,
            intervals: pairs.iter().map(|&(b, d)| PersistenceInterval::new(b, d)).collect(),
        }
    }

    pub fn add(&mut self, interval: PersistenceInterval) {
        self.intervals.push(interval);
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// True for the (0, 0) fallback diagram
    pub fn is_degenerate(&self) -> bool {
        self.intervals.len() == 1
            && self.intervals[0].birth == 0.0
            && self.intervals[0].death == 0.0
    }

    /// Apply `policy` when the diagram holds no generator
    pub fn or_degenerate(mut self, policy: DegeneratePolicy) -> Self {
        if self.intervals.is_empty() && policy == DegeneratePolicy::ZeroPair {
            self.intervals.push(PersistenceInterval::new(0.0, 0.0));
        }
        self
    }

    /// Finite intervals only
    pub fn finite_intervals(&self) -> Vec<&PersistenceInterval> {
        self.intervals.iter().filter(|i| !i.is_essential()).collect()
    }

    /// Total persistence of finite intervals
    pub fn total_persistence(&self) -> f64 {
        self.intervals.iter()
            .filter(|i| !i.is_essential())
            .map(|i| i.persistence())
            .sum()
    }

    /// N x 2 array, one (birth, death) row per interval; death may be ∞
    pub fn to_array(&self) -> Array2<f64> {
        let mut arr = Array2::<f64>::zeros((self.intervals.len(), 2));
        for (row, interval) in self.intervals.iter().enumerate() {
            arr[[row, 0]] = interval.birth;
            arr[[row, 1]] = interval.death;
        }
        arr
    }
}

/// Sparse column representation for boundary matrix
#[derive(Debug, Clone)]
struct SparseColumn {
    /// Non-zero row indices (stored in BTreeSet for efficient operations)
    rows: BTreeSet<usize>,
}

impl SparseColumn {
    fn new() -> Self {
        Self { rows: BTreeSet::new() }
    }

    fn is_zero(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the lowest (maximum) non-zero index
    fn low(&self) -> Option<usize> {
        self.rows.iter().next_back().copied()
    }

    /// Flip a single entry - addition in Z/2Z
    fn toggle(&mut self, row: usize) {
        if !self.rows.remove(&row) {
            self.rows.insert(row);
        }
    }

    /// XOR (symmetric difference) with another column - addition in Z/2Z
    fn add_assign(&mut self, other: &SparseColumn) {
        for &row in &other.rows {
            self.toggle(row);
        }
    }
}

/// Compute the persistence diagram of `filtration` in dimension `dim`.
///
/// Zero-length pairs are dropped. The result may be empty; use
/// [`PersistenceDiagram::or_degenerate`] to apply a fallback policy.
pub fn compute_persistence(filtration: &Filtration, dim: usize) -> PersistenceDiagram {
    let simplices = filtration.simplices();
    let m = simplices.len();

    // Build lookup: vertices -> filtration index
    let simplex_index: HashMap<&Simplex, usize> = simplices.iter()
        .enumerate()
        .map(|(idx, s)| (&s.simplex, idx))
        .collect();

    let mut columns: Vec<SparseColumn> = Vec::with_capacity(m);
    let mut low_to_col: HashMap<usize, usize> = HashMap::new();

    for (col_idx, filtered) in simplices.iter().enumerate() {
        let mut boundary = SparseColumn::new();
        for face in filtered.simplex.boundary_faces() {
            if let Some(&face_idx) = simplex_index.get(&face) {
                boundary.toggle(face_idx);
            }
        }

        // Reduce column using previously reduced columns
        while let Some(low_idx) = boundary.low() {
            match low_to_col.get(&low_idx) {
                Some(&pivot_col) => boundary.add_assign(&columns[pivot_col]),
                None => break,
            }
        }

        if let Some(low_idx) = boundary.low() {
            low_to_col.insert(low_idx, col_idx);
        }

        columns.push(boundary);
    }

    let mut diagram = PersistenceDiagram::new(dim);

    for (col_idx, column) in columns.iter().enumerate() {
        if let Some(low_idx) = column.low() {
            let birth = &simplices[low_idx];
            let death = &simplices[col_idx];
            if birth.dimension() == dim && death.value > birth.value {
                diagram.add(PersistenceInterval::new(birth.value, death.value));
            }
        }
    }

    // Essential classes: zero columns that never served as a pivot
    for (idx, filtered) in simplices.iter().enumerate() {
        if filtered.dimension() == dim
            && columns[idx].is_zero()
            && !low_to_col.contains_key(&idx)
        {
            diagram.add(PersistenceInterval::new(filtered.value, f64::INFINITY));
        }
    }

    diagram
}

/// Point cloud → Rips filtration → diagram in dimension `dim`, with the
/// degenerate fallback applied.
pub fn diagram_from_points(
    points: ArrayView2<f64>,
    max_radius: f64,
    dim: usize,
    policy: DegeneratePolicy,
) -> Result<PersistenceDiagram> {
    let filtration = VietorisRips::from_points(points, max_radius, dim)?.filtration();
    Ok(compute_persistence(&filtration, dim).or_degenerate(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn square() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0]
        ]
    }

    #[test]
    fn test_two_points() {
        let points = array![[0.0, 0.0], [1.0, 0.0]];
        let filtration = VietorisRips::from_points(points.view(), 2.0, 0).unwrap().filtration();

        // H0: one interval from 0 to 1 plus one essential component
        let pd = compute_persistence(&filtration, 0);
        let finite = pd.finite_intervals();
        assert_eq!(finite.len(), 1);
        assert!((finite[0].birth - 0.0).abs() < 1e-10);
        assert!((finite[0].death - 1.0).abs() < 1e-10);
        assert_eq!(pd.intervals.iter().filter(|i| i.is_essential()).count(), 1);
    }

    #[test]
    fn test_triangle_has_no_loop() {
        let points = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.5, 0.866]
        ];
        let filtration = VietorisRips::from_points(points.view(), 2.0, 1).unwrap().filtration();
        assert!(compute_persistence(&filtration, 1).is_empty());
    }

    #[test]
    fn test_square_cycle() {
        let s2 = 2.0_f64.sqrt();
        let pd = diagram_from_points(square().view(), 2.0, 1, DegeneratePolicy::ZeroPair).unwrap();

        // H1: one cycle born at 1, dies at sqrt(2)
        assert_eq!(pd.len(), 1);
        assert!((pd.intervals[0].birth - 1.0).abs() < 1e-10);
        assert!((pd.intervals[0].death - s2).abs() < 1e-10);
        assert!(!pd.is_degenerate());
    }

    #[test]
    fn test_loop_survives_below_diagonal() {
        // Cutoff below the diagonal: the loop is never filled
        let pd = diagram_from_points(square().view(), 1.2, 1, DegeneratePolicy::ZeroPair).unwrap();
        assert_eq!(pd.len(), 1);
        assert!(pd.intervals[0].is_essential());
        assert!((pd.intervals[0].birth - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_identical_points_fall_back() {
        let points = Array2::<f64>::from_elem((6, 3), 0.25);

        let pd = diagram_from_points(points.view(), 1.0, 1, DegeneratePolicy::ZeroPair).unwrap();
        assert!(pd.is_degenerate());
        assert_eq!(pd.to_array(), array![[0.0, 0.0]]);

        let empty = diagram_from_points(points.view(), 1.0, 1, DegeneratePolicy::Empty).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let a = diagram_from_points(square().view(), 2.0, 1, DegeneratePolicy::ZeroPair).unwrap();
        let b = diagram_from_points(square().view(), 2.0, 1, DegeneratePolicy::ZeroPair).unwrap();
        assert_eq!(a, b);
    }
}
