//! Abstract Simplices and Basic Simplicial Operations
//!
//! A k-simplex is stored as its k+1 sorted, distinct vertex labels. The
//! combinatorial operations below act on complexes given as lists of
//! simplices (typically their facets):
//!
//! - join:     X * Y = { σ ∪ τ : σ ∈ X, τ ∈ Y }
//! - star:     St(σ) = { τ ∈ X : σ ⊆ τ }
//! - link:     Lk(σ) = { τ \ σ : τ ∈ St(σ) }
//! - deletion: X \ v = { τ ∈ X : v ∉ τ }
//! - Alexander dual over the vertex set V of X:
//!   X* = { V \ σ : σ ⊆ V, σ ∉ X }

use std::collections::BTreeSet;

use crate::error::{Result, TdaError};

/// Largest vertex set [`alexander_dual`] will enumerate subsets of
pub const MAX_DUAL_VERTICES: usize = 24;

/// A simplex represented by its sorted vertex indices
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Simplex {
    vertices: Vec<usize>,
}

impl Simplex {
    /// Build a simplex from arbitrary vertex labels (sorted, duplicates removed)
    pub fn new(vertices: impl IntoIterator<Item = usize>) -> Self {
        let set: BTreeSet<usize> = vertices.into_iter().collect();
        Self { vertices: set.into_iter().collect() }
    }

    pub(crate) fn from_sorted(vertices: Vec<usize>) -> Self {
        debug_assert!(vertices.windows(2).all(|w| w[0] < w[1]));
        Self { vertices }
    }

    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Dimension k of a k-simplex (number of vertices minus one).
    /// The empty simplex has no dimension.
    pub fn dimension(&self) -> Option<usize> {
        self.vertices.len().checked_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains_vertex(&self, v: usize) -> bool {
        self.vertices.binary_search(&v).is_ok()
    }

    /// Is `self` a face of `other`?
    pub fn is_face_of(&self, other: &Simplex) -> bool {
        self.vertices.iter().all(|v| other.contains_vertex(*v))
    }

    /// Codimension-one faces [v0, ..., v̂i, ..., vk]
    pub fn boundary_faces(&self) -> Vec<Simplex> {
        if self.vertices.len() < 2 {
            return Vec::new();
        }
        (0..self.vertices.len())
            .map(|i| {
                let mut face = self.vertices.clone();
                face.remove(i);
                Simplex { vertices: face }
            })
            .collect()
    }

    fn union(&self, other: &Simplex) -> Simplex {
        Simplex::new(self.vertices.iter().chain(other.vertices.iter()).copied())
    }

    fn difference(&self, other: &Simplex) -> Simplex {
        Simplex {
            vertices: self.vertices.iter()
                .copied()
                .filter(|v| !other.contains_vertex(*v))
                .collect(),
        }
    }
}

/// Join of two complexes. Applied to facets it returns the facets of the join.
pub fn join(xs: &[Simplex], ys: &[Simplex]) -> Vec<Simplex> {
    let joined: BTreeSet<Simplex> = xs.iter()
        .flat_map(|sigma| ys.iter().map(move |tau| sigma.union(tau)))
        .collect();
    joined.into_iter().collect()
}

/// All simplices of `xs` containing `sigma`
pub fn star(sigma: &Simplex, xs: &[Simplex]) -> Vec<Simplex> {
    xs.iter().filter(|tau| sigma.is_face_of(tau)).cloned().collect()
}

/// Link of `sigma`: the star with `sigma` removed from every simplex.
/// `sigma` itself contributes the empty simplex, which is dropped.
pub fn link(sigma: &Simplex, xs: &[Simplex]) -> Vec<Simplex> {
    xs.iter()
        .filter(|tau| sigma.is_face_of(tau))
        .map(|tau| tau.difference(sigma))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Simplices of `xs` not containing vertex `v`
pub fn deletion(v: usize, xs: &[Simplex]) -> Vec<Simplex> {
    xs.iter().filter(|s| !s.contains_vertex(v)).cloned().collect()
}

/// Facets of the Alexander dual of the complex generated by `xs`.
///
/// The dual's facets are the complements in V of the minimal non-faces of
/// X. A complement equal to the empty simplex is dropped, so a sphere such
/// as the boundary of a simplex has no facets. Every subset of V is
/// visited, hence the cap on |V|.
pub fn alexander_dual(xs: &[Simplex]) -> Result<Vec<Simplex>> {
    let vertices: Vec<usize> = xs.iter()
        .flat_map(|s| s.vertices.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let n = vertices.len();
    if n > MAX_DUAL_VERTICES {
        return Err(TdaError::invalid(format!(
            "Alexander dual needs at most {} vertices, got {}", MAX_DUAL_VERTICES, n
        )));
    }

    // Generators as bitmasks over positions in `vertices`
    let generators: Vec<u32> = xs.iter()
        .map(|s| {
            s.vertices.iter()
                .filter_map(|v| vertices.binary_search(v).ok())
                .fold(0u32, |mask, pos| mask | (1 << pos))
        })
        .collect();
    let is_face = |mask: u32| generators.iter().any(|&g| mask & g == mask);

    let full: u32 = if n == 0 { 0 } else { u32::MAX >> (32 - n) };
    let mut facets = BTreeSet::new();

    for mask in 1..=full {
        if is_face(mask) {
            continue;
        }
        // Minimal: dropping any single vertex gives a face
        let minimal = (0..n)
            .filter(|&bit| mask & (1 << bit) != 0)
            .all(|bit| is_face(mask & !(1 << bit)));
        if !minimal {
            continue;
        }

        let complement = full & !mask;
        if complement != 0 {
            facets.insert(Simplex::from_sorted(
                (0..n).filter(|&bit| complement & (1 << bit) != 0).map(|bit| vertices[bit]).collect(),
            ));
        }
    }

    Ok(facets.into_iter().collect())
}
