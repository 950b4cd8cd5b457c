//! Topology Module: Rips Filtrations and Persistent Homology
//!
//! Implements the mathematical structures for topological data analysis:
//! - Abstract simplices and simplicial operations (join, link, star, Alexander dual)
//! - Vietoris-Rips filtration up to a bounded simplex dimension
//! - Exact persistent homology via boundary matrix reduction
//! - Scale heuristics for the Rips cutoff
//!
//! ## Mathematical Background
//!
//! For a window of a multivariate series X, each row is a point and we
//! construct the filtration of simplicial complexes VR_ε(X) indexed by the
//! scale parameter ε ≤ maxrad. Persistent homology tracks the birth and
//! death of topological features (connected components, loops, voids)
//! across this filtration.

mod simplex;
mod vietoris_rips;
mod persistence;
mod radius;

pub use simplex::{Simplex, join, link, star, deletion, alexander_dual, MAX_DUAL_VERTICES};
pub use vietoris_rips::{VietorisRips, Filtration, FilteredSimplex, distance_matrix};
pub use persistence::{
    PersistenceDiagram,
    PersistenceInterval,
    DegeneratePolicy,
    compute_persistence,
    diagram_from_points,
};
pub use radius::{mean_chi, mean_dist, suggested_max_radius};
