//! Information Module: Landscape Summaries of Persistence Diagrams
//!
//! Turns a persistence diagram into a scalar that can be tracked over time.
//!
//! ## Core Concepts
//!
//! ### Persistence Landscape
//!
//! Given a persistence diagram D = {(bᵢ, dᵢ)}, the landscape is the
//! sequence of functions λₖ(t) = k-th largest of min(t - bᵢ, dᵢ - t)₊.
//! Unlike the diagram itself it lives in a vector space, so norms and
//! distances are well defined.
//!
//! ### Landscape L^p Norm
//!
//! Integrating each λₖ to an L^p value and combining the per-level values
//! with the same p yields one number per window. Between consecutive
//! windows the L^p distance measures how fast the topology is changing.

mod landscape;
mod norms;

pub use landscape::PersistenceLandscape;
pub use norms::{
    PNorm,
    landscape_lp_norms,
    landscape_lp_distances,
    landscape_lp_norm,
};
