//! # TDA Landscape Stream
//!
//! Sliding-window persistence landscape norms: a scalar topological
//! signature for multivariate time series.
//!
//! ## Pipeline
//!
//! For every window of `w` consecutive samples (rows) of the sequence:
//!
//! 1. **Vietoris-Rips filtration** of the window's point cloud, up to
//!    simplex dimension `dim + 1` and edge length `maxrad`
//! 2. **Persistent homology** by boundary matrix reduction, giving the
//!    birth/death pairs of `dim`-dimensional features
//! 3. **Persistence landscape** λ₁ ≥ λ₂ ≥ … sampled on a uniform grid
//! 4. **L^p norm** of each level, combined into a single value, or the
//!    L^p distance to the landscape of the previous window
//!
//! Windows start every `dt` samples and are processed in parallel by a
//! bounded pool of worker threads; results come back in index order.
//!
//! ## Example
//!
//! ```no_run
//! use ndarray::Array2;
//! use tda_landscape_stream::{PipelineConfig, PNorm, streaming_landscape_norms};
//!
//! let sequence = Array2::<f64>::zeros((500, 3));
//! let config = PipelineConfig::new(50, 5, PNorm::Finite(2.0))
//!     .with_homology_dim(1)
//!     .with_max_radius(1.0);
//!
//! let report = streaming_landscape_norms(sequence.view(), &config).unwrap();
//! for r in &report.results {
//!     println!("{} {}", r.window_index, r.value);
//! }
//! ```
//!
//! ## References
//!
//! - Bubenik, "Statistical Topological Data Analysis using Persistence
//!   Landscapes", JMLR 16 (2015)
//! - Edelsbrunner & Harer, "Computational Topology" (2010)

pub mod error;
pub mod config;
pub mod topology;
pub mod information;
pub mod streaming;
pub mod synthetic;

pub use error::{TdaError, Result};
pub use config::{PipelineConfig, DispatchMode};

// Re-exports from topology
pub use topology::{
    Simplex,
    VietorisRips,
    Filtration,
    FilteredSimplex,
    PersistenceDiagram,
    PersistenceInterval,
    DegeneratePolicy,
    compute_persistence,
    diagram_from_points,
    distance_matrix,
    suggested_max_radius,
};

// Re-exports from information
pub use information::{
    PersistenceLandscape,
    PNorm,
    landscape_lp_norms,
    landscape_lp_distances,
    landscape_lp_norm,
};

// Re-exports from streaming
pub use streaming::{
    Window,
    NormResult,
    StreamingReport,
    ResultAggregator,
    WindowScheduler,
    WindowKernel,
    LandscapeKernel,
    landscape_p_norm,
    streaming_landscape_norms,
};
