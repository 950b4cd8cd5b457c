//! Streaming Module: Sliding-Window Landscape Norms
//!
//! Partitions a multivariate sequence into overlapping windows, computes
//! one topological scalar per window on a bounded set of worker threads and
//! gathers the results back into an index-ordered series.
//!
//! The sequence is shared read-only between workers; the result channel is
//! the only shared mutable structure.

mod window;
mod aggregator;
mod scheduler;

pub use window::{
    Window,
    window_indices,
    window_diagram,
    window_landscape,
    landscape_p_norm,
    compute_window,
};
pub use aggregator::{NormResult, ResultAggregator, StreamingReport, WorkerMessage};
pub use scheduler::{WindowKernel, LandscapeKernel, WindowScheduler, streaming_landscape_norms};
