//! Windows over a multivariate sequence and the per-window pipeline.
//!
//! A window is a contiguous block of rows; each row is one point of the
//! cloud handed to the Rips construction:
//!
//! ```text
//!   points ──▶ Rips filtration ──▶ diagram(dim) ──▶ landscape ──▶ ‖·‖_p
//! ```
//!
//! In delta mode the window starting at i is compared against the one
//! starting at i - stride, so the first candidate index is `stride`.

use ndarray::{s, ArrayView2};

use crate::config::PipelineConfig;
use crate::error::{Result, TdaError};
use crate::information::{
    landscape_lp_distances, landscape_lp_norm, landscape_lp_norms, PersistenceLandscape,
};
use crate::topology::{diagram_from_points, PersistenceDiagram};

/// A contiguous slice of the input sequence
#[derive(Debug, Clone)]
pub struct Window<'a> {
    pub start_index: usize,
    pub points: ArrayView2<'a, f64>,
}

impl<'a> Window<'a> {
    /// Rows `start..start + width` of `sequence`
    pub fn new(sequence: ArrayView2<'a, f64>, start_index: usize, width: usize) -> Result<Self> {
        let end = start_index.checked_add(width)
            .filter(|&end| end <= sequence.nrows())
            .ok_or_else(|| TdaError::invalid(format!(
                "window [{}, {}+{}) exceeds sequence length {}",
                start_index, start_index, width, sequence.nrows()
            )))?;

        Ok(Self {
            start_index,
            points: sequence.slice_move(s![start_index..end, ..]),
        })
    }

    pub fn width(&self) -> usize {
        self.points.nrows()
    }

    pub fn features(&self) -> usize {
        self.points.ncols()
    }
}

/// Start indices `first, first + stride, ...` strictly below `n - width`,
/// with `first = stride` in delta mode and 0 otherwise.
pub fn window_indices(n: usize, width: usize, stride: usize, delta_mode: bool) -> Vec<usize> {
    if stride == 0 {
        return Vec::new();
    }
    let first = if delta_mode { stride } else { 0 };
    let last = n.saturating_sub(width);
    (first..last).step_by(stride).collect()
}

/// Persistence diagram of a point cloud in the configured dimension
pub fn window_diagram(points: ArrayView2<f64>, config: &PipelineConfig) -> Result<PersistenceDiagram> {
    diagram_from_points(points, config.max_radius, config.homology_dim, config.degenerate_policy)
}

/// Sampled landscape of a point cloud
pub fn window_landscape(points: ArrayView2<f64>, config: &PipelineConfig) -> Result<PersistenceLandscape> {
    let pd = window_diagram(points, config)?;
    PersistenceLandscape::from_diagram(&pd, config.landscape_resolution, config.t_min, config.t_max)
}

/// Landscape L^p norm of `points`, or the L^p distance to `previous` if given
pub fn landscape_p_norm(
    points: ArrayView2<f64>,
    previous: Option<ArrayView2<f64>>,
    config: &PipelineConfig,
) -> Result<f64> {
    let landscape = window_landscape(points, config)?;

    let level_values = match previous {
        Some(prev) => {
            let other = window_landscape(prev, config)?;
            landscape_lp_distances(&landscape, &other, config.p_norm)?
        }
        None => landscape_lp_norms(&landscape, config.p_norm)?,
    };

    landscape_lp_norm(&level_values, config.p_norm)
}

/// Scalar for the window starting at `index`, honouring delta mode
pub fn compute_window(sequence: ArrayView2<f64>, index: usize, config: &PipelineConfig) -> Result<f64> {
    let window = Window::new(sequence, index, config.window_width)?;

    let previous = if config.delta_mode {
        let prev_start = index.checked_sub(config.stride).ok_or_else(|| {
            TdaError::invalid(format!("window {} has no predecessor in delta mode", index))
        })?;
        Some(Window::new(sequence, prev_start, config.window_width)?.points)
    } else {
        None
    };

    landscape_p_norm(window.points, previous, config)
}
