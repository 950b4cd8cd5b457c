//! Error types shared by every stage of the landscape pipeline.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TdaError {
    /// A parameter outside its documented domain (width, stride, radius, p, ...).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A worker panicked or returned an error while processing a window.
    #[error("Computation failed for window {index}: {reason}")]
    ComputationFailed { index: usize, reason: String },

    /// A worker did not report back within the per-window timeout.
    #[error("Worker timed out for window {index} after {timeout:?}")]
    WorkerTimeout { index: usize, timeout: Duration },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl TdaError {
    /// Window index a per-window failure refers to.
    pub fn window_index(&self) -> Option<usize> {
        match self {
            TdaError::ComputationFailed { index, .. } | TdaError::WorkerTimeout { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TdaError::InvalidParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TdaError>;

impl From<std::io::Error> for TdaError {
    fn from(err: std::io::Error) -> Self {
        TdaError::Io(err.to_string())
    }
}

impl From<ndarray::ShapeError> for TdaError {
    fn from(err: ndarray::ShapeError) -> Self {
        TdaError::InvalidParameter(err.to_string())
    }
}

impl From<serde_json::Error> for TdaError {
    fn from(err: serde_json::Error) -> Self {
        TdaError::Config(err.to_string())
    }
}
