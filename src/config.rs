//! Configuration for the windowed landscape pipeline.
//!
//! One immutable value carries every parameter from the entry point down
//! to the workers. It can be built in code or loaded from JSON; missing
//! JSON fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, TdaError};
use crate::information::PNorm;
use crate::topology::DegeneratePolicy;

/// How windows are handed to worker threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// One thread per window, at most `worker_count` at a time, with a
    /// barrier between batches
    #[default]
    Batched,
    /// `worker_count` long-lived threads fed from a shared queue
    Continuous,
}

/// Parameters of the sliding-window landscape norm computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of samples per window
    pub window_width: usize,
    /// Samples between consecutive window starts
    pub stride: usize,
    /// Homology dimension of the diagram
    pub homology_dim: usize,
    /// Rips edge-length cutoff
    pub max_radius: f64,
    /// Exponent for per-level integrals and their combination
    pub p_norm: PNorm,
    /// Report the distance to the previous window instead of the norm
    pub delta_mode: bool,
    /// Landscape samples per level
    pub landscape_resolution: usize,
    /// Fixed landscape lower bound (derived from the diagram if absent)
    pub t_min: Option<f64>,
    /// Fixed landscape upper bound (derived from the diagram if absent)
    pub t_max: Option<f64>,
    /// Maximum number of concurrently running windows
    pub worker_count: usize,
    pub dispatch: DispatchMode,
    /// Per-window timeout in milliseconds
    pub window_timeout_ms: Option<u64>,
    /// Diagram reported when no generator exists
    pub degenerate_policy: DegeneratePolicy,
    /// Drain the result channel every this many batches
    pub drain_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_width: 50,
            stride: 1,
            homology_dim: 1,
            max_radius: 1.0,
            p_norm: PNorm::Finite(1.0),
            delta_mode: false,
            landscape_resolution: 100,
            t_min: None,
            t_max: None,
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            dispatch: DispatchMode::Batched,
            window_timeout_ms: None,
            degenerate_policy: DegeneratePolicy::ZeroPair,
            drain_interval: 10,
        }
    }
}

impl PipelineConfig {
    pub fn new(window_width: usize, stride: usize, p_norm: PNorm) -> Self {
        Self {
            window_width,
            stride,
            p_norm,
            ..Self::default()
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_homology_dim(mut self, dim: usize) -> Self {
        self.homology_dim = dim;
        self
    }

    pub fn with_max_radius(mut self, max_radius: f64) -> Self {
        self.max_radius = max_radius;
        self
    }

    pub fn with_delta_mode(mut self, delta: bool) -> Self {
        self.delta_mode = delta;
        self
    }

    pub fn with_resolution(mut self, n_points: usize) -> Self {
        self.landscape_resolution = n_points;
        self
    }

    pub fn with_bounds(mut self, t_min: Option<f64>, t_max: Option<f64>) -> Self {
        self.t_min = t_min;
        self.t_max = t_max;
        self
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Per-window timeout, rounded up to whole milliseconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = (timeout.as_nanos() + 999_999) / 1_000_000;
        self.window_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    pub fn window_timeout(&self) -> Option<Duration> {
        self.window_timeout_ms.map(Duration::from_millis)
    }

    /// Reject parameters outside their domain
    pub fn validate(&self) -> Result<()> {
        if self.window_width == 0 {
            return Err(TdaError::invalid("window width must be positive"));
        }
        if self.stride == 0 {
            return Err(TdaError::invalid("stride must be positive"));
        }
        if !(self.max_radius > 0.0) {
            return Err(TdaError::invalid(format!(
                "max radius must be positive, got {}", self.max_radius
            )));
        }
        // Re-check p in case the struct was assembled by hand
        PNorm::new(self.p_norm.value())?;
        if self.landscape_resolution == 0 {
            return Err(TdaError::invalid("landscape resolution must be at least 1"));
        }
        if self.worker_count == 0 {
            return Err(TdaError::invalid("worker count must be at least 1"));
        }
        if self.drain_interval == 0 {
            return Err(TdaError::invalid("drain interval must be at least 1"));
        }
        if let (Some(lo), Some(hi)) = (self.t_min, self.t_max) {
            if !(lo <= hi) {
                return Err(TdaError::invalid(format!(
                    "t_min must not exceed t_max, got [{}, {}]", lo, hi
                )));
            }
        }
        if self.window_timeout_ms == Some(0) {
            return Err(TdaError::invalid("window timeout must be positive"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.worker_count >= 1);
        assert_eq!(config.drain_interval, 10);
    }

    #[test]
    fn test_invalid_parameters() {
        let base = PipelineConfig::new(5, 2, PNorm::Finite(2.0));
        assert!(base.validate().is_ok());

        let cases = vec![
            PipelineConfig { window_width: 0, ..base.clone() },
            PipelineConfig { stride: 0, ..base.clone() },
            base.clone().with_max_radius(0.0),
            base.clone().with_max_radius(-1.0),
            PipelineConfig { p_norm: PNorm::Finite(0.5), ..base.clone() },
            base.clone().with_resolution(0),
            base.clone().with_workers(0),
            base.clone().with_bounds(Some(2.0), Some(1.0)),
        ];

        for config in cases {
            assert!(matches!(config.validate(), Err(TdaError::InvalidParameter(_))), "{:?}", config);
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "window_width": 20, "stride": 3, "p_norm": "inf", "dispatch": "continuous" }"#,
        ).unwrap();

        assert_eq!(config.window_width, 20);
        assert_eq!(config.stride, 3);
        assert_eq!(config.p_norm, PNorm::Infinity);
        assert_eq!(config.dispatch, DispatchMode::Continuous);
        assert_eq!(config.landscape_resolution, 100);
        assert_eq!(config.degenerate_policy, DegeneratePolicy::ZeroPair);
    }

    #[test]
    fn test_json_rejects_bad_values() {
        assert!(PipelineConfig::from_json_str(r#"{ "stride": 0 }"#).is_err());
        assert!(PipelineConfig::from_json_str(r#"{ "homology_dim": -1 }"#).is_err());
        assert!(PipelineConfig::from_json_str(r#"{ "p_norm": 0.2 }"#).is_err());
    }

    #[test]
    fn test_timeout_rounds_up() {
        let config = PipelineConfig::default().with_timeout(Duration::from_micros(300));
        assert_eq!(config.window_timeout_ms, Some(1));
        assert!(config.validate().is_ok());

        let config = PipelineConfig::default().with_timeout(Duration::from_micros(2001));
        assert_eq!(config.window_timeout(), Some(Duration::from_millis(3)));

        let config = PipelineConfig::default().with_timeout(Duration::from_millis(40));
        assert_eq!(config.window_timeout_ms, Some(40));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("tda-landscape-stream-config-test.json");
        let config = PipelineConfig::new(12, 4, PNorm::Infinity)
            .with_timeout(Duration::from_millis(250))
            .with_degenerate_policy(DegeneratePolicy::Empty);

        config.save(&path).unwrap();
        let loaded = PipelineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
        assert_eq!(loaded.window_timeout(), Some(Duration::from_millis(250)));
    }
}
