//! Collects per-window outcomes coming back from the workers.
//!
//! Workers finish in any order. The aggregator keeps the first outcome
//! reported for each window, ignores late or duplicate reports (e.g. from a
//! worker that already timed out) and sorts everything by window index when
//! the run is finished.

use crossbeam_channel::Receiver;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{Result, TdaError};

/// Scalar computed for one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormResult {
    pub window_index: usize,
    pub value: f64,
}

/// What a worker sends back for one window
pub type WorkerMessage = (usize, Result<f64>);

/// Ordered outcome of a streaming run
#[derive(Debug, Clone)]
pub struct StreamingReport {
    /// Successful windows, sorted by index
    pub results: Vec<NormResult>,
    /// Failed or timed-out windows, sorted by index
    pub failures: Vec<TdaError>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl StreamingReport {
    pub fn indices(&self) -> Vec<usize> {
        self.results.iter().map(|r| r.window_index).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.value).collect()
    }

    /// True when no window failed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Completed results per second
    pub fn throughput(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.len() as f64 / self.elapsed.as_secs_f64().max(1e-9)
    }

    /// Values rescaled to [0, 1]; a constant series maps to zeros
    pub fn min_max_scaled(&self) -> Vec<f64> {
        let values = self.values();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = hi - lo;

        values.iter()
            .map(|v| if range > 0.0 { (v - lo) / range } else { 0.0 })
            .collect()
    }
}

/// Accumulates results and failures for one run
#[derive(Debug)]
pub struct ResultAggregator {
    expected: usize,
    results: Vec<NormResult>,
    failures: Vec<TdaError>,
    settled: HashSet<usize>,
    started: Instant,
}

impl ResultAggregator {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            results: Vec::with_capacity(expected),
            failures: Vec::new(),
            settled: HashSet::with_capacity(expected),
            started: Instant::now(),
        }
    }

    /// Number of windows with a final outcome
    pub fn settled(&self) -> usize {
        self.settled.len()
    }

    pub fn is_settled(&self, index: usize) -> bool {
        self.settled.contains(&index)
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Record a worker outcome; returns false if the window was already settled
    pub fn record(&mut self, index: usize, outcome: Result<f64>) -> bool {
        if !self.settled.insert(index) {
            debug!(window = index, "discarding late result");
            return false;
        }
        match outcome {
            Ok(value) => self.results.push(NormResult { window_index: index, value }),
            Err(err) => {
                warn!(window = index, error = %err, "window failed");
                self.failures.push(err);
            }
        }
        true
    }

    /// Mark a window as timed out unless it already reported
    pub fn record_timeout(&mut self, index: usize, timeout: Duration) -> bool {
        if !self.settled.insert(index) {
            return false;
        }
        warn!(window = index, ?timeout, "worker timed out");
        self.failures.push(TdaError::WorkerTimeout { index, timeout });
        true
    }

    /// Move every message currently in the channel into the buffer
    pub fn drain(&mut self, rx: &Receiver<WorkerMessage>) -> usize {
        let mut drained = 0;
        for (index, outcome) in rx.try_iter() {
            if self.record(index, outcome) {
                drained += 1;
            }
        }
        debug!(drained, settled = self.settled(), expected = self.expected, "drained result channel");
        drained
    }

    /// Sort by window index and report throughput
    pub fn finish(mut self) -> StreamingReport {
        self.results.sort_by_key(|r| r.window_index);
        self.failures.sort_by_key(|e| e.window_index());

        let report = StreamingReport {
            results: self.results,
            failures: self.failures,
            elapsed: self.started.elapsed(),
        };

        info!(
            "{} results in {:.2}(s), {:.2} results/sec",
            report.results.len(),
            report.elapsed.as_secs_f64(),
            report.throughput()
        );
        if !report.failures.is_empty() {
            warn!(failed = report.failures.len(), "some windows did not produce a value");
        }

        report
    }
}
