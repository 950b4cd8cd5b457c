//! Window scheduler and worker pool.
//!
//! ## Batched dispatch
//!
//! ```text
//!   indices ─chunks(T)─▶ batch ─spawn one thread per window─▶ workers
//!                          ▲                                   │ │
//!                          └──── barrier (done acks) ◀─────────┘ │
//!   aggregator ◀──── drain every k-th and the final batch ◀──────┘ results
//! ```
//!
//! No two batches overlap in time. A window that misses its timeout is
//! recorded as `WorkerTimeout` and its thread is left to finish on its own.
//!
//! ## Continuous dispatch
//!
//! `T` long-lived workers pull indices from a shared queue and report back
//! on one event channel. A timed-out worker is replaced so the concurrency
//! cap is kept.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use ndarray::{Array2, ArrayView2};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::aggregator::{ResultAggregator, StreamingReport, WorkerMessage};
use super::window::{compute_window, window_indices};
use crate::config::{DispatchMode, PipelineConfig};
use crate::error::{Result, TdaError};

/// Computation performed for one window of the shared sequence
pub trait WindowKernel: Send + Sync + 'static {
    fn compute(&self, sequence: ArrayView2<f64>, index: usize, config: &PipelineConfig) -> Result<f64>;
}

/// Landscape L^p norm (or distance, in delta mode) of a window
#[derive(Debug, Clone, Copy, Default)]
pub struct LandscapeKernel;

impl WindowKernel for LandscapeKernel {
    fn compute(&self, sequence: ArrayView2<f64>, index: usize, config: &PipelineConfig) -> Result<f64> {
        compute_window(sequence, index, config)
    }
}

/// Everything a worker thread needs, shared read-only
struct Shared<K> {
    sequence: Arc<Array2<f64>>,
    config: Arc<PipelineConfig>,
    kernel: Arc<K>,
}

impl<K> Clone for Shared<K> {
    fn clone(&self) -> Self {
        Self {
            sequence: Arc::clone(&self.sequence),
            config: Arc::clone(&self.config),
            kernel: Arc::clone(&self.kernel),
        }
    }
}

impl<K: WindowKernel> Shared<K> {
    /// Run the kernel, turning errors and panics into `ComputationFailed`
    fn run(&self, index: usize) -> Result<f64> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.kernel.compute(self.sequence.view(), index, &self.config)
        }));

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err @ TdaError::ComputationFailed { .. })) => Err(err),
            Ok(Err(err)) => Err(TdaError::ComputationFailed { index, reason: err.to_string() }),
            Err(payload) => Err(TdaError::ComputationFailed {
                index,
                reason: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}

enum WorkerEvent {
    Claimed(usize),
    Finished(usize, Result<f64>),
}

/// Fans windows out to worker threads and collects their scalars
pub struct WindowScheduler<K = LandscapeKernel> {
    config: Arc<PipelineConfig>,
    kernel: Arc<K>,
}

impl WindowScheduler<LandscapeKernel> {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_kernel(config, LandscapeKernel)
    }
}

impl<K: WindowKernel> WindowScheduler<K> {
    /// Scheduler running a custom per-window computation
    pub fn with_kernel(config: PipelineConfig, kernel: K) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            kernel: Arc::new(kernel),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Window start indices this scheduler will dispatch for `n` samples
    pub fn planned_indices(&self, n: usize) -> Vec<usize> {
        window_indices(n, self.config.window_width, self.config.stride, self.config.delta_mode)
    }

    /// Batches of at most `worker_count` indices, in submission order
    pub fn planned_batches(&self, n: usize) -> Vec<Vec<usize>> {
        self.planned_indices(n)
            .chunks(self.config.worker_count)
            .map(|c| c.to_vec())
            .collect()
    }

    /// Process every window of `sequence` (rows are samples, columns features)
    pub fn run(&self, sequence: Arc<Array2<f64>>) -> Result<StreamingReport> {
        let shared = Shared {
            sequence,
            config: Arc::clone(&self.config),
            kernel: Arc::clone(&self.kernel),
        };

        let n = shared.sequence.nrows();
        info!(
            samples = n,
            features = shared.sequence.ncols(),
            width = self.config.window_width,
            stride = self.config.stride,
            workers = self.config.worker_count,
            mode = ?self.config.dispatch,
            "starting landscape stream"
        );

        match self.config.dispatch {
            DispatchMode::Batched => self.run_batched(shared),
            DispatchMode::Continuous => self.run_continuous(shared),
        }
    }

    fn run_batched(&self, shared: Shared<K>) -> Result<StreamingReport> {
        let batches = self.planned_batches(shared.sequence.nrows());
        let total: usize = batches.iter().map(|b| b.len()).sum();
        let timeout = self.config.window_timeout();

        let (result_tx, result_rx) = unbounded::<WorkerMessage>();
        let (done_tx, done_rx) = unbounded::<usize>();
        let mut aggregator = ResultAggregator::new(total);

        for (batch_no, batch) in batches.iter().enumerate() {
            debug!(batch = batch_no, first = batch[0], size = batch.len(), "dispatching batch");

            let started = Instant::now();
            let mut handles: HashMap<usize, JoinHandle<()>> = HashMap::with_capacity(batch.len());
            let mut pending: HashSet<usize> = HashSet::with_capacity(batch.len());

            for &index in batch {
                let worker = shared.clone();
                let result_tx = result_tx.clone();
                let done_tx = done_tx.clone();

                let spawned = thread::Builder::new()
                    .name(format!("landscape-window-{}", index))
                    .spawn(move || {
                        let outcome = worker.run(index);
                        let _ = result_tx.send((index, outcome));
                        let _ = done_tx.send(index);
                    });

                match spawned {
                    Ok(handle) => {
                        handles.insert(index, handle);
                        pending.insert(index);
                    }
                    Err(err) => {
                        aggregator.record(index, Err(TdaError::ComputationFailed {
                            index,
                            reason: format!("failed to spawn worker: {}", err),
                        }));
                    }
                }
            }

            // Barrier: every worker of this batch acknowledges or times out
            while !pending.is_empty() {
                let ack = match timeout {
                    Some(t) => done_rx.recv_deadline(started + t),
                    None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };

                match ack {
                    Ok(index) => {
                        pending.remove(&index);
                        if let Some(handle) = handles.remove(&index) {
                            let _ = handle.join();
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        let t = timeout.unwrap_or_default();
                        // Results already queued win over the timeout
                        aggregator.drain(&result_rx);
                        for index in pending.drain() {
                            aggregator.record_timeout(index, t);
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(TdaError::Io("worker acknowledgement channel closed".into()));
                    }
                }
            }

            // Remaining handles belong to timed-out workers; let them detach
            drop(handles);

            if drain_due(batch_no, batches.len(), self.config.drain_interval) {
                aggregator.drain(&result_rx);
            }
        }

        Ok(aggregator.finish())
    }

    fn run_continuous(&self, shared: Shared<K>) -> Result<StreamingReport> {
        let indices = self.planned_indices(shared.sequence.nrows());
        let timeout = self.config.window_timeout();
        let mut aggregator = ResultAggregator::new(indices.len());

        if indices.is_empty() {
            return Ok(aggregator.finish());
        }

        let (work_tx, work_rx) = unbounded::<usize>();
        let (event_tx, event_rx) = unbounded::<WorkerEvent>();

        for &index in &indices {
            let _ = work_tx.send(index);
        }
        drop(work_tx);

        let pool_size = self.config.worker_count.min(indices.len());
        let mut handles = Vec::with_capacity(pool_size);
        for worker_id in 0..pool_size {
            handles.push(spawn_worker(worker_id, shared.clone(), work_rx.clone(), event_tx.clone())?);
        }
        debug!(workers = pool_size, queued = indices.len(), "worker pool started");

        let mut in_flight: HashMap<usize, Instant> = HashMap::new();
        let mut next_worker_id = pool_size;
        let mut timed_out = false;

        while aggregator.settled() < indices.len() {
            let deadline = timeout.and_then(|t| in_flight.values().min().map(|&s| s + t));

            let event = match deadline {
                Some(deadline) => event_rx.recv_deadline(deadline),
                None => event_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match event {
                Ok(WorkerEvent::Claimed(index)) => {
                    in_flight.insert(index, Instant::now());
                }
                Ok(WorkerEvent::Finished(index, outcome)) => {
                    in_flight.remove(&index);
                    aggregator.record(index, outcome);
                }
                Err(RecvTimeoutError::Timeout) => {
                    let t = timeout.unwrap_or_default();
                    let now = Instant::now();
                    let expired: Vec<usize> = in_flight.iter()
                        .filter(|(_, &start)| now.duration_since(start) >= t)
                        .map(|(&index, _)| index)
                        .collect();

                    for index in expired {
                        in_flight.remove(&index);
                        aggregator.record_timeout(index, t);
                        timed_out = true;

                        // The stuck thread keeps its slot; add a replacement
                        if !work_rx.is_empty() {
                            handles.push(spawn_worker(
                                next_worker_id,
                                shared.clone(),
                                work_rx.clone(),
                                event_tx.clone(),
                            )?);
                            next_worker_id += 1;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(TdaError::Io("worker event channel closed".into()));
                }
            }
        }

        if timed_out {
            warn!("leaving timed-out workers detached");
        } else {
            for handle in handles {
                let _ = handle.join();
            }
        }

        Ok(aggregator.finish())
    }
}

/// Batched mode empties the result channel after every `interval`-th batch
/// (counting from the first) and after the last one.
fn drain_due(batch_no: usize, n_batches: usize, interval: usize) -> bool {
    batch_no % interval == 0 || batch_no + 1 == n_batches
}

fn spawn_worker<K: WindowKernel>(
    worker_id: usize,
    shared: Shared<K>,
    work_rx: Receiver<usize>,
    event_tx: Sender<WorkerEvent>,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name(format!("landscape-worker-{}", worker_id))
        .spawn(move || {
            while let Ok(index) = work_rx.recv() {
                if event_tx.send(WorkerEvent::Claimed(index)).is_err() {
                    break;
                }
                let outcome = shared.run(index);
                if event_tx.send(WorkerEvent::Finished(index, outcome)).is_err() {
                    break;
                }
            }
        })?;
    Ok(handle)
}

/// Landscape norms of every window of `sequence` with the given configuration
pub fn streaming_landscape_norms(
    sequence: ArrayView2<f64>,
    config: &PipelineConfig,
) -> Result<StreamingReport> {
    WindowScheduler::new(config.clone())?.run(Arc::new(sequence.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::information::PNorm;
    use std::sync::Mutex;

    /// Records dispatched indices and returns the index as the value
    #[derive(Default)]
    struct RecordingKernel {
        seen: Mutex<Vec<usize>>,
    }

    impl WindowKernel for RecordingKernel {
        fn compute(&self, _: ArrayView2<f64>, index: usize, _: &PipelineConfig) -> Result<f64> {
            self.seen.lock().unwrap().push(index);
            Ok(index as f64)
        }
    }

    struct FaultyKernel;

    impl WindowKernel for FaultyKernel {
        fn compute(&self, _: ArrayView2<f64>, index: usize, _: &PipelineConfig) -> Result<f64> {
            match index {
                4 => panic!("bad window"),
                8 => Err(TdaError::invalid("bad parameter")),
                12 => {
                    thread::sleep(Duration::from_millis(400));
                    Ok(-1.0)
                }
                _ => Ok(index as f64 * 0.5),
            }
        }
    }

    /// Records when each window started and finished
    #[derive(Default)]
    struct TimingKernel {
        spans: Mutex<Vec<(usize, Instant, Instant)>>,
    }

    impl WindowKernel for TimingKernel {
        fn compute(&self, _: ArrayView2<f64>, index: usize, _: &PipelineConfig) -> Result<f64> {
            let start = Instant::now();
            thread::sleep(Duration::from_millis(2 + (index % 3) as u64 * 3));
            self.spans.lock().unwrap().push((index, start, Instant::now()));
            Ok(index as f64)
        }
    }

    fn sequence(n: usize) -> Arc<Array2<f64>> {
        Arc::new(Array2::from_shape_fn((n, 2), |(i, j)| (i * (j + 1)) as f64))
    }

    #[test]
    fn test_index_set_independent_of_workers() {
        let expected: Vec<usize> = (0..=16).step_by(2).collect();

        for workers in [1, 3, 4, 16] {
            for dispatch in [DispatchMode::Batched, DispatchMode::Continuous] {
                let config = PipelineConfig::new(5, 2, PNorm::Finite(1.0))
                    .with_workers(workers)
                    .with_dispatch(dispatch);
                let scheduler = WindowScheduler::with_kernel(config, RecordingKernel::default()).unwrap();
                assert_eq!(scheduler.planned_indices(23), expected);

                let report = scheduler.run(sequence(23)).unwrap();
                assert_eq!(report.indices(), expected);

                let mut seen = scheduler.kernel.seen.lock().unwrap().clone();
                seen.sort_unstable();
                assert_eq!(seen, expected);
            }
        }
    }

    #[test]
    fn test_batches_bounded_by_worker_count() {
        let config = PipelineConfig::new(5, 2, PNorm::Finite(1.0)).with_workers(4);
        let scheduler = WindowScheduler::new(config).unwrap();
        let batches = scheduler.planned_batches(23);
        assert_eq!(batches, vec![vec![0, 2, 4, 6], vec![8, 10, 12, 14], vec![16]]);
    }

    #[test]
    fn test_batches_do_not_overlap() {
        let config = PipelineConfig::new(5, 2, PNorm::Finite(1.0)).with_workers(4);
        let scheduler = WindowScheduler::with_kernel(config, TimingKernel::default()).unwrap();
        let batches = scheduler.planned_batches(43);
        assert_eq!(batches.len(), 5);

        let report = scheduler.run(sequence(43)).unwrap();
        assert_eq!(report.results.len(), 19);

        let spans = scheduler.kernel.spans.lock().unwrap().clone();
        let span_of = |index: usize| {
            spans.iter().find(|s| s.0 == index).map(|s| (s.1, s.2)).unwrap()
        };

        for pair in batches.windows(2) {
            let last_end = pair[0].iter().map(|&i| span_of(i).1).max().unwrap();
            let next_start = pair[1].iter().map(|&i| span_of(i).0).min().unwrap();
            assert!(last_end <= next_start, "batch starting at {} overlaps its predecessor", pair[1][0]);
        }
    }

    #[test]
    fn test_drain_cadence() {
        let drained: Vec<usize> = (0..23).filter(|&b| drain_due(b, 23, 10)).collect();
        assert_eq!(drained, vec![0, 10, 20, 22]);

        let every_third: Vec<usize> = (0..7).filter(|&b| drain_due(b, 7, 3)).collect();
        assert_eq!(every_third, vec![0, 3, 6]);

        // A single batch is both first and last
        assert!(drain_due(0, 1, 10));
        assert!((0..5).all(|b| drain_due(b, 5, 1)));
    }

    #[test]
    fn test_sparse_drains_keep_every_result() {
        let config = PipelineConfig {
            drain_interval: 4,
            ..PipelineConfig::new(3, 1, PNorm::Finite(1.0)).with_workers(2)
        };
        let report = WindowScheduler::with_kernel(config, RecordingKernel::default())
            .unwrap()
            .run(sequence(20))
            .unwrap();

        assert_eq!(report.indices(), (0..17).collect::<Vec<_>>());
        assert!(report.is_complete());
    }

    #[test]
    fn test_failures_do_not_lose_batch() {
        for dispatch in [DispatchMode::Batched, DispatchMode::Continuous] {
            let config = PipelineConfig::new(2, 4, PNorm::Finite(1.0))
                .with_workers(3)
                .with_dispatch(dispatch)
                .with_timeout(Duration::from_millis(100));
            let scheduler = WindowScheduler::with_kernel(config, FaultyKernel).unwrap();

            // Indices 0, 4, 8, 12, 16
            let report = scheduler.run(sequence(20)).unwrap();
            assert_eq!(report.indices(), vec![0, 16]);
            assert_eq!(report.values(), vec![0.0, 8.0]);

            let failed: Vec<_> = report.failures.iter().map(|e| e.window_index()).collect();
            assert_eq!(failed, vec![Some(4), Some(8), Some(12)]);
            assert!(matches!(report.failures[0], TdaError::ComputationFailed { index: 4, .. }));
            assert!(matches!(report.failures[1], TdaError::ComputationFailed { index: 8, .. }));
            assert!(matches!(report.failures[2], TdaError::WorkerTimeout { index: 12, .. }));
        }
    }

    #[test]
    fn test_empty_when_sequence_too_short() {
        let config = PipelineConfig::new(10, 1, PNorm::Finite(1.0));
        let report = streaming_landscape_norms(Array2::<f64>::zeros((8, 2)).view(), &config).unwrap();
        assert!(report.results.is_empty());
        assert!(report.is_complete());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig::new(0, 1, PNorm::Finite(1.0));
        assert!(matches!(WindowScheduler::new(config), Err(TdaError::InvalidParameter(_))));
    }
}
