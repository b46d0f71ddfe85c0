use std::sync::atomic::{AtomicU64, Ordering};

/// Receives batch progress.
///
/// `tick` is called once per finished frame with the running total. Calls may arrive from a
/// different thread than the one that started the batch.
pub trait ProgressSink: Send + Sync {
    /// Called once before any tick with the number of frames in the batch.
    fn begin(&self, _total: u64) {}
    /// Called after each finished frame with the number finished so far.
    fn tick(&self, completed: u64);
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn tick(&self, _completed: u64) {}
}

/// Records the tick count and the last reported total. Useful in tests.
#[derive(Debug, Default)]
pub struct CountingProgress {
    total: AtomicU64,
    ticks: AtomicU64,
    last: AtomicU64,
}

impl CountingProgress {
    /// Create a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value passed to the last `begin`.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Number of `tick` calls.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Highest `completed` value seen.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

impl ProgressSink for CountingProgress {
    fn begin(&self, total: u64) {
        self.total.store(total, Ordering::Release);
    }

    fn tick(&self, completed: u64) {
        self.ticks.fetch_add(1, Ordering::AcqRel);
        self.last.fetch_max(completed, Ordering::AcqRel);
    }
}

/// Reports progress through `tracing`, at most every `every` frames plus the final one.
#[derive(Debug)]
pub struct LogProgress {
    label: &'static str,
    every: u64,
    total: AtomicU64,
}

impl LogProgress {
    /// Log under `label` every `every` frames (`0` is treated as 1).
    pub fn new(label: &'static str, every: u64) -> Self {
        Self {
            label,
            every: every.max(1),
            total: AtomicU64::new(0),
        }
    }
}

impl ProgressSink for LogProgress {
    fn begin(&self, total: u64) {
        self.total.store(total, Ordering::Release);
        tracing::info!(op = self.label, total, "batch started");
    }

    fn tick(&self, completed: u64) {
        let total = self.total.load(Ordering::Acquire);
        if completed % self.every == 0 || completed == total {
            tracing::info!(op = self.label, completed, total, "progress");
        }
    }
}

/// Running counter shared by the orchestrator and the scheduler's consumer thread so one batch
/// reports a single monotonically increasing sequence.
pub(crate) struct ProgressCounter<'a> {
    sink: &'a dyn ProgressSink,
    done: AtomicU64,
}

impl<'a> ProgressCounter<'a> {
    pub(crate) fn begin(sink: &'a dyn ProgressSink, total: u64) -> Self {
        sink.begin(total);
        Self {
            sink,
            done: AtomicU64::new(0),
        }
    }

    pub(crate) fn advance(&self) {
        let n = self.done.fetch_add(1, Ordering::AcqRel) + 1;
        self.sink.tick(n);
    }

    pub(crate) fn completed(&self) -> u64 {
        self.done.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/progress.rs"]
mod tests;
