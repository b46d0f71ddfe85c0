use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use rayon::prelude::*;

use crate::foundation::error::{FrameIoError, FrameIoResult};
use crate::schedule::progress::ProgressCounter;

/// One unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameTask {
    /// Logical frame index.
    pub index: u64,
    /// File to read or write.
    pub path: PathBuf,
    /// Position in the submitted sequence; results are reassembled by it.
    pub ordinal: usize,
}

/// Result of one task. Exactly one of payload or error is present.
#[derive(Debug)]
pub struct TransferOutcome<T> {
    /// Ordinal of the originating task.
    pub ordinal: usize,
    /// Payload or error.
    pub result: FrameIoResult<T>,
}

/// Worker pool sizing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SchedulerOpts {
    /// Worker threads. `None` uses twice the available parallelism (frame I/O mostly waits).
    pub threads: Option<usize>,
    /// Bounded capacity of the completion channel between workers and the collector.
    pub channel_capacity: usize,
}

impl Default for SchedulerOpts {
    fn default() -> Self {
        Self {
            threads: None,
            channel_capacity: 16,
        }
    }
}

impl SchedulerOpts {
    /// Thread count the pool will be built with.
    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .saturating_mul(2)
        })
    }
}

/// Bounded worker pool that fans tasks out and gathers results in submission order.
///
/// Workers push outcomes into a bounded channel drained by a collector thread. The collector
/// reports one progress tick per finished task in completion order and records the first
/// failure; after that, tasks that have not started are dropped as [`FrameIoError::Cancelled`]
/// while in-flight tasks run to completion and are discarded.
pub struct TransferScheduler {
    pool: rayon::ThreadPool,
    channel_capacity: usize,
}

impl std::fmt::Debug for TransferScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferScheduler")
            .field("threads", &self.pool.current_num_threads())
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

impl TransferScheduler {
    /// Build the pool.
    pub fn new(opts: &SchedulerOpts) -> FrameIoResult<Self> {
        if let Some(n) = opts.threads
            && n == 0
        {
            return Err(FrameIoError::configuration(
                "scheduler 'threads' must be >= 1 when set",
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.resolved_threads())
            .thread_name(|i| format!("frameseq-io-{i}"))
            .build()
            .map_err(|e| {
                FrameIoError::configuration(format!("failed to build worker pool: {e}"))
            })?;
        Ok(Self {
            pool,
            channel_capacity: opts.channel_capacity.max(1),
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` over every task.
    ///
    /// Returns outcomes sorted by ordinal, all successful. If any task fails, returns the error
    /// of the first failure observed by the collector instead; no partial result escapes.
    pub(crate) fn run<T, F>(
        &self,
        tasks: &[FrameTask],
        op: F,
        progress: &ProgressCounter<'_>,
    ) -> FrameIoResult<Vec<TransferOutcome<T>>>
    where
        T: Send,
        F: Fn(&FrameTask) -> FrameIoResult<T> + Sync,
    {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let cancelled = AtomicBool::new(false);
        let cancelled = &cancelled;

        std::thread::scope(|scope| -> FrameIoResult<Vec<TransferOutcome<T>>> {
            let (tx, rx) = mpsc::sync_channel::<TransferOutcome<T>>(self.channel_capacity);

            let collector = scope.spawn(move || {
                let mut done = Vec::with_capacity(tasks.len());
                let mut first_error: Option<FrameIoError> = None;
                for outcome in rx {
                    match outcome.result {
                        Err(FrameIoError::Cancelled { .. }) => continue,
                        Err(e) => {
                            progress.advance();
                            if first_error.is_none() {
                                cancelled.store(true, Ordering::Release);
                                tracing::debug!(
                                    ordinal = outcome.ordinal,
                                    error = %e,
                                    "task failed; cancelling remaining work"
                                );
                                first_error = Some(e);
                            }
                        }
                        Ok(payload) => {
                            progress.advance();
                            if first_error.is_none() {
                                done.push(TransferOutcome {
                                    ordinal: outcome.ordinal,
                                    result: Ok(payload),
                                });
                            }
                        }
                    }
                }
                match first_error {
                    Some(e) => Err(e),
                    None => Ok(done),
                }
            });

            self.pool.install(|| {
                tasks.par_iter().for_each_with(tx, |tx, task| {
                    let result = if cancelled.load(Ordering::Acquire) {
                        Err(FrameIoError::Cancelled {
                            ordinal: task.ordinal,
                        })
                    } else {
                        op(task)
                    };
                    // The collector only hangs up after every sender is gone.
                    let _ = tx.send(TransferOutcome {
                        ordinal: task.ordinal,
                        result,
                    });
                });
            });

            let mut done = collector
                .join()
                .map_err(|_| anyhow::anyhow!("transfer collector thread panicked"))??;

            tracing::debug!(
                tasks = tasks.len(),
                completed = progress.completed(),
                "transfers finished"
            );
            done.sort_by_key(|o| o.ordinal);
            if done.len() != tasks.len() {
                return Err(anyhow::anyhow!(
                    "internal error: {} of {} transfers reported",
                    done.len(),
                    tasks.len()
                )
                .into());
            }
            Ok(done)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
