use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::codec::FrameCodec;
use crate::codec::raster::ImageCodec;
use crate::dedup::fingerprint::fingerprint_frame;
use crate::dedup::table::DedupTable;
use crate::engine::config::EngineConfig;
use crate::foundation::error::{FrameIoError, FrameIoResult};
use crate::frame::batch::FrameBatch;
use crate::listing::{Listing, list_files};
use crate::pattern::expand::{ExpandedPath, expand};
use crate::pattern::range::{FrameCount, FrameIndexRange};
use crate::pattern::template::FramePattern;
use crate::schedule::progress::{ProgressCounter, ProgressSink};
use crate::schedule::scheduler::{FrameTask, TransferScheduler};
use crate::security::confine::SecurityRoot;

/// Frames returned by a load.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedBatch {
    /// Decoded frames in logical order.
    pub frames: FrameBatch,
    /// Number of frames loaded (`frames.len()`).
    pub frame_count: usize,
    /// Logical index of each frame. For list loads, the position in the input list.
    pub indices: Vec<u64>,
    /// Source file of each frame.
    pub paths: Vec<PathBuf>,
}

/// Slice of an explicit path list: `paths[start..end]`, every `step`-th element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListSelection {
    /// First position.
    pub start: usize,
    /// Exclusive end; `None` (or anything past the list) means the list length.
    pub end: Option<usize>,
    /// Stride (`>= 1`).
    pub step: usize,
}

impl Default for ListSelection {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            step: 1,
        }
    }
}

/// Save counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveStats {
    /// Frames in the input batch.
    pub frames_total: u64,
    /// Frames encoded and written.
    pub frames_written: u64,
    /// Frames that reused the path of an identical earlier frame.
    pub frames_deduplicated: u64,
    /// Frames whose target already existed and was kept (overwrite off).
    pub frames_skipped_existing: u64,
}

/// Paths produced by a save, one per input frame, plus counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavedSequence {
    /// Same length and order as the input batch. Duplicates carry their canonical frame's path,
    /// kept files carry their existing path.
    pub paths: Vec<PathBuf>,
    /// What happened to each frame, in aggregate.
    pub stats: SaveStats,
}

enum SaveSlot {
    Write,
    Duplicate(PathBuf),
    Existing(PathBuf),
}

/// Batch load/save façade over the pattern expander, confiner, dedup table and worker pool.
///
/// Each call runs `expand -> [confine + dedup when saving] -> schedule -> assemble` and either
/// returns a complete result or fails with one error.
pub struct BatchEngine<C = ImageCodec> {
    config: EngineConfig,
    codec: C,
    scheduler: TransferScheduler,
}

impl BatchEngine<ImageCodec> {
    /// Engine with the default `image`-backed codec.
    pub fn new(config: EngineConfig) -> FrameIoResult<Self> {
        Self::with_codec(config, ImageCodec::new())
    }
}

impl<C: FrameCodec> BatchEngine<C> {
    /// Engine with a custom codec.
    pub fn with_codec(config: EngineConfig, codec: C) -> FrameIoResult<Self> {
        config.validate()?;
        let scheduler = TransferScheduler::new(&config.scheduler)?;
        tracing::debug!(threads = scheduler.threads(), "batch engine ready");
        Ok(Self {
            config,
            codec,
            scheduler,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The codec used for every frame.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Load frames named by `pattern` over `range`.
    ///
    /// Fixed counts require every file to exist unless the engine is tolerant, in which case
    /// missing files are dropped before scheduling. Auto counts load the contiguous run found
    /// at `range.start`. Zero resolved frames is [`FrameIoError::EmptySelection`].
    #[tracing::instrument(skip(self, progress), fields(pattern = %pattern))]
    pub fn load_sequence(
        &self,
        pattern: &FramePattern,
        range: &FrameIndexRange,
        progress: &dyn ProgressSink,
    ) -> FrameIoResult<LoadedBatch> {
        let mut selected = expand(pattern, range)?;

        if let FrameCount::Fixed(_) = range.count {
            if self.config.tolerant {
                let before = selected.len();
                selected.retain(|e| e.path.exists());
                if selected.len() != before {
                    tracing::debug!(
                        dropped = before - selected.len(),
                        kept = selected.len(),
                        "ignoring missing frames"
                    );
                }
            } else {
                require_all_exist(selected.iter().map(|e| e.path.as_path()))?;
            }
        }

        if selected.is_empty() {
            return Err(FrameIoError::empty_selection(format!(
                "image sequence '{pattern}' starting at {} has no frames to load",
                range.start
            )));
        }

        self.decode_all(&selected, progress)
    }

    /// Load `paths[start..end:step]`.
    ///
    /// An empty list or an empty selection is [`FrameIoError::EmptySelection`];
    /// `start >= end` (after resolving `end`) is a configuration error; every selected path
    /// must exist.
    #[tracing::instrument(skip(self, paths, progress), fields(paths = paths.len()))]
    pub fn load_list(
        &self,
        paths: &[PathBuf],
        selection: ListSelection,
        progress: &dyn ProgressSink,
    ) -> FrameIoResult<LoadedBatch> {
        if paths.is_empty() {
            return Err(FrameIoError::empty_selection("path list is empty"));
        }
        if selection.step == 0 {
            return Err(FrameIoError::configuration("list step must be >= 1"));
        }
        let total = paths.len();
        let end = match selection.end {
            Some(end) if end <= total => end,
            _ => total,
        };
        if selection.start >= end {
            return Err(FrameIoError::configuration(format!(
                "invalid frame range: start {} must be below end {end}",
                selection.start
            )));
        }

        let selected: Vec<ExpandedPath> = (selection.start..end)
            .step_by(selection.step)
            .map(|i| ExpandedPath {
                index: i as u64,
                path: paths[i].clone(),
            })
            .collect();
        if selected.is_empty() {
            return Err(FrameIoError::empty_selection(
                "no frames selected after slicing",
            ));
        }
        require_all_exist(selected.iter().map(|e| e.path.as_path()))?;

        self.decode_all(&selected, progress)
    }

    /// Save `frames` to `pattern` starting at `start_index`, confined to `root`.
    ///
    /// Every target is confined before anything is written; one rejection fails the whole call.
    /// Then, per frame in order: a frame identical to an earlier one reuses that frame's path
    /// (when dedup is on), an existing target is kept (when overwrite is off), anything else is
    /// encoded and written by the worker pool.
    ///
    /// If a write fails the call returns [`FrameIoError::SaveAborted`]; frames written before
    /// the failure stay on disk.
    #[tracing::instrument(
        skip(self, frames, progress),
        fields(frames = frames.len(), pattern = %pattern, root = %root.path().display())
    )]
    pub fn save_sequence(
        &self,
        frames: &FrameBatch,
        pattern: &FramePattern,
        start_index: u64,
        root: &SecurityRoot,
        progress: &dyn ProgressSink,
    ) -> FrameIoResult<SavedSequence> {
        self.config.encode.validate()?;
        if frames.is_empty() {
            return Err(FrameIoError::empty_selection("no frames to save"));
        }

        let expanded = expand(
            pattern,
            &FrameIndexRange::fixed(start_index, frames.len() as u64),
        )?;
        let targets = expanded
            .iter()
            .map(|e| root.admit(&e.path))
            .collect::<FrameIoResult<Vec<PathBuf>>>()?;

        let mut table = DedupTable::new();
        let mut slots = Vec::with_capacity(frames.len());
        let mut tasks = Vec::new();
        let mut stats = SaveStats {
            frames_total: frames.len() as u64,
            ..SaveStats::default()
        };

        for (ordinal, ((entry, target), frame)) in expanded
            .iter()
            .zip(&targets)
            .zip(frames.frames())
            .enumerate()
        {
            let fingerprint = if self.config.dedup {
                let fp = fingerprint_frame(frame);
                if let Some(canonical) = table.lookup(&fp) {
                    tracing::debug!(index = entry.index, canonical = %canonical.display(), "duplicate frame");
                    stats.frames_deduplicated += 1;
                    slots.push(SaveSlot::Duplicate(canonical.to_path_buf()));
                    continue;
                }
                Some(fp)
            } else {
                None
            };

            if !self.config.overwrite && target.exists() {
                tracing::debug!(index = entry.index, path = %target.display(), "keeping existing file");
                stats.frames_skipped_existing += 1;
                slots.push(SaveSlot::Existing(target.clone()));
                continue;
            }

            if let Some(fp) = fingerprint {
                table.record(fp, target.clone());
            }
            tasks.push(FrameTask {
                index: entry.index,
                path: target.clone(),
                ordinal,
            });
            slots.push(SaveSlot::Write);
        }

        let counter = ProgressCounter::begin(progress, frames.len() as u64);
        for slot in &slots {
            if !matches!(slot, SaveSlot::Write) {
                counter.advance();
            }
        }

        let written = AtomicUsize::new(0);
        let opts = self.config.encode;
        let outcomes = self
            .scheduler
            .run(
                &tasks,
                |task| {
                    let frame = frames.get(task.ordinal).ok_or_else(|| {
                        FrameIoError::configuration(format!(
                            "no frame at batch position {}",
                            task.ordinal
                        ))
                    })?;
                    self.codec.encode(frame, &opts, &task.path)?;
                    written.fetch_add(1, Ordering::AcqRel);
                    Ok(task.path.clone())
                },
                &counter,
            )
            .map_err(|e| FrameIoError::SaveAborted {
                written: written.load(Ordering::Acquire),
                source: Box::new(e),
            })?;
        stats.frames_written = outcomes.len() as u64;

        let mut written_paths = outcomes.into_iter();
        let mut paths = Vec::with_capacity(slots.len());
        for slot in slots {
            let path = match slot {
                SaveSlot::Write => written_paths
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("internal error: missing write outcome"))?
                    .result?,
                SaveSlot::Duplicate(p) | SaveSlot::Existing(p) => p,
            };
            paths.push(path);
        }

        tracing::info!(
            total = stats.frames_total,
            written = stats.frames_written,
            deduplicated = stats.frames_deduplicated,
            kept = stats.frames_skipped_existing,
            "saved sequence"
        );
        Ok(SavedSequence { paths, stats })
    }

    /// List files under `root/subfolder` using the configured listing filters.
    pub fn list(&self, root: &Path, subfolder: &str, extensions: &[&str]) -> FrameIoResult<Listing> {
        list_files(root, subfolder, extensions, &self.config.listing)
    }

    fn decode_all(
        &self,
        selected: &[ExpandedPath],
        progress: &dyn ProgressSink,
    ) -> FrameIoResult<LoadedBatch> {
        let tasks: Vec<FrameTask> = selected
            .iter()
            .enumerate()
            .map(|(ordinal, e)| FrameTask {
                index: e.index,
                path: e.path.clone(),
                ordinal,
            })
            .collect();

        let counter = ProgressCounter::begin(progress, tasks.len() as u64);
        let outcomes = self
            .scheduler
            .run(&tasks, |task| self.codec.decode(&task.path), &counter)?;

        let mut decoded = Vec::with_capacity(outcomes.len());
        for (task, outcome) in tasks.iter().zip(outcomes) {
            decoded.push((task.path.clone(), outcome.result?));
        }
        let frames = FrameBatch::concat_sourced(decoded)?;

        tracing::info!(frames = frames.len(), shape = ?frames.shape(), "loaded batch");
        Ok(LoadedBatch {
            frame_count: frames.len(),
            frames,
            indices: tasks.iter().map(|t| t.index).collect(),
            paths: tasks.into_iter().map(|t| t.path).collect(),
        })
    }
}

fn require_all_exist<'a>(mut paths: impl Iterator<Item = &'a Path>) -> FrameIoResult<()> {
    match paths.find(|p| !p.exists()) {
        Some(missing) => Err(FrameIoError::not_found(missing)),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/orchestrator.rs"]
mod tests;
