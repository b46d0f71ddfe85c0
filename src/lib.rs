//! frameseq loads and saves numbered image sequences as batches of float RGB frames.
//!
//! A sequence is named by a printf-style [`FramePattern`] (`frames/f_{:04d}.png`) and a
//! [`FrameIndexRange`]. Loads decode every selected file on a bounded worker pool and return one
//! [`FrameBatch`] in index order. Saves confine every target under a [`SecurityRoot`], skip frames
//! identical to an earlier frame of the same batch, and encode the rest in parallel.
//!
//! # Pipeline overview
//!
//! 1. **Expand**: `FramePattern + FrameIndexRange -> [(index, path)]`
//! 2. **Confine** (save only): every target must resolve under the output root
//! 3. **Dedup** (save only): exact content fingerprints map duplicates to their first path
//! 4. **Schedule**: decode or encode on [`TransferScheduler`], fail-fast, results in order
//! 5. **Assemble**: [`LoadedBatch`] or [`SavedSequence`]
//!
//! Every batch call either returns a complete result or one [`FrameIoError`]. Frames already
//! written by a failed save stay on disk.
//!
//! ```no_run
//! use frameseq::{BatchEngine, EngineConfig, FrameIndexRange, FramePattern, NoProgress};
//!
//! let engine = BatchEngine::new(EngineConfig::default())?;
//! let pattern = FramePattern::parse("frames/f_{:04d}.png")?;
//! let loaded = engine.load_sequence(&pattern, &FrameIndexRange::auto(0), &NoProgress)?;
//! println!("{:?}", loaded.frames.shape());
//! # Ok::<(), frameseq::FrameIoError>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod dedup;
mod engine;
mod foundation;
mod frame;
mod listing;
mod pattern;
mod schedule;
mod security;

pub use codec::raster::{ImageCodec, decode_bytes, encode_to_bytes};
pub use codec::{EncodeFormat, EncodeOpts, FrameCodec};
pub use dedup::fingerprint::{FrameFingerprint, fingerprint_frame};
pub use dedup::table::DedupTable;
pub use engine::config::EngineConfig;
pub use engine::orchestrator::{
    BatchEngine, ListSelection, LoadedBatch, SaveStats, SavedSequence,
};
pub use foundation::error::{FrameIoError, FrameIoResult};
pub use frame::batch::FrameBatch;
pub use frame::buffer::{CHANNELS, FrameBuffer};
pub use listing::{IMAGE_EXTENSIONS, Listing, ListingOpts, VIDEO_EXTENSIONS, list_files};
pub use pattern::expand::{ExpandedPath, expand, expand_with};
pub use pattern::range::{AUTO_DETECT_LIMIT, FrameCount, FrameIndexRange};
pub use pattern::template::FramePattern;
pub use schedule::progress::{CountingProgress, LogProgress, NoProgress, ProgressSink};
pub use schedule::scheduler::{FrameTask, SchedulerOpts, TransferOutcome, TransferScheduler};
pub use security::confine::{Confinement, SecurityRoot, confine, normalize_lexically};
