use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::codec::{EncodeFormat, EncodeOpts};
use crate::foundation::error::{FrameIoError, FrameIoResult};
use crate::listing::ListingOpts;
use crate::schedule::scheduler::SchedulerOpts;

/// Every knob of the batch engine in one place.
///
/// Defaults: strict loads, dedup on, overwrite on, lossy WebP at quality 95 / method 6,
/// `2 x` available parallelism workers, flat uncapped listing.
///
/// ```
/// use frameseq::EngineConfig;
///
/// let cfg = EngineConfig::default().tolerant(true).lossless(true).threads(4);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed-count sequence loads drop missing files instead of failing.
    pub tolerant: bool,
    /// Skip encoding frames identical to an earlier frame of the same save batch.
    pub dedup: bool,
    /// Replace existing files on save. When off, existing targets are kept and reported as-is.
    pub overwrite: bool,
    /// Encoder settings for saves.
    pub encode: EncodeOpts,
    /// Worker pool sizing.
    pub scheduler: SchedulerOpts,
    /// Directory listing filters.
    pub listing: ListingOpts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerant: false,
            dedup: true,
            overwrite: true,
            encode: EncodeOpts::default(),
            scheduler: SchedulerOpts::default(),
            listing: ListingOpts::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> FrameIoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FrameIoError::configuration(format!("open config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse JSON config from a reader.
    pub fn from_reader(r: impl Read) -> FrameIoResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| FrameIoError::configuration(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> FrameIoResult<()> {
        self.encode.validate()?;
        if self.scheduler.threads == Some(0) {
            return Err(FrameIoError::configuration("threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Set [`EngineConfig::tolerant`].
    pub fn tolerant(mut self, on: bool) -> Self {
        self.tolerant = on;
        self
    }

    /// Set [`EngineConfig::dedup`].
    pub fn dedup(mut self, on: bool) -> Self {
        self.dedup = on;
        self
    }

    /// Set [`EngineConfig::overwrite`].
    pub fn overwrite(mut self, on: bool) -> Self {
        self.overwrite = on;
        self
    }

    /// Set [`EncodeOpts::lossless`].
    pub fn lossless(mut self, on: bool) -> Self {
        self.encode.lossless = on;
        self
    }

    /// Set [`EncodeOpts::quality`].
    pub fn quality(mut self, quality: u8) -> Self {
        self.encode.quality = quality;
        self
    }

    /// Set [`EncodeOpts::method`].
    pub fn method(mut self, method: u8) -> Self {
        self.encode.method = method;
        self
    }

    /// Set [`EncodeOpts::format`].
    pub fn format(mut self, format: EncodeFormat) -> Self {
        self.encode.format = format;
        self
    }

    /// Set [`SchedulerOpts::threads`].
    pub fn threads(mut self, threads: usize) -> Self {
        self.scheduler.threads = Some(threads);
        self
    }

    /// Set [`ListingOpts::recursive`].
    pub fn recursive(mut self, on: bool) -> Self {
        self.listing.recursive = on;
        self
    }

    /// Set [`ListingOpts::filter`].
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.listing.filter = filter.into();
        self
    }

    /// Set [`ListingOpts::cap`].
    pub fn cap(mut self, cap: usize) -> Self {
        self.listing.cap = cap;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
