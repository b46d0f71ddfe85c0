use crate::foundation::error::{FrameIoError, FrameIoResult};

/// Upper bound on frames discovered by [`FrameCount::Auto`].
pub const AUTO_DETECT_LIMIT: u64 = 100_000;

/// How many frames a range selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameCount {
    /// Exactly this many frames.
    Fixed(u64),
    /// The longest contiguous run of existing files starting at `start`, up to
    /// [`AUTO_DETECT_LIMIT`] frames.
    #[default]
    Auto,
}

impl FrameCount {
    /// Map the host convention where `0` means "detect".
    pub fn from_host(count: u64) -> Self {
        if count == 0 { Self::Auto } else { Self::Fixed(count) }
    }
}

/// A selection of frame indices: `start, start + step, ...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameIndexRange {
    /// First index.
    pub start: u64,
    /// Number of indices, or auto-detection.
    pub count: FrameCount,
    /// Distance between consecutive indices (`>= 1`).
    pub step: u64,
}

impl FrameIndexRange {
    /// Create a validated range.
    pub fn new(start: u64, count: FrameCount, step: u64) -> FrameIoResult<Self> {
        let range = Self { start, count, step };
        range.validate()?;
        Ok(range)
    }

    /// `count` frames starting at `start`, step 1.
    pub fn fixed(start: u64, count: u64) -> Self {
        Self {
            start,
            count: FrameCount::Fixed(count),
            step: 1,
        }
    }

    /// Auto-detected run starting at `start`, step 1.
    pub fn auto(start: u64) -> Self {
        Self {
            start,
            count: FrameCount::Auto,
            step: 1,
        }
    }

    /// Return a copy with a different step.
    pub fn with_step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Check `step >= 1` and that the last index fits in `u64`.
    pub fn validate(&self) -> FrameIoResult<()> {
        if self.step == 0 {
            return Err(FrameIoError::configuration("frame range step must be >= 1"));
        }
        if let FrameCount::Fixed(n) = self.count
            && n > 0
        {
            self.index_at(n - 1)?;
        }
        Ok(())
    }

    /// Index of the `k`-th selected frame.
    pub fn index_at(&self, k: u64) -> FrameIoResult<u64> {
        k.checked_mul(self.step)
            .and_then(|off| self.start.checked_add(off))
            .ok_or_else(|| {
                FrameIoError::configuration(format!(
                    "frame range overflows: start {} + {k} * step {}",
                    self.start, self.step
                ))
            })
    }
}

impl Default for FrameIndexRange {
    fn default() -> Self {
        Self::auto(0)
    }
}
