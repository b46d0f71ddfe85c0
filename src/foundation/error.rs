use std::path::PathBuf;

/// Convenience result type used across frameseq.
pub type FrameIoResult<T> = Result<T, FrameIoError>;

/// Top-level error taxonomy used by the batch engine.
///
/// Every batch operation fails as a whole with exactly one of these values; there are no partial
/// successes.
#[derive(thiserror::Error, Debug)]
pub enum FrameIoError {
    /// Invalid pattern, range or option values.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A selection resolved to zero frames.
    #[error("empty selection: {0}")]
    EmptySelection(String),

    /// A required frame file does not exist.
    #[error("frame does not exist: '{}'", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A write target resolved outside the security root.
    #[error(
        "permission denied: '{}' is outside the output root '{}' ({reason})",
        path.display(),
        root.display()
    )]
    PermissionDenied {
        /// The rejected target, after normalization.
        path: PathBuf,
        /// The configured root.
        root: PathBuf,
        /// Why the target was rejected.
        reason: String,
    },

    /// A frame file could not be decoded.
    #[error("decode error for '{}': {cause:#}", path.display())]
    Decode {
        /// The file being decoded.
        path: PathBuf,
        /// Underlying codec error.
        cause: anyhow::Error,
    },

    /// A frame could not be encoded.
    #[error("encode error for '{}': {cause:#}", path.display())]
    Encode {
        /// The intended output path.
        path: PathBuf,
        /// Underlying codec error.
        cause: anyhow::Error,
    },

    /// Encoded bytes could not be written to disk.
    #[error("write error for '{}': {source}", path.display())]
    Write {
        /// The output path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A task was never started because a sibling task failed first.
    #[error("transfer cancelled before ordinal {ordinal} started")]
    Cancelled {
        /// Ordinal of the task that was dropped.
        ordinal: usize,
    },

    /// A decoded frame does not match the shape of the rest of the batch.
    #[error(
        "frame '{}' is {}x{}, expected {}x{} to match the batch",
        path.display(),
        found.0,
        found.1,
        expected.0,
        expected.1
    )]
    ShapeMismatch {
        /// The offending frame.
        path: PathBuf,
        /// `(width, height)` of the first frame in the batch.
        expected: (u32, u32),
        /// `(width, height)` of the offending frame.
        found: (u32, u32),
    },

    /// A save failed after some frames were already on disk.
    #[error(
        "save aborted after {written} frame(s) were written; files already on disk are not rolled back: {source}"
    )]
    SaveAborted {
        /// Frames fully written before the failure was observed.
        written: usize,
        /// The error that aborted the batch.
        source: Box<FrameIoError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameIoError {
    /// Build a [`FrameIoError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`FrameIoError::EmptySelection`] value.
    pub fn empty_selection(msg: impl Into<String>) -> Self {
        Self::EmptySelection(msg.into())
    }

    /// Build a [`FrameIoError::NotFound`] value.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Strip [`FrameIoError::SaveAborted`] wrappers and return the error that caused the failure.
    pub fn root_cause(&self) -> &FrameIoError {
        match self {
            Self::SaveAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// `true` for errors raised before any task was scheduled (bad input, not bad data).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::Configuration(_) | Self::EmptySelection(_) | Self::PermissionDenied { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
