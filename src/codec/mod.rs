//! Frame codecs: file bytes to [`FrameBuffer`] and back.
//!
//! The batch engine only talks to the [`FrameCodec`] trait. [`raster::ImageCodec`] is the default
//! implementation backed by the `image` crate (decode, PNG, lossless WebP) and `webp-animation`
//! (lossy WebP).

use std::path::Path;

use crate::foundation::error::{FrameIoError, FrameIoResult};
use crate::frame::buffer::FrameBuffer;

/// `image`/libwebp backed codec.
pub mod raster;

/// Output container for saved frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    /// WebP, lossy or lossless.
    #[default]
    WebP,
    /// PNG (always lossless).
    Png,
}

impl EncodeFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Png => "png",
        }
    }
}

/// Encoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeOpts {
    /// Output container.
    pub format: EncodeFormat,
    /// Lossless compression. PNG ignores this flag.
    pub lossless: bool,
    /// Lossy quality, `1..=100`.
    pub quality: u8,
    /// WebP compression effort, `0..=6` (slower is smaller).
    pub method: u8,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            format: EncodeFormat::WebP,
            lossless: false,
            quality: 95,
            method: 6,
        }
    }
}

impl EncodeOpts {
    /// Reject out-of-range quality and method values.
    pub fn validate(&self) -> FrameIoResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(FrameIoError::configuration(format!(
                "encode quality must be in 1..=100, got {}",
                self.quality
            )));
        }
        if self.method > 6 {
            return Err(FrameIoError::configuration(format!(
                "encode method must be in 0..=6, got {}",
                self.method
            )));
        }
        Ok(())
    }
}

/// Reads and writes single frames.
///
/// Implementations are shared across worker threads.
pub trait FrameCodec: Send + Sync {
    /// Read and decode the file at `path`.
    ///
    /// Fails with [`FrameIoError::NotFound`] when the file is missing and
    /// [`FrameIoError::Decode`] when its bytes are not a supported image.
    fn decode(&self, path: &Path) -> FrameIoResult<FrameBuffer>;

    /// Encode `frame` and write it to `path`, creating parent directories.
    ///
    /// Fails with [`FrameIoError::Encode`] or [`FrameIoError::Write`].
    fn encode(&self, frame: &FrameBuffer, opts: &EncodeOpts, path: &Path) -> FrameIoResult<()>;
}
