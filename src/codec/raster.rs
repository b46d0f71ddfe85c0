use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;

use crate::codec::{EncodeFormat, EncodeOpts, FrameCodec};
use crate::foundation::error::{FrameIoError, FrameIoResult};
use crate::frame::buffer::FrameBuffer;

// libwebp wants a timestamp for the end of the (single-frame) animation.
const SINGLE_FRAME_DURATION_MS: i32 = 100;

/// Default codec: any format the `image` crate can read; PNG/WebP output.
///
/// Lossy WebP is produced by libwebp through `webp-animation` as a one-frame animation, which
/// every WebP reader (including `image`) decodes as a still.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec;

impl ImageCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }
}

impl FrameCodec for ImageCodec {
    fn decode(&self, path: &Path) -> FrameIoResult<FrameBuffer> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FrameIoError::not_found(path),
            _ => FrameIoError::Decode {
                path: path.to_path_buf(),
                cause: anyhow::Error::new(e).context("read frame file"),
            },
        })?;
        decode_rgb(&bytes).map_err(|cause| FrameIoError::Decode {
            path: path.to_path_buf(),
            cause,
        })
    }

    fn encode(&self, frame: &FrameBuffer, opts: &EncodeOpts, path: &Path) -> FrameIoResult<()> {
        let bytes = encode_bytes(frame, opts).map_err(|cause| FrameIoError::Encode {
            path: path.to_path_buf(),
            cause,
        })?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| FrameIoError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, bytes).map_err(|source| FrameIoError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Decode encoded image bytes into a `0..=1` RGB frame. Alpha is dropped.
pub fn decode_bytes(bytes: &[u8]) -> FrameIoResult<FrameBuffer> {
    Ok(decode_rgb(bytes)?)
}

/// Encode a frame (clamped, quantized to 8 bits) into container bytes.
pub fn encode_to_bytes(frame: &FrameBuffer, opts: &EncodeOpts) -> FrameIoResult<Vec<u8>> {
    opts.validate()?;
    Ok(encode_bytes(frame, opts)?)
}

fn decode_rgb(bytes: &[u8]) -> anyhow::Result<FrameBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(FrameBuffer::from_rgb8(&dyn_img.to_rgb8()))
}

fn encode_bytes(frame: &FrameBuffer, opts: &EncodeOpts) -> anyhow::Result<Vec<u8>> {
    match (opts.format, opts.lossless) {
        (EncodeFormat::Png, _) => write_with_image(frame, image::ImageFormat::Png),
        (EncodeFormat::WebP, true) => write_with_image(frame, image::ImageFormat::WebP),
        (EncodeFormat::WebP, false) => encode_lossy_webp(frame, opts.quality, opts.method),
    }
}

fn write_with_image(frame: &FrameBuffer, format: image::ImageFormat) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(frame.to_rgb8())
        .write_to(&mut Cursor::new(&mut buf), format)
        .with_context(|| format!("encode {format:?}"))?;
    Ok(buf)
}

fn encode_lossy_webp(frame: &FrameBuffer, quality: u8, method: u8) -> anyhow::Result<Vec<u8>> {
    let rgba = frame.to_rgba8();
    let options = webp_animation::EncoderOptions {
        encoding_config: Some(webp_animation::EncodingConfig {
            encoding_type: webp_animation::EncodingType::Lossy(
                webp_animation::LossyEncodingConfig::default(),
            ),
            quality: f32::from(quality),
            method: usize::from(method),
        }),
        ..Default::default()
    };
    let mut encoder = webp_animation::Encoder::new_with_options(frame.dimensions(), options)
        .map_err(|e| anyhow::anyhow!("create WebP encoder: {e:?}"))?;
    encoder
        .add_frame(rgba.as_raw(), 0)
        .map_err(|e| anyhow::anyhow!("add WebP frame: {e:?}"))?;
    let data = encoder
        .finalize(SINGLE_FRAME_DURATION_MS)
        .map_err(|e| anyhow::anyhow!("finalize WebP: {e:?}"))?;
    Ok(data.to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/codec/raster.rs"]
mod tests;
