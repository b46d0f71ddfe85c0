use crate::foundation::error::{FrameIoError, FrameIoResult};

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// One frame as an `H x W x 3` row-major grid of `f32` samples.
///
/// Samples are nominally in `0..=1`. Buffers coming from callers may hold values outside that
/// range; every consumer that hashes or encodes works on a clamped view and never mutates the
/// caller's buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl FrameBuffer {
    /// Wrap interleaved RGB samples. `data.len()` must equal `width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> FrameIoResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameIoError::configuration(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = sample_count(width, height);
        if data.len() != expected {
            return Err(FrameIoError::configuration(format!(
                "frame {width}x{height} needs {expected} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A black frame.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0.0; CHANNELS])
    }

    /// A frame where every pixel has the same colour.
    pub fn filled(width: u32, height: u32, rgb: [f32; CHANNELS]) -> Self {
        let n = sample_count(width, height);
        let mut data = Vec::with_capacity(n);
        for _ in 0..n / CHANNELS {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Convert 8-bit RGB pixels into `0..=1` floats.
    pub fn from_rgb8(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img
            .as_raw()
            .iter()
            .map(|&v| f32::from(v) / 255.0)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Quantize to 8-bit RGB. Samples are clamped to `0..=1` and rounded to the nearest level.
    pub fn to_rgb8(&self) -> image::RgbImage {
        let raw: Vec<u8> = self.data.iter().map(|&v| quantize(v)).collect();
        // Length is guaranteed by construction.
        image::RgbImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }

    /// Quantize to 8-bit RGBA with an opaque alpha channel.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        let mut raw = Vec::with_capacity(self.pixel_count() * 4);
        for px in self.data.chunks_exact(CHANNELS) {
            raw.extend_from_slice(&[quantize(px[0]), quantize(px[1]), quantize(px[2]), 255]);
        }
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Return a private copy with every sample clamped to `0..=1`.
    pub fn clamped(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| v.clamp(0.0, 1.0)).collect(),
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Shape as `[height, width, channels]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, CHANNELS]
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Consume the frame and return its samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.data
    }

    /// Sample at `(x, y, channel)`, or `None` when out of bounds.
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || channel >= CHANNELS {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS + channel;
        self.data.get(i).copied()
    }

    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

fn sample_count(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

fn quantize(v: f32) -> u8 {
    // `as` saturates and maps NaN to 0.
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/frame/buffer.rs"]
mod tests;
