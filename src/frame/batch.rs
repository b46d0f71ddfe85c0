use std::path::PathBuf;

use crate::foundation::error::{FrameIoError, FrameIoResult};
use crate::frame::buffer::{CHANNELS, FrameBuffer};

/// An ordered stack of equally shaped frames, batch axis first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameBatch {
    frames: Vec<FrameBuffer>,
}

impl FrameBatch {
    /// Concatenate frames along the batch axis.
    ///
    /// All frames must share the dimensions of the first one.
    pub fn concat(frames: Vec<FrameBuffer>) -> FrameIoResult<Self> {
        if let Some(first) = frames.first() {
            let expected = first.dimensions();
            for (i, f) in frames.iter().enumerate().skip(1) {
                if f.dimensions() != expected {
                    return Err(FrameIoError::ShapeMismatch {
                        path: PathBuf::from(format!("<batch item {i}>")),
                        expected,
                        found: f.dimensions(),
                    });
                }
            }
        }
        Ok(Self { frames })
    }

    /// Concatenate decoded frames, naming the source file of any frame whose shape differs.
    pub(crate) fn concat_sourced(frames: Vec<(PathBuf, FrameBuffer)>) -> FrameIoResult<Self> {
        let mut expected = None;
        let mut out = Vec::with_capacity(frames.len());
        for (path, frame) in frames {
            let dims = frame.dimensions();
            match expected {
                None => expected = Some(dims),
                Some(e) if e != dims => {
                    return Err(FrameIoError::ShapeMismatch {
                        path,
                        expected: e,
                        found: dims,
                    });
                }
                Some(_) => {}
            }
            out.push(frame);
        }
        Ok(Self { frames: out })
    }

    /// Append another batch. Shapes must agree.
    pub fn extend(&mut self, other: FrameBatch) -> FrameIoResult<()> {
        if let (Some(a), Some(b)) = (self.frames.first(), other.frames.first())
            && a.dimensions() != b.dimensions()
        {
            return Err(FrameIoError::ShapeMismatch {
                path: PathBuf::from(format!("<batch item {}>", self.frames.len())),
                expected: a.dimensions(),
                found: b.dimensions(),
            });
        }
        self.frames.extend(other.frames);
        Ok(())
    }

    /// Number of frames in the batch.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the batch holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Shape as `[batch, height, width, channels]`. An empty batch reports all zeros.
    pub fn shape(&self) -> [usize; 4] {
        match self.frames.first() {
            Some(f) => {
                let [h, w, c] = f.shape();
                [self.frames.len(), h, w, c]
            }
            None => [0, 0, 0, 0],
        }
    }

    /// Borrow frame `i`.
    pub fn get(&self, i: usize) -> Option<&FrameBuffer> {
        self.frames.get(i)
    }

    /// Borrow all frames in batch order.
    pub fn frames(&self) -> &[FrameBuffer] {
        &self.frames
    }

    /// Consume the batch and return its frames.
    pub fn into_frames(self) -> Vec<FrameBuffer> {
        self.frames
    }

    /// Copy every sample into one contiguous `B x H x W x 3` vector.
    pub fn to_contiguous(&self) -> Vec<f32> {
        let [b, h, w, _] = self.shape();
        let mut out = Vec::with_capacity(b * h * w * CHANNELS);
        for f in &self.frames {
            out.extend_from_slice(f.samples());
        }
        out
    }
}

impl From<FrameBuffer> for FrameBatch {
    fn from(frame: FrameBuffer) -> Self {
        Self {
            frames: vec![frame],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/batch.rs"]
mod tests;
