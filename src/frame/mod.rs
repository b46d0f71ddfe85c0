//! In-memory frame representation.
//!
//! A [`FrameBuffer`] is one `H x W x 3` float image with samples nominally in `0..=1`; a
//! [`FrameBatch`] is a stack of equally shaped buffers (the batch axis comes first).

/// Ordered stacks of equally shaped frames.
pub mod batch;
/// Single-frame float RGB buffers.
pub mod buffer;
