//! Frame path templates and index ranges.
//!
//! A [`FramePattern`](template::FramePattern) turns a logical frame index into a path; a
//! [`FrameIndexRange`](range::FrameIndexRange) selects the indices; [`expand`](expand::expand)
//! combines both into an ordered path list.

/// Range expansion into concrete paths.
pub mod expand;
/// Frame index selections.
pub mod range;
/// Single-placeholder path templates.
pub mod template;
