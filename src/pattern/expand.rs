use std::path::{Path, PathBuf};

use crate::foundation::error::FrameIoResult;
use crate::pattern::range::{AUTO_DETECT_LIMIT, FrameCount, FrameIndexRange};
use crate::pattern::template::FramePattern;

/// One concrete frame path produced by expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedPath {
    /// Logical frame index.
    pub index: u64,
    /// `pattern.format(index)`.
    pub path: PathBuf,
}

/// Expand a range into paths, ascending by logical index.
///
/// Fixed counts never touch the filesystem. [`FrameCount::Auto`] probes `start, start + 1, ...`
/// until the first missing file (or [`AUTO_DETECT_LIMIT`] hits), then keeps every `step`-th
/// discovered frame. An empty result is returned as-is; callers decide whether that is an error.
pub fn expand(pattern: &FramePattern, range: &FrameIndexRange) -> FrameIoResult<Vec<ExpandedPath>> {
    expand_with(pattern, range, |p| p.exists())
}

/// [`expand`] with a caller-supplied existence probe (only consulted in auto mode).
pub fn expand_with(
    pattern: &FramePattern,
    range: &FrameIndexRange,
    mut exists: impl FnMut(&Path) -> bool,
) -> FrameIoResult<Vec<ExpandedPath>> {
    range.validate()?;
    match range.count {
        FrameCount::Fixed(n) => {
            let mut out = Vec::with_capacity(n.min(AUTO_DETECT_LIMIT) as usize);
            for k in 0..n {
                let index = range.index_at(k)?;
                out.push(ExpandedPath {
                    index,
                    path: pattern.format(index),
                });
            }
            Ok(out)
        }
        FrameCount::Auto => {
            let mut run = Vec::new();
            let mut index = range.start;
            while (run.len() as u64) < AUTO_DETECT_LIMIT {
                let path = pattern.format(index);
                if !exists(&path) {
                    break;
                }
                run.push(ExpandedPath { index, path });
                match index.checked_add(1) {
                    Some(next) => index = next,
                    None => break,
                }
            }
            if run.len() as u64 == AUTO_DETECT_LIMIT {
                tracing::warn!(
                    pattern = %pattern,
                    limit = AUTO_DETECT_LIMIT,
                    "auto-detect stopped at the frame limit"
                );
            }
            let step = usize::try_from(range.step).unwrap_or(usize::MAX);
            Ok(run.into_iter().step_by(step).collect())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/expand.rs"]
mod tests;
