use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::dedup::fingerprint::FrameFingerprint;

/// Fingerprint to canonical path, scoped to one save batch.
///
/// The first frame recorded for a fingerprint is canonical; later duplicates reuse its path. A
/// table is created per call and dropped with it, so nothing carries over between batches.
#[derive(Debug, Default)]
pub struct DedupTable {
    entries: HashMap<FrameFingerprint, PathBuf>,
}

impl DedupTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical path for `fp`, if one was recorded.
    pub fn lookup(&self, fp: &FrameFingerprint) -> Option<&Path> {
        self.entries.get(fp).map(PathBuf::as_path)
    }

    /// Record `path` as canonical for `fp`. An existing entry is kept.
    pub fn record(&mut self, fp: FrameFingerprint, path: PathBuf) {
        self.entries.entry(fp).or_insert(path);
    }

    /// Number of distinct fingerprints recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dedup/table.rs"]
mod tests;
