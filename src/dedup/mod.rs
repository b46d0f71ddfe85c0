//! Intra-batch deduplication of identical frames.
//!
//! Two frames are duplicates when their clamped samples are bit-identical. Frames that differ only
//! by tiny float noise are *not* merged; this is exact matching, not perceptual similarity.

/// Stable content fingerprints.
pub mod fingerprint;
/// Per-batch fingerprint to canonical path table.
pub mod table;
