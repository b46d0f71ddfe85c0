use xxhash_rust::xxh3::Xxh3;

use crate::frame::buffer::FrameBuffer;

const XXH3_SEED: u64 = 0x5f3c_9a1e_d24b_7c06;

/// 128-bit content digest of a clamped frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for FrameFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint a frame.
///
/// Hashes the dimensions followed by every sample of a clamped copy as little-endian `f32` bits,
/// in storage order. The seed is fixed, so digests are stable across runs and processes.
pub fn fingerprint_frame(frame: &FrameBuffer) -> FrameFingerprint {
    let clamped = frame.clamped();
    let mut h = StableHasher::new();
    h.write_u32(clamped.width());
    h.write_u32(clamped.height());
    for &v in clamped.samples() {
        h.write_f32(v);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dedup/fingerprint.rs"]
mod tests;
