//! String hashing for value dimensions
//!
//! Free-text identifiers (swid, postal code) are loaded as integer fields by
//! hashing them to 32 bits. The loader and the `--hash` lookup command must
//! agree on the function, so both go through [`StringHasher`].

/// Maps a string to a non-negative integer that fits the value frames.
pub trait StringHasher: Send + Sync {
    fn hash(&self, value: &str) -> i64;
}

/// 32-bit MurmurHash2 with a fixed seed, widened to `i64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur2 {
    seed: u32,
}

impl Murmur2 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    pub fn hash32(&self, data: &[u8]) -> u32 {
        const M: u32 = 0x5bd1_e995;
        const R: u32 = 24;

        let mut h = self.seed ^ (data.len() as u32);

        let mut chunks = data.chunks_exact(4);
        for chunk in &mut chunks {
            let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            k = k.wrapping_mul(M);
            k ^= k >> R;
            k = k.wrapping_mul(M);

            h = h.wrapping_mul(M);
            h ^= k;
        }

        let tail = chunks.remainder();
        if tail.len() == 3 {
            h ^= u32::from(tail[2]) << 16;
        }
        if tail.len() >= 2 {
            h ^= u32::from(tail[1]) << 8;
        }
        if !tail.is_empty() {
            h ^= u32::from(tail[0]);
            h = h.wrapping_mul(M);
        }

        h ^= h >> 13;
        h = h.wrapping_mul(M);
        h ^= h >> 15;
        h
    }
}

impl StringHasher for Murmur2 {
    fn hash(&self, value: &str) -> i64 {
        i64::from(self.hash32(value.as_bytes()))
    }
}
