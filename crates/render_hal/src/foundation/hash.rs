//! Incremental content hashing for resource identity
//!
//! Implements MurmurHash2A (Austin Appleby) in its incremental form. Input may
//! be fed in any number of chunks of any size; the digest only depends on the
//! concatenated byte stream:
//!
//! ```
//! use render_hal::foundation::hash::{calculate_murmur_hash, MurmurHash2A};
//!
//! let mut hasher = MurmurHash2A::new(0);
//! hasher.add(b"tex");
//! hasher.add(b"tures/brick.png");
//! assert_eq!(hasher.end(), calculate_murmur_hash(b"textures/brick.png"));
//! ```
//!
//! The resource caches key their maps through [`BuildMurmurHasher`], so any
//! `Hash` description (vertex layouts, sampler states, texture names) gets its
//! identity from the same function.

use std::hash::{BuildHasher, Hash, Hasher};

const M: u32 = 0x5bd1e995;
const R: u32 = 24;

#[inline]
const fn mmix(h: u32, k: u32) -> u32 {
    let mut k = k.wrapping_mul(M);
    k ^= k >> R;
    k = k.wrapping_mul(M);
    h.wrapping_mul(M) ^ k
}

/// Streaming MurmurHash2A state
///
/// Usage: `begin(seed)`, any number of `add(bytes)`, then exactly one `end()`.
/// Calling `add` or `end` again after `end` without a new `begin` is a
/// precondition violation and panics in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MurmurHash2A {
    hash: u32,
    tail: u32,
    count: u32,
    size: u32,
    finished: bool,
}

impl MurmurHash2A {
    /// Create a hasher already begun with `seed`
    pub const fn new(seed: u32) -> Self {
        Self {
            hash: seed,
            tail: 0,
            count: 0,
            size: 0,
            finished: false,
        }
    }

    /// Reset the state and start a new digest
    pub fn begin(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    /// Feed bytes into the digest
    pub fn add(&mut self, data: &[u8]) {
        debug_assert!(!self.finished, "MurmurHash2A::add called after end() without begin()");

        // Total length is mixed modulo 2^32, as in the reference 32-bit hash.
        self.size = self.size.wrapping_add(data.len() as u32);

        let mut data = self.mix_tail(data);

        while data.len() >= 4 {
            let k = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            self.hash = mmix(self.hash, k);
            data = &data[4..];
        }

        let rest = self.mix_tail(data);
        debug_assert!(rest.is_empty());
    }

    /// Finalize and return the digest
    pub fn end(&mut self) -> u32 {
        debug_assert!(!self.finished, "MurmurHash2A::end called twice without begin()");
        self.finished = true;

        let mut h = mmix(self.hash, self.tail);
        h = mmix(h, self.size);

        h ^= h >> 13;
        h = h.wrapping_mul(M);
        h ^= h >> 15;
        h
    }

    /// Total number of bytes fed since `begin`, modulo 2^32
    pub const fn bytes_processed(&self) -> u32 {
        self.size
    }

    /// Consume leading bytes into the tail while the tail is partially filled
    /// or fewer than four bytes remain. Returns the unconsumed slice.
    fn mix_tail<'a>(&mut self, mut data: &'a [u8]) -> &'a [u8] {
        while let Some((&byte, rest)) = data.split_first() {
            if data.len() >= 4 && self.count == 0 {
                break;
            }

            self.tail |= u32::from(byte) << (self.count * 8);
            self.count += 1;
            data = rest;

            if self.count == 4 {
                self.hash = mmix(self.hash, self.tail);
                self.tail = 0;
                self.count = 0;
            }
        }
        data
    }
}

impl Default for MurmurHash2A {
    fn default() -> Self {
        Self::new(0)
    }
}

/// One-shot MurmurHash2A with seed 0
pub fn calculate_murmur_hash(data: &[u8]) -> u32 {
    let mut murmur = MurmurHash2A::new(0);
    murmur.add(data);
    murmur.end()
}

/// `std::hash::Hasher` adapter over [`MurmurHash2A`]
///
/// `finish` finalizes a copy of the state, so the hasher can keep accepting
/// writes afterwards as the `Hasher` contract requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct MurmurHasher {
    state: MurmurHash2A,
}

impl MurmurHasher {
    /// Create a hasher with the given seed
    pub const fn with_seed(seed: u32) -> Self {
        Self {
            state: MurmurHash2A::new(seed),
        }
    }

    /// Finalize to the native 32-bit digest
    pub fn finish_u32(&self) -> u32 {
        let mut state = self.state;
        state.end()
    }
}

impl Hasher for MurmurHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.state.add(bytes);
    }

    fn finish(&self) -> u64 {
        u64::from(self.finish_u32())
    }
}

/// `BuildHasher` producing seeded [`MurmurHasher`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildMurmurHasher {
    seed: u32,
}

impl BuildMurmurHasher {
    /// Create a builder with the given seed
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Seed handed to every hasher this builder creates
    pub const fn seed(&self) -> u32 {
        self.seed
    }
}

impl BuildHasher for BuildMurmurHasher {
    type Hasher = MurmurHasher;

    fn build_hasher(&self) -> MurmurHasher {
        MurmurHasher::with_seed(self.seed)
    }
}

/// Content hash of any `Hash` value, as the caches see it
pub fn content_hash<T: Hash + ?Sized>(value: &T, seed: u32) -> u32 {
    let mut hasher = MurmurHasher::with_seed(seed);
    value.hash(&mut hasher);
    hasher.finish_u32()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_chunks(chunks: &[&[u8]]) -> u32 {
        let mut hasher = MurmurHash2A::new(0);
        for chunk in chunks {
            hasher.add(chunk);
        }
        hasher.end()
    }

    #[test]
    fn test_known_values() {
        assert_eq!(calculate_murmur_hash(b""), 0);
        assert_eq!(calculate_murmur_hash(b"a"), 0x0803_888b);
        assert_eq!(calculate_murmur_hash(b"abc"), 0x1158_9f67);
        assert_eq!(calculate_murmur_hash(b"abcd"), 0x5c19_3c47);
        assert_eq!(calculate_murmur_hash(b"abcdefg"), 0x362d_0a55);
        assert_eq!(calculate_murmur_hash(b"hello world"), 0x9dfc_8997);
        assert_eq!(calculate_murmur_hash(b"textures/brick.png"), 0xc7a8_2a6f);
    }

    #[test]
    fn test_seed_changes_digest() {
        let mut hasher = MurmurHash2A::new(0x9747_b28c);
        hasher.add(b"abc");
        assert_eq!(hasher.end(), 0x4e0e_2aa7);
    }

    #[test]
    fn test_abc_split_into_single_bytes() {
        assert_eq!(hash_chunks(&[b"a", b"b", b"c"]), hash_chunks(&[b"abc"]));
    }

    #[test]
    fn test_seven_bytes_split_three_four() {
        // 3 bytes fill the tail, the 4th completes a block, 3 carry to end()
        assert_eq!(hash_chunks(&[b"abc", b"defg"]), calculate_murmur_hash(b"abcdefg"));
        assert_eq!(hash_chunks(&[b"abcd", b"efg"]), calculate_murmur_hash(b"abcdefg"));
    }

    #[test]
    fn test_streaming_invariance_all_splits() {
        let data: Vec<u8> = (0u8..=40).map(|i| i.wrapping_mul(37) ^ 0x5a).collect();
        let expected = calculate_murmur_hash(&data);

        for first in 0..=data.len() {
            for second in first..=data.len() {
                let got = hash_chunks(&[&data[..first], &data[first..second], &data[second..]]);
                assert_eq!(got, expected, "split at {first}/{second}");
            }
        }
    }

    #[test]
    fn test_empty_adds_are_neutral() {
        assert_eq!(hash_chunks(&[b"", b"ab", b"", b"c", b""]), calculate_murmur_hash(b"abc"));
    }

    #[test]
    fn test_begin_resets() {
        let mut hasher = MurmurHash2A::new(0);
        hasher.add(b"garbage");
        let _ = hasher.end();

        hasher.begin(0);
        hasher.add(b"abc");
        assert_eq!(hasher.bytes_processed(), 3);
        assert_eq!(hasher.end(), calculate_murmur_hash(b"abc"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "after end()")]
    fn test_add_after_end_panics_in_debug() {
        let mut hasher = MurmurHash2A::new(0);
        let _ = hasher.end();
        hasher.add(b"x");
    }

    #[test]
    fn test_hasher_adapter_matches_streaming() {
        let mut hasher = MurmurHasher::default();
        hasher.write(b"ab");
        hasher.write(b"c");
        assert_eq!(hasher.finish(), u64::from(calculate_murmur_hash(b"abc")));

        // finish does not consume the state
        hasher.write(b"d");
        assert_eq!(hasher.finish_u32(), calculate_murmur_hash(b"abcd"));
    }

    #[test]
    fn test_content_hash_is_deterministic() {
        let key = ("diffuse", 3u32);
        assert_eq!(content_hash(&key, 0), content_hash(&key, 0));
        assert_ne!(content_hash(&key, 0), content_hash(&("diffuse", 4u32), 0));
    }
}
