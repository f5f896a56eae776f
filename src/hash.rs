//! Deterministic hashing utilities.
//!
//! Maze fingerprints must agree across processes, platforms and runs so a
//! level can be identified by `(width, height, seed)` and checked against a
//! stored value. `std::collections::hash_map::DefaultHasher` is randomly
//! seeded per process, so this module provides a fixed FNV-1a hasher instead.
//!
//! # Usage
//!
//! ```
//! use labyrinth::hash::{DeterministicHasher, fnv1a_hash};
//! use std::hash::{Hash, Hasher};
//!
//! let mut hasher = DeterministicHasher::new();
//! (21u64, 21u64).hash(&mut hasher);
//! let hash1 = hasher.finish();
//!
//! let hash2 = fnv1a_hash(&(21u64, 21u64));
//! assert_eq!(hash1, hash2);
//! ```
//!
//! FNV-1a is NOT cryptographically secure. It only has to tell mazes apart.

use std::hash::{Hash, Hasher};

/// FNV-1a 64-bit offset basis constant.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime constant.
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// A deterministic hasher using the FNV-1a algorithm.
///
/// # Example
///
/// ```
/// use labyrinth::hash::DeterministicHasher;
/// use std::hash::{Hash, Hasher};
///
/// let mut hasher = DeterministicHasher::new();
/// 42u32.hash(&mut hasher);
/// let hash = hasher.finish();
///
/// let mut hasher2 = DeterministicHasher::new();
/// 42u32.hash(&mut hasher2);
/// assert_eq!(hash, hasher2.finish());
/// ```
#[derive(Debug, Clone)]
pub struct DeterministicHasher {
    state: u64,
}

impl DeterministicHasher {
    /// Creates a new `DeterministicHasher` with the standard FNV-1a offset basis.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for DeterministicHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for DeterministicHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    // Fixed little-endian encoding keeps fingerprints identical on big-endian targets
    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.write(&value.to_le_bytes());
    }
}

/// Computes a deterministic FNV-1a hash of the given value.
///
/// # Example
///
/// ```
/// use labyrinth::hash::fnv1a_hash;
///
/// let hash = fnv1a_hash(&42u32);
/// assert_eq!(hash, fnv1a_hash(&42u32));
/// assert_ne!(hash, fnv1a_hash(&43u32));
/// ```
#[inline]
pub fn fnv1a_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DeterministicHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
