//! Short code generation.
//!
//! Generators only propose candidates. Uniqueness is enforced by the store's
//! atomic insert-if-absent, and the shorten service retries on collision.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::{Rng, distr::Alphanumeric};

/// URL-safe base62 alphabet used for every generated code.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default code length. 62^7 is about 3.5e12 codes.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Longest code accepted on the redirect path.
pub const MAX_CODE_LENGTH: usize = 64;

/// Longest code the sequential strategy supports (62^10 fits in a `u64`).
pub const MAX_SEQUENTIAL_CODE_LENGTH: usize = 10;

/// Codes that collide with static routes at the root of the router.
pub const RESERVED_CODES: &[&str] = &["api", "health"];

/// Odd and not divisible by 31, hence coprime with every power of 62.
const SCRAMBLE_MULTIPLIER: u128 = 0x5DEE_CE66D;

/// Raised when a generator has no unused candidates left.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("short code space exhausted: all {capacity} codes of length {length} issued")]
pub struct CodeSpaceExhausted {
    pub length: usize,
    pub capacity: u64,
}

/// Produces candidate short codes.
pub trait CodeGenerator: Send + Sync {
    /// Returns the next candidate code.
    ///
    /// # Errors
    ///
    /// Returns [`CodeSpaceExhausted`] when no further candidates exist.
    fn generate(&self) -> Result<String, CodeSpaceExhausted>;

    /// Length of generated codes.
    fn code_length(&self) -> usize;
}

/// Uniformly random base62 codes.
///
/// Never reports exhaustion: with a sensible length repeated collisions are
/// astronomically unlikely, and the bounded retry loop handles the rest.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> Result<String, CodeSpaceExhausted> {
        Ok(rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect())
    }

    fn code_length(&self) -> usize {
        self.length
    }
}

/// Counter-based codes that never repeat within one process.
///
/// The counter is passed through the bijection
/// `i -> (i * SCRAMBLE_MULTIPLIER + offset) mod 62^len`, so consecutive codes
/// do not look consecutive. Once all `62^len` values have been issued the
/// generator reports [`CodeSpaceExhausted`].
///
/// Seed it with the number of stored links (see [`SequentialCodeGenerator::with_offset`])
/// so a restart continues where the previous process stopped.
#[derive(Debug)]
pub struct SequentialCodeGenerator {
    length: usize,
    capacity: u64,
    counter: AtomicU64,
}

impl SequentialCodeGenerator {
    /// # Panics
    ///
    /// Panics if `length` is 0 or above [`MAX_SEQUENTIAL_CODE_LENGTH`];
    /// configuration validation rejects such lengths first.
    pub fn new(length: usize) -> Self {
        Self::with_offset(length, 0)
    }

    /// Starts issuing from the `offset`-th code.
    pub fn with_offset(length: usize, offset: u64) -> Self {
        assert!(
            (1..=MAX_SEQUENTIAL_CODE_LENGTH).contains(&length),
            "sequential code length must be between 1 and {MAX_SEQUENTIAL_CODE_LENGTH}"
        );

        Self {
            length,
            capacity: 62u64.pow(length as u32),
            counter: AtomicU64::new(offset),
        }
    }

    /// Number of distinct codes this generator can issue.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    fn scramble(&self, index: u64) -> u64 {
        let capacity = self.capacity as u128;
        let offset = capacity / 3;
        ((index as u128 * SCRAMBLE_MULTIPLIER + offset) % capacity) as u64
    }
}

impl CodeGenerator for SequentialCodeGenerator {
    fn generate(&self) -> Result<String, CodeSpaceExhausted> {
        let index = self
            .counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .map_err(|_| CodeSpaceExhausted {
                length: self.length,
                capacity: self.capacity,
            })?;

        Ok(encode_base62(self.scramble(index), self.length))
    }

    fn code_length(&self) -> usize {
        self.length
    }
}

/// Encodes `value` in base62, left-padded with `'0'` to `width` characters.
pub fn encode_base62(mut value: u64, width: usize) -> String {
    let mut digits = Vec::with_capacity(width.max(11));
    while value > 0 {
        digits.push(BASE62_ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    while digits.len() < width {
        digits.push(b'0');
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Cheap syntactic check applied before any storage lookup.
pub fn is_well_formed_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= MAX_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Returns `true` if `code` would be shadowed by a static route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}
