//! Scrambling keys.
//!
//! A [`Key`] is the user-supplied secret: an ordered sequence of 10 to 100
//! integers, each between 1 and 200. It is validated once and is immutable
//! afterwards; its memory is wiped on drop.
//!
//! [`KeySchedule`] carries the unvalidated term arithmetic (shifting terms
//! into a range and extending a sequence to a target length) used by the
//! row-swap scrambler.

use std::fmt;
use std::str::FromStr;

use sha3::{Digest, Sha3_256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{
    KeyErrorReason, Result, ShuffleError, MAX_KEY_LEN, MAX_KEY_TERM, MIN_KEY_LEN, MIN_KEY_TERM,
};

/// Domain separation tag for the key seed.
const SEED_DOMAIN: &[u8] = b"imageshuffle/key-seed/v1";

/// Domain separation tag for key fingerprints.
const FINGERPRINT_DOMAIN: &[u8] = b"imageshuffle/key-fingerprint/v1";

/// A validated scrambling key.
///
/// Two keys with the same ordered terms always expand to the same
/// permutation for a given region size.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    terms: Vec<u8>,
}

impl Key {
    /// Validate a raw sequence against the key contract.
    ///
    /// Length is checked before the term range, so a short key with an
    /// out-of-range term reports the length problem.
    pub fn validate(raw: &[i64]) -> Result<Self> {
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&raw.len()) {
            return Err(ShuffleError::invalid_key(KeyErrorReason::Length {
                len: raw.len(),
            }));
        }

        let mut terms = Vec::with_capacity(raw.len());
        for (index, &value) in raw.iter().enumerate() {
            if !(MIN_KEY_TERM..=MAX_KEY_TERM).contains(&value) {
                return Err(ShuffleError::invalid_key(KeyErrorReason::Range {
                    index,
                    value,
                }));
            }
            // Bounded by MAX_KEY_TERM above.
            terms.push(value as u8);
        }

        Ok(Self { terms })
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Always false for a validated key; provided for API completeness.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The key terms in order.
    pub fn terms(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.terms.iter().map(|&t| u32::from(t))
    }

    /// Term at `index`, reusing the key cyclically.
    pub(crate) fn term_cyclic(&self, index: u64) -> u8 {
        // `len` is at least MIN_KEY_LEN, never zero.
        self.terms[(index % self.terms.len() as u64) as usize]
    }

    /// Order-sensitive 256-bit seed derived from the key terms.
    pub(crate) fn seed(&self) -> Zeroizing<[u8; 32]> {
        let mut hasher = Sha3_256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update([self.terms.len() as u8]);
        hasher.update(&self.terms);

        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&hasher.finalize());
        seed
    }

    /// Short identifier safe to print or log.
    ///
    /// Derived from the seed through a separate hash, so it does not reveal
    /// the seed or the terms.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(FINGERPRINT_DOMAIN);
        hasher.update(self.seed().as_slice());
        hex::encode(&hasher.finalize()[..8])
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("len", &self.terms.len())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl FromStr for Key {
    type Err = ShuffleError;

    /// Parse comma- or whitespace-separated terms, e.g. `"3,17,44"` or
    /// `"3 17 44"`.
    fn from_str(s: &str) -> Result<Self> {
        let raw = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<i64>().map_err(|_| {
                    ShuffleError::invalid_key(KeyErrorReason::Syntax {
                        token: token.to_string(),
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::validate(&raw)
    }
}

/// A sequence of terms bounded by a global `[min, max]` range.
///
/// Unlike [`Key`], a schedule is not validated: it is the working form the
/// row-swap scrambler derives from a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchedule {
    min: i64,
    max: i64,
    terms: Vec<i64>,
}

impl KeySchedule {
    /// Schedule whose bounds are the smallest and largest of `terms`.
    ///
    /// Returns `None` for an empty sequence.
    pub fn new(terms: Vec<i64>) -> Option<Self> {
        let min = *terms.iter().min()?;
        let max = *terms.iter().max()?;
        Some(Self { min, max, terms })
    }

    /// Schedule over the terms of a validated key.
    pub fn from_key(key: &Key) -> Self {
        let terms: Vec<i64> = key.terms().map(i64::from).collect();
        // A validated key is never empty.
        let min = terms.iter().copied().min().unwrap_or(MIN_KEY_TERM);
        let max = terms.iter().copied().max().unwrap_or(MAX_KEY_TERM);
        Self { min, max, terms }
    }

    pub fn terms(&self) -> &[i64] {
        &self.terms
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Map every term into `[min, max]`; the result is bounded by that range.
    ///
    /// Terms already inside are kept. Terms below become `t mod m + min`,
    /// terms above become `(t - min) mod m + min`, with `m = max - min + 1`.
    pub fn shift_to_range(&self, min: i64, max: i64) -> Self {
        let magnitude = max - min + 1;
        let terms = self
            .terms
            .iter()
            .map(|&term| {
                if term < min {
                    term.rem_euclid(magnitude) + min
                } else if term > max {
                    (term - min).rem_euclid(magnitude) + min
                } else {
                    term
                }
            })
            .collect();

        Self { min, max, terms }
    }

    /// Extend the schedule to `size` terms.
    ///
    /// Term `i` past the end is `t[i mod len] + i div len`, wrapped back into
    /// the schedule bounds. A schedule already at least `size` long is
    /// returned unchanged.
    pub fn extended(&self, size: usize) -> Self {
        let len = self.terms.len();
        let magnitude = self.max - self.min + 1;
        let mut terms = self.terms.clone();

        for next in len..size {
            let mut term = self.terms[next % len] + (next / len) as i64;
            if !(self.min..=self.max).contains(&term) {
                term = (term - self.min).rem_euclid(magnitude) + self.min;
            }
            terms.push(term);
        }

        Self {
            min: self.min,
            max: self.max,
            terms,
        }
    }
}
