//! Key expansion: turning a [`Key`] into a [`Permutation`] of any size.
//!
//! # Algorithm
//!
//! [`expand`] seeds a counter-mode SHA3-256 stream from the key and drives a
//! Fisher–Yates shuffle of `0..n` with it. Block `c` of the stream is
//!
//! ```text
//! SHA3-256(seed || c as u64 little-endian || key[c mod len])
//! ```
//!
//! so the key terms are reapplied cyclically for as many blocks as the
//! shuffle needs, whatever the ratio of `n` to the key length. All
//! arithmetic is done in `u64`, and bounded draws use rejection sampling, so
//! the result is identical on every platform.
//!
//! [`expand_row_swap`] derives the permutation of the row-swapping scheme
//! instead: each region row is swapped, in order, with a row picked by the
//! key schedule.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::{Result, ShuffleError};
use crate::key::{Key, KeySchedule};
use crate::permutation::Permutation;
use crate::region::RegionBounds;

/// How a key is turned into a pixel permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrambleMethod {
    /// Keyed Fisher–Yates shuffle over every pixel of the region.
    #[default]
    Permutation,
    /// Key-scheduled swaps of whole region rows.
    RowSwap,
}

impl ScrambleMethod {
    /// Derive the permutation for `bounds` with this method.
    pub fn derive(&self, key: &Key, bounds: &RegionBounds) -> Result<Permutation> {
        match self {
            Self::Permutation => expand(key, bounds.len()),
            Self::RowSwap => expand_row_swap(key, bounds),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permutation => "permutation",
            Self::RowSwap => "row-swap",
        }
    }
}

impl std::fmt::Display for ScrambleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScrambleMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permutation" => Ok(Self::Permutation),
            "row-swap" | "rowswap" | "rows" => Ok(Self::RowSwap),
            other => Err(format!(
                "unknown scramble method {other:?} (expected \"permutation\" or \"row-swap\")"
            )),
        }
    }
}

/// Deterministic byte stream seeded purely from a key.
///
/// Lives for a single expansion; nothing is shared between calls.
struct KeyStream<'k> {
    key: &'k Key,
    seed: Zeroizing<[u8; 32]>,
    counter: u64,
    block: Zeroizing<[u8; 32]>,
    offset: usize,
}

impl<'k> KeyStream<'k> {
    const BLOCK_LEN: usize = 32;

    fn new(key: &'k Key) -> Self {
        Self {
            key,
            seed: key.seed(),
            counter: 0,
            block: Zeroizing::new([0u8; 32]),
            offset: Self::BLOCK_LEN,
        }
    }

    fn refill(&mut self) {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed.as_slice());
        hasher.update(self.counter.to_le_bytes());
        hasher.update([self.key.term_cyclic(self.counter)]);
        self.block.copy_from_slice(&hasher.finalize());
        self.counter += 1;
        self.offset = 0;
    }

    fn next_u64(&mut self) -> u64 {
        if self.offset + 8 > Self::BLOCK_LEN {
            self.refill();
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.block[self.offset..self.offset + 8]);
        self.offset += 8;
        u64::from_le_bytes(word)
    }

    /// Uniform draw from `[0, bound)`. `bound` must be non-zero.
    fn below(&mut self, bound: u64) -> u64 {
        // Largest multiple of `bound` that fits; draws at or above it are
        // rejected so every residue is equally likely.
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let draw = self.next_u64();
            if draw < zone {
                return draw % bound;
            }
        }
    }
}

/// Expand `key` into a permutation of `[0, n)`.
///
/// Pure and deterministic in `(key, n)`. The table is verified to be a
/// bijection before it is returned. Fails with
/// [`ShuffleError::InvalidRegion`] for `n == 0`.
pub fn expand(key: &Key, n: usize) -> Result<Permutation> {
    if n == 0 {
        return Err(ShuffleError::InvalidRegion(
            "cannot derive a permutation for an empty region".into(),
        ));
    }

    let mut stream = KeyStream::new(key);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = stream.below(i as u64 + 1) as usize;
        indices.swap(i, j);
    }

    trace!(n, blocks = stream.counter, "Expanded key");
    Permutation::from_indices(indices)
}

/// Permutation produced by swapping the rows of `bounds`.
///
/// The key is shifted into the region's absolute row range and extended to
/// one term per row; row `r` is then swapped with row `schedule[r]`, in
/// order. Each row moves as a unit, so the pixel permutation keeps column
/// positions.
pub fn expand_row_swap(key: &Key, bounds: &RegionBounds) -> Result<Permutation> {
    let rows = bounds.height() as usize;
    let cols = bounds.width() as usize;
    let top = i64::from(bounds.top());
    let last = i64::from(bounds.bottom()) - 1;

    let schedule = KeySchedule::from_key(key)
        .shift_to_range(top, last)
        .extended(rows);

    let mut order: Vec<usize> = (0..rows).collect();
    for (row, &target) in schedule.terms().iter().take(rows).enumerate() {
        order.swap(row, (target - top) as usize);
    }

    let indices = order
        .iter()
        .flat_map(|&source| (0..cols).map(move |col| source * cols + col))
        .collect();

    Permutation::from_indices(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{locate, LandmarkBox};

    fn scenario_key() -> Key {
        Key::validate(&[3, 17, 44, 90, 12, 150, 7, 199, 2, 61]).unwrap()
    }

    fn assert_bijection(perm: &Permutation, n: usize) {
        let mut sorted = perm.as_slice().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_expand_is_bijective() {
        let key = scenario_key();
        for n in [1, 2, 3, 9, 10, 11, 100, 1600, 4097] {
            let perm = expand(&key, n).unwrap();
            assert_eq!(perm.len(), n);
            assert_bijection(&perm, n);
        }
    }

    #[test]
    fn test_expand_is_deterministic() {
        let key = scenario_key();
        let a = expand(&key, 1600).unwrap();
        let b = expand(&key.clone(), 1600).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_expand_known_vector() {
        // Pinned output guards against accidental changes to the seed or
        // shuffle; every platform must produce this table.
        let perm = expand(&scenario_key(), 10).unwrap();
        assert_eq!(perm.as_slice(), &KNOWN_10);
    }

    const KNOWN_10: [usize; 10] = [8, 5, 4, 7, 9, 0, 6, 1, 2, 3];

    #[test]
    fn test_different_keys_differ() {
        let a = expand(&scenario_key(), 256).unwrap();
        let other = Key::validate(&[3, 17, 44, 90, 12, 150, 7, 199, 2, 62]).unwrap();
        let b = expand(&other, 256).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expand_moves_most_indices() {
        let perm = expand(&scenario_key(), 1600).unwrap();
        let fixed = perm
            .as_slice()
            .iter()
            .enumerate()
            .filter(|&(i, &p)| i == p)
            .count();
        assert!(fixed < 50, "too many fixed points: {fixed}");
    }

    #[test]
    fn test_expand_rejects_zero() {
        assert!(matches!(
            expand(&scenario_key(), 0),
            Err(ShuffleError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_stream_crosses_block_boundary() {
        let key = scenario_key();
        let mut stream = KeyStream::new(&key);
        let words: Vec<u64> = (0..9).map(|_| stream.next_u64()).collect();
        assert_eq!(stream.counter, 3);
        assert_ne!(words[0], words[4]);
    }

    #[test]
    fn test_below_stays_in_bound() {
        let key = scenario_key();
        let mut stream = KeyStream::new(&key);
        for bound in 1..200u64 {
            assert!(stream.below(bound) < bound);
        }
    }

    #[test]
    fn test_row_swap_moves_whole_rows() {
        let key = scenario_key();
        let bounds = locate(100, 100, LandmarkBox::new(10, 50, 20, 60)).unwrap();
        let perm = expand_row_swap(&key, &bounds).unwrap();
        assert_bijection(&perm, 1600);

        let cols = bounds.width() as usize;
        for row in 0..bounds.height() as usize {
            let source_row = perm.as_slice()[row * cols] / cols;
            for col in 0..cols {
                assert_eq!(perm.as_slice()[row * cols + col], source_row * cols + col);
            }
        }
    }

    #[test]
    fn test_row_swap_matches_sequential_swaps() {
        // Replaying the swaps on a row-labelled buffer must agree with the
        // derived permutation.
        let key = Key::validate(&[4, 1, 3, 2, 9, 8, 7, 6, 5, 10]).unwrap();
        let bounds = locate(3, 20, LandmarkBox::new(2, 7, 0, 1)).unwrap();
        let perm = expand_row_swap(&key, &bounds).unwrap();

        let schedule = KeySchedule::from_key(&key).shift_to_range(2, 6).extended(5);
        let mut rows: Vec<usize> = (0..5).collect();
        for (r, &s) in schedule.terms().iter().enumerate() {
            rows.swap(r, (s - 2) as usize);
        }
        assert_eq!(perm.as_slice(), rows.as_slice());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(
            "permutation".parse::<ScrambleMethod>().unwrap(),
            ScrambleMethod::Permutation
        );
        assert_eq!(
            "row-swap".parse::<ScrambleMethod>().unwrap(),
            ScrambleMethod::RowSwap
        );
        assert!("shuffle".parse::<ScrambleMethod>().is_err());
        assert_eq!(ScrambleMethod::default().to_string(), "permutation");
    }
}
