//! Bijective index tables and the buffer transforms that apply them.

use crate::error::{Result, ShuffleError};

/// A bijection over `[0, len)`.
///
/// Stored as the forward table `π`: scrambling places source element
/// `π[i]` at position `i`. Construction checks that every index appears
/// exactly once, so a `Permutation` value is always invertible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    forward: Vec<usize>,
}

impl Permutation {
    /// Build a permutation from an index table.
    ///
    /// Fails with [`ShuffleError::InvalidPermutation`] on an out-of-range or
    /// repeated index. An empty table is rejected as well.
    pub fn from_indices(forward: Vec<usize>) -> Result<Self> {
        if forward.is_empty() {
            return Err(ShuffleError::InvalidPermutation(
                "permutation must cover at least one index".into(),
            ));
        }

        let len = forward.len();
        let mut seen = vec![false; len];
        for (position, &index) in forward.iter().enumerate() {
            if index >= len {
                return Err(ShuffleError::InvalidPermutation(format!(
                    "index {index} at position {position} is out of range for length {len}"
                )));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(ShuffleError::InvalidPermutation(format!(
                    "index {index} appears more than once"
                )));
            }
        }

        Ok(Self { forward })
    }

    /// The identity over `[0, len)`.
    pub fn identity(len: usize) -> Result<Self> {
        Self::from_indices((0..len).collect())
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Always false: empty tables are rejected on construction.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The forward index table.
    pub fn as_slice(&self) -> &[usize] {
        &self.forward
    }

    /// `π(i)`, or `None` if `i` is out of range.
    pub fn get(&self, i: usize) -> Option<usize> {
        self.forward.get(i).copied()
    }

    /// The inverse permutation `π⁻¹`, with `π⁻¹(π(i)) = i`.
    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0; self.forward.len()];
        for (i, &target) in self.forward.iter().enumerate() {
            inverse[target] = i;
        }
        Self { forward: inverse }
    }
}

/// Reorder `region` by `permutation`: `output[i] = region[π[i]]`.
pub fn scramble<T: Clone>(region: &[T], permutation: &Permutation) -> Result<Vec<T>> {
    check_len(region.len(), permutation)?;

    Ok(permutation
        .as_slice()
        .iter()
        .map(|&source| region[source].clone())
        .collect())
}

/// Undo [`scramble`]: `output[π[i]] = scrambled[i]`.
pub fn unscramble<T: Clone>(scrambled: &[T], permutation: &Permutation) -> Result<Vec<T>> {
    check_len(scrambled.len(), permutation)?;

    let inverse = permutation.inverse();
    Ok(inverse
        .as_slice()
        .iter()
        .map(|&source| scrambled[source].clone())
        .collect())
}

fn check_len(actual: usize, permutation: &Permutation) -> Result<()> {
    if actual != permutation.len() {
        return Err(ShuffleError::SizeMismatch {
            expected: permutation.len(),
            actual,
        });
    }
    Ok(())
}
