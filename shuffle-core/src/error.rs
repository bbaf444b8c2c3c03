use std::fmt;

use thiserror::Error;

/// Minimum number of terms in a key.
pub const MIN_KEY_LEN: usize = 10;

/// Maximum number of terms in a key.
pub const MAX_KEY_LEN: usize = 100;

/// Smallest value a key term may take.
pub const MIN_KEY_TERM: i64 = 1;

/// Largest value a key term may take.
pub const MAX_KEY_TERM: i64 = 200;

/// Why a raw key was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyErrorReason {
    /// The key has fewer than [`MIN_KEY_LEN`] or more than [`MAX_KEY_LEN`] terms.
    Length { len: usize },
    /// A term lies outside `[MIN_KEY_TERM, MAX_KEY_TERM]`.
    Range { index: usize, value: i64 },
    /// A term in the textual form is not an integer.
    Syntax { token: String },
}

impl fmt::Display for KeyErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { len } => write!(
                f,
                "key length {len} is not between {MIN_KEY_LEN} and {MAX_KEY_LEN} (inclusive)"
            ),
            Self::Range { index, value } => write!(
                f,
                "key value {value} at position {index} not in range [{MIN_KEY_TERM}, {MAX_KEY_TERM}]"
            ),
            Self::Syntax { token } => write!(f, "key term {token:?} is not an integer"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ShuffleError {
    #[error("Invalid key: {reason}")]
    InvalidKey { reason: KeyErrorReason },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("No face found in image")]
    FaceNotFound,

    #[error("Size mismatch: expected {expected} pixels, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl ShuffleError {
    pub(crate) fn invalid_key(reason: KeyErrorReason) -> Self {
        Self::InvalidKey { reason }
    }
}

pub type Result<T> = std::result::Result<T, ShuffleError>;
