//! Perceptual face encodings.
//!
//! # Algorithm
//!
//! [`PerceptualEncoder`] hashes the face crop with Blockhash-64, producing an
//! 8-byte encoding. Visually similar faces yield encodings a small Hamming
//! distance apart, which is what the catalog matches on.
//!
//! ```
//! use image::{DynamicImage, RgbImage};
//! use shuffle_core::recognition::{FaceEncoder, PerceptualEncoder, DEFAULT_MATCH_THRESHOLD};
//!
//! # fn example() -> shuffle_core::Result<()> {
//! let face = DynamicImage::from(RgbImage::from_fn(64, 64, |x, y| image::Rgb([(x * 4) as u8, (y * 4) as u8, 0])));
//! let encoder = PerceptualEncoder::default();
//! let distance = encoder.encode(&face)?.distance(&encoder.encode(&face)?);
//! assert!(distance.is_some_and(|d| d <= DEFAULT_MATCH_THRESHOLD));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use blockhash::{blockhash64, Blockhash64};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::detector::LandmarkDetector;
use crate::error::{Result, ShuffleError};
use crate::region::locate;

/// Encoding size in bytes for [`EncodingAlgorithm::Blockhash64`].
pub const FACE_ENCODING_SIZE: usize = 8;

/// Default maximum Hamming distance for two encodings to match.
pub const DEFAULT_MATCH_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum EncodingAlgorithm {
    /// Grid-based 64-bit perceptual hash.
    #[default]
    Blockhash64,
}

/// A face fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceEncoding {
    pub bytes: Vec<u8>,
    pub algorithm: EncodingAlgorithm,
}

impl FaceEncoding {
    pub fn new(bytes: [u8; FACE_ENCODING_SIZE], algorithm: EncodingAlgorithm) -> Self {
        Self {
            bytes: bytes.to_vec(),
            algorithm,
        }
    }

    /// Hamming distance to `other`.
    ///
    /// Encodings from different algorithms, or of different lengths, are not
    /// comparable and yield `None`.
    pub fn distance(&self, other: &Self) -> Option<u32> {
        if self.algorithm != other.algorithm {
            return None;
        }
        hamming_distance(&self.bytes, &other.bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn from_hex(hex_str: &str, algorithm: EncodingAlgorithm) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ShuffleError::Catalog(format!("invalid encoding hex: {e}")))?;
        Ok(Self { bytes, algorithm })
    }
}

/// Number of differing bits between two equally sized byte strings.
///
/// Returns `None` if either is empty or their lengths differ.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> Option<u32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum())
}

/// Produces a [`FaceEncoding`] for a face image.
pub trait FaceEncoder: Send + Sync {
    fn encode(&self, face: &DynamicImage) -> Result<FaceEncoding>;

    /// Encode the face a detector finds in `image`.
    ///
    /// The image is cropped to the detected landmark box (clipped to the
    /// image) before encoding.
    fn encode_detected(
        &self,
        image: &DynamicImage,
        detector: &dyn LandmarkDetector,
    ) -> Result<FaceEncoding> {
        let landmarks = detector.detect(image)?;
        let bounds = locate(image.width(), image.height(), landmarks)?;
        let face = image.crop_imm(bounds.left(), bounds.top(), bounds.width(), bounds.height());
        self.encode(&face)
    }
}

/// Blockhash-based [`FaceEncoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptualEncoder {
    algorithm: EncodingAlgorithm,
}

impl PerceptualEncoder {
    pub fn new(algorithm: EncodingAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> EncodingAlgorithm {
        self.algorithm
    }
}

impl FaceEncoder for PerceptualEncoder {
    fn encode(&self, face: &DynamicImage) -> Result<FaceEncoding> {
        if face.width() == 0 || face.height() == 0 {
            return Err(ShuffleError::FaceNotFound);
        }
        match self.algorithm {
            EncodingAlgorithm::Blockhash64 => {
                let hash: Blockhash64 = blockhash64(face);
                let bytes: [u8; FACE_ENCODING_SIZE] = hash.into();
                let encoding = FaceEncoding::new(bytes, self.algorithm);
                trace!(encoding = %encoding.to_hex(), "Encoded face");
                Ok(encoding)
            }
        }
    }
}
