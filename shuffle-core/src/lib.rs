//! Shuffle Core - reversible key-based scrambling of face regions
//!
//! This crate scrambles the pixels inside a landmark box so that a face can no
//! longer be recognized, and restores it exactly given the same key.
//!
//! # Features
//!
//! - Keys of 10 to 100 terms in `[1, 200]`, zeroized on drop
//! - Deterministic key expansion to a permutation of any region size
//! - Lossless round trip for every `image` pixel format
//! - Pluggable landmark detection through [`LandmarkDetector`]
//! - Perceptual face catalog for recognition (`recognition` feature)
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, RgbImage};
//! use shuffle_core::{FixedLandmarks, LandmarkBox, Shuffler};
//!
//! # fn example() -> shuffle_core::Result<()> {
//! let image = DynamicImage::from(RgbImage::from_fn(100, 100, |x, y| {
//!     image::Rgb([x as u8, y as u8, (x + y) as u8])
//! }));
//!
//! let shuffler = Shuffler::new(&[3, 17, 44, 90, 12, 150, 7, 199, 2, 61])?;
//! let detector = FixedLandmarks(LandmarkBox::new(10, 50, 20, 60));
//!
//! let (scrambled, landmarks) = shuffler.scramble(&image, &detector)?;
//! let restored = shuffler.unscramble(&scrambled, landmarks)?;
//! assert_eq!(restored, image);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod detector;
pub mod error;
pub mod expand;
pub mod key;
pub mod permutation;
pub mod region;
pub mod shuffler;

#[cfg(feature = "recognition")]
pub mod recognition;

// Re-export main types for convenience
pub use detector::{FixedLandmarks, LandmarkDetector, LandmarkPoints};
pub use error::{
    KeyErrorReason, Result, ShuffleError, MAX_KEY_LEN, MAX_KEY_TERM, MIN_KEY_LEN, MIN_KEY_TERM,
};
pub use expand::{expand, expand_row_swap, ScrambleMethod};
pub use key::{Key, KeySchedule};
pub use permutation::Permutation;
pub use region::{compose, extract, locate, LandmarkBox, RegionBounds};
pub use shuffler::{scramble, unscramble, Shuffler};

#[cfg(feature = "recognition")]
pub use recognition::{
    hamming_distance, CatalogEntry, EncodingAlgorithm, FaceCatalog, FaceEncoder, FaceEncoding,
    PerceptualEncoder, DEFAULT_MATCH_THRESHOLD,
};
