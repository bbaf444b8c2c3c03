//! Face catalog for the `encode` and `recognize` workflows.
//!
//! Recognition runs on plain (unscrambled) images and is independent of the
//! permutation engine.
//!
//! # Components
//!
//! - **Encoding**: [`FaceEncoder`] turns an image into a [`FaceEncoding`].
//!   The bundled [`PerceptualEncoder`] uses a Blockhash-64 fingerprint, which
//!   stays close for visually similar images.
//! - **Catalog**: [`FaceCatalog`] persists labelled encodings and matches new
//!   ones against them by Hamming distance and majority vote.

pub mod catalog;
pub mod encoding;

pub use catalog::*;
pub use encoding::*;
