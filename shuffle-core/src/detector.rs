//! Landmark detection seam.
//!
//! Face and landmark detection is not part of this crate. Scrambling only
//! needs the box a detector reports, so detectors are plugged in through the
//! [`LandmarkDetector`] trait. Two implementations are provided: a fixed box
//! supplied by the caller, and a set of landmark points produced by an
//! external model.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ShuffleError};
use crate::region::LandmarkBox;

/// Locates the region of an image that should be scrambled.
///
/// Implementations must be thread-safe (`Send + Sync`) so a detector can be
/// shared across images processed in parallel.
pub trait LandmarkDetector: Send + Sync {
    /// Return the landmark box for `image`, or
    /// [`ShuffleError::FaceNotFound`] if there is no face.
    fn detect(&self, image: &DynamicImage) -> Result<LandmarkBox>;
}

/// A box chosen by the caller, returned for every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLandmarks(pub LandmarkBox);

impl LandmarkDetector for FixedLandmarks {
    fn detect(&self, _image: &DynamicImage) -> Result<LandmarkBox> {
        Ok(self.0)
    }
}

/// Landmark points from an external model, as `(x, y)` pixel positions.
///
/// Serialized as a JSON array of `[x, y]` pairs, e.g. the 68 points of a
/// dlib-style shape predictor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkPoints(pub Vec<(u32, u32)>);

impl LandmarkDetector for LandmarkPoints {
    fn detect(&self, _image: &DynamicImage) -> Result<LandmarkBox> {
        let landmarks = LandmarkBox::enclosing(&self.0).ok_or(ShuffleError::FaceNotFound)?;
        debug!(points = self.0.len(), %landmarks, "Landmark box from points");
        Ok(landmarks)
    }
}
