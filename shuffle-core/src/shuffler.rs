//! Scramble and unscramble pipelines.
//!
//! Both operations run the same linear pipeline and stop at the first
//! error:
//!
//! ```text
//! key validated → region located → permutation derived → transformed → composed
//! ```
//!
//! Nothing is retained between calls and the source image is never
//! modified; every call returns a new image.

use image::{DynamicImage, ImageBuffer, Pixel};
use tracing::{debug, instrument};

use crate::detector::LandmarkDetector;
use crate::error::{Result, ShuffleError};
use crate::expand::{expand, ScrambleMethod};
use crate::key::Key;
use crate::permutation::{self, Permutation};
use crate::region::{self, LandmarkBox, RegionBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Scramble,
    Unscramble,
}

/// Runs the region pipeline for one `image::DynamicImage` variant and wraps
/// the result back into the same variant, so channel type and depth are
/// preserved exactly.
macro_rules! per_variant {
    ($image:expr, $buffer:ident => $body:expr) => {
        match $image {
            DynamicImage::ImageLuma8($buffer) => DynamicImage::ImageLuma8($body),
            DynamicImage::ImageLumaA8($buffer) => DynamicImage::ImageLumaA8($body),
            DynamicImage::ImageRgb8($buffer) => DynamicImage::ImageRgb8($body),
            DynamicImage::ImageRgba8($buffer) => DynamicImage::ImageRgba8($body),
            DynamicImage::ImageLuma16($buffer) => DynamicImage::ImageLuma16($body),
            DynamicImage::ImageLumaA16($buffer) => DynamicImage::ImageLumaA16($body),
            DynamicImage::ImageRgb16($buffer) => DynamicImage::ImageRgb16($body),
            DynamicImage::ImageRgba16($buffer) => DynamicImage::ImageRgba16($body),
            DynamicImage::ImageRgb32F($buffer) => DynamicImage::ImageRgb32F($body),
            DynamicImage::ImageRgba32F($buffer) => DynamicImage::ImageRgba32F($body),
            other => {
                return Err(ShuffleError::UnsupportedImage(format!(
                    "pixel layout {:?} is not supported",
                    other.color()
                )))
            }
        }
    };
}

/// A validated key bound to a scramble method.
///
/// ```
/// use image::{DynamicImage, Rgb, RgbImage};
/// use shuffle_core::{FixedLandmarks, LandmarkBox, Shuffler};
///
/// # fn main() -> shuffle_core::Result<()> {
/// let image: DynamicImage = RgbImage::from_fn(64, 64, |x, y| Rgb([x as u8, y as u8, 0])).into();
/// let shuffler = Shuffler::new(&[3, 17, 44, 90, 12, 150, 7, 199, 2, 61])?;
///
/// let detector = FixedLandmarks(LandmarkBox::new(8, 40, 8, 40));
/// let (scrambled, landmarks) = shuffler.scramble(&image, &detector)?;
/// let restored = shuffler.unscramble(&scrambled, landmarks)?;
/// assert_eq!(restored, image);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Shuffler {
    key: Key,
    method: ScrambleMethod,
}

impl Shuffler {
    /// Validate `raw_key` and build a shuffler using the default method.
    pub fn new(raw_key: &[i64]) -> Result<Self> {
        Ok(Self::from_key(Key::validate(raw_key)?))
    }

    pub fn from_key(key: Key) -> Self {
        Self {
            key,
            method: ScrambleMethod::default(),
        }
    }

    /// Select the permutation derivation.
    pub fn with_method(mut self, method: ScrambleMethod) -> Self {
        self.method = method;
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn method(&self) -> ScrambleMethod {
        self.method
    }

    /// Scramble the region reported by `detector`.
    ///
    /// Returns the scrambled image and the clipped landmark box actually
    /// used. The box must be persisted: unscrambling needs it verbatim.
    #[instrument(level = "debug", skip_all, fields(method = %self.method, key = %self.key.fingerprint()))]
    pub fn scramble(
        &self,
        image: &DynamicImage,
        detector: &dyn LandmarkDetector,
    ) -> Result<(DynamicImage, LandmarkBox)> {
        let landmarks = detector.detect(image)?;
        let bounds = self.locate(image.width(), image.height(), landmarks)?;
        let permutation = self.method.derive(&self.key, &bounds)?;
        debug!(stage = "permutation_derived", n = permutation.len());

        let scrambled = per_variant!(image, buffer => apply(buffer, &bounds, &permutation, Direction::Scramble)?);
        debug!(stage = "composed", "Region scrambled");
        Ok((scrambled, bounds.to_landmarks()))
    }

    /// Restore an image scrambled with the same key, method and landmarks.
    ///
    /// The permutation is derived from `landmarks` alone, so a box that
    /// drifted since scrambling yields a wrong image rather than an error.
    /// Use [`unscramble_expecting`](Self::unscramble_expecting) when the
    /// recorded region size is known.
    #[instrument(level = "debug", skip_all, fields(method = %self.method, key = %self.key.fingerprint()))]
    pub fn unscramble(&self, image: &DynamicImage, landmarks: LandmarkBox) -> Result<DynamicImage> {
        let bounds = self.locate(image.width(), image.height(), landmarks)?;
        let permutation = self.method.derive(&self.key, &bounds)?;
        self.restore(image, &bounds, &permutation)
    }

    /// Like [`unscramble`](Self::unscramble), but checked against the region
    /// size recorded when the image was scrambled.
    ///
    /// The permutation is derived for `expected_len` pixels while the region
    /// comes from `landmarks`; if they disagree the call fails with
    /// [`ShuffleError::SizeMismatch`] instead of producing a plausible but
    /// wrong image.
    #[instrument(level = "debug", skip_all, fields(method = %self.method, key = %self.key.fingerprint(), expected_len = expected_len))]
    pub fn unscramble_expecting(
        &self,
        image: &DynamicImage,
        landmarks: LandmarkBox,
        expected_len: usize,
    ) -> Result<DynamicImage> {
        let bounds = self.locate(image.width(), image.height(), landmarks)?;
        let permutation = match self.method {
            ScrambleMethod::Permutation => expand(&self.key, expected_len)?,
            ScrambleMethod::RowSwap if bounds.len() != expected_len => {
                return Err(ShuffleError::SizeMismatch {
                    expected: expected_len,
                    actual: bounds.len(),
                })
            }
            ScrambleMethod::RowSwap => self.method.derive(&self.key, &bounds)?,
        };
        self.restore(image, &bounds, &permutation)
    }

    /// Scramble a single image buffer.
    pub fn scramble_buffer<P: Pixel>(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
        landmarks: LandmarkBox,
    ) -> Result<(ImageBuffer<P, Vec<P::Subpixel>>, LandmarkBox)> {
        let bounds = self.locate(image.width(), image.height(), landmarks)?;
        let permutation = self.method.derive(&self.key, &bounds)?;
        let scrambled = apply(image, &bounds, &permutation, Direction::Scramble)?;
        Ok((scrambled, bounds.to_landmarks()))
    }

    /// Unscramble a single image buffer.
    pub fn unscramble_buffer<P: Pixel>(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
        landmarks: LandmarkBox,
    ) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
        let bounds = self.locate(image.width(), image.height(), landmarks)?;
        let permutation = self.method.derive(&self.key, &bounds)?;
        apply(image, &bounds, &permutation, Direction::Unscramble)
    }

    fn locate(&self, width: u32, height: u32, landmarks: LandmarkBox) -> Result<RegionBounds> {
        let bounds = region::locate(width, height, landmarks)?;
        debug!(
            stage = "region_located",
            %landmarks,
            region = %bounds.to_landmarks(),
            n = bounds.len()
        );
        Ok(bounds)
    }

    fn restore(
        &self,
        image: &DynamicImage,
        bounds: &RegionBounds,
        permutation: &Permutation,
    ) -> Result<DynamicImage> {
        debug!(stage = "permutation_derived", n = permutation.len());
        let restored = per_variant!(image, buffer => apply(buffer, bounds, permutation, Direction::Unscramble)?);
        debug!(stage = "composed", "Region unscrambled");
        Ok(restored)
    }
}

fn apply<P: Pixel>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    bounds: &RegionBounds,
    permutation: &Permutation,
    direction: Direction,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    let region = region::extract(image, bounds);
    let processed = match direction {
        Direction::Scramble => permutation::scramble(&region, permutation)?,
        Direction::Unscramble => permutation::unscramble(&region, permutation)?,
    };
    debug!(stage = "transformed", direction = ?direction);
    region::compose(image, bounds, &processed)
}

/// Validate `raw_key`, locate the face with `detector` and scramble it.
///
/// Returns the scrambled image and the landmark box to persist.
pub fn scramble(
    image: &DynamicImage,
    raw_key: &[i64],
    detector: &dyn LandmarkDetector,
) -> Result<(DynamicImage, LandmarkBox)> {
    Shuffler::new(raw_key)?.scramble(image, detector)
}

/// Validate `raw_key` and restore the region given by the persisted
/// `landmarks`.
///
/// Cannot detect a drifted box; see [`Shuffler::unscramble_expecting`].
pub fn unscramble(image: &DynamicImage, raw_key: &[i64], landmarks: LandmarkBox) -> Result<DynamicImage> {
    Shuffler::new(raw_key)?.unscramble(image, landmarks)
}
