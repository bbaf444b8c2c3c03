//! Landmark boxes and the pixel regions they select.
//!
//! A [`LandmarkBox`] is the half-open rectangle `top..bottom` × `left..right`
//! reported by a landmark detector or persisted alongside a scrambled image.
//! [`locate`] clips it to an image and yields the [`RegionBounds`] that
//! [`extract`] and [`compose`] work on. Both walk the region in the same
//! row-major order: top row first, left pixel first within a row.

use std::fmt;
use std::str::FromStr;

use image::{ImageBuffer, Pixel};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShuffleError};

/// Rectangle around detected facial landmarks, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandmarkBox {
    /// First row (inclusive).
    pub top: u32,
    /// Last row (exclusive).
    pub bottom: u32,
    /// First column (inclusive).
    pub left: u32,
    /// Last column (exclusive).
    pub right: u32,
}

impl LandmarkBox {
    pub const fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Tightest box containing every `(x, y)` landmark point.
    ///
    /// Points are pixel positions, so the box extends one past the largest
    /// coordinate on each axis. Returns `None` when there are no points.
    pub fn enclosing(points: &[(u32, u32)]) -> Option<Self> {
        let (&(x0, y0), rest) = points.split_first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (x0, x0, y0, y0);
        for &(x, y) in rest {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        Some(Self {
            top: min_y,
            bottom: max_y.saturating_add(1),
            left: min_x,
            right: max_x.saturating_add(1),
        })
    }

    /// Pixel count of the unclipped box, or zero if degenerate.
    pub fn area(&self) -> usize {
        let rows = self.bottom.saturating_sub(self.top) as usize;
        let cols = self.right.saturating_sub(self.left) as usize;
        rows * cols
    }

    fn is_degenerate(&self) -> bool {
        self.top >= self.bottom || self.left >= self.right
    }
}

impl fmt::Display for LandmarkBox {
    /// Side-file form: `top bottom left right`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.bottom, self.left, self.right)
    }
}

impl FromStr for LandmarkBox {
    type Err = ShuffleError;

    /// Parse four integers separated by whitespace or commas.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<u32>().map_err(|_| {
                    ShuffleError::InvalidRegion(format!(
                        "landmark value {token:?} is not a non-negative integer"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match values.as_slice() {
            &[top, bottom, left, right] => Ok(Self::new(top, bottom, left, right)),
            other => Err(ShuffleError::InvalidRegion(format!(
                "expected 4 landmark values (top bottom left right), got {}",
                other.len()
            ))),
        }
    }
}

/// A non-empty region clipped to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionBounds {
    top: u32,
    bottom: u32,
    left: u32,
    right: u32,
}

impl RegionBounds {
    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn bottom(&self) -> u32 {
        self.bottom
    }

    pub fn left(&self) -> u32 {
        self.left
    }

    pub fn right(&self) -> u32 {
        self.right
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Number of pixels in the region (`N`). Never zero.
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Always false: [`locate`] never produces an empty region.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether pixel `(x, y)` lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.left..self.right).contains(&x) && (self.top..self.bottom).contains(&y)
    }

    /// The region as a landmark box, for persisting.
    pub fn to_landmarks(&self) -> LandmarkBox {
        LandmarkBox::new(self.top, self.bottom, self.left, self.right)
    }

    /// Pixel coordinates in extraction order.
    fn coordinates(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.top..self.bottom).flat_map(move |y| (self.left..self.right).map(move |x| (x, y)))
    }
}

/// Clip `landmarks` to a `width` × `height` image.
///
/// Fails with [`ShuffleError::InvalidRegion`] if the box is degenerate or
/// does not intersect the image.
pub fn locate(width: u32, height: u32, landmarks: LandmarkBox) -> Result<RegionBounds> {
    if landmarks.is_degenerate() {
        return Err(ShuffleError::InvalidRegion(format!(
            "landmark box ({landmarks}) is empty"
        )));
    }

    let bounds = RegionBounds {
        top: landmarks.top,
        bottom: landmarks.bottom.min(height),
        left: landmarks.left,
        right: landmarks.right.min(width),
    };

    if bounds.top >= bounds.bottom || bounds.left >= bounds.right {
        return Err(ShuffleError::InvalidRegion(format!(
            "landmark box ({landmarks}) lies outside the {width}x{height} image"
        )));
    }

    Ok(bounds)
}

/// Copy the region's pixels out of `image` in row-major order.
///
/// `bounds` must come from [`locate`] for this image's dimensions.
pub fn extract<P: Pixel>(image: &ImageBuffer<P, Vec<P::Subpixel>>, bounds: &RegionBounds) -> Vec<P> {
    bounds
        .coordinates()
        .map(|(x, y)| *image.get_pixel(x, y))
        .collect()
}

/// A copy of `image` with the region replaced by `processed`.
///
/// Pixels are written in the order [`extract`] reads them; everything
/// outside `bounds` is left untouched. Fails with
/// [`ShuffleError::SizeMismatch`] if `processed` does not have exactly
/// `bounds.len()` pixels.
pub fn compose<P: Pixel>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    bounds: &RegionBounds,
    processed: &[P],
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    if processed.len() != bounds.len() {
        return Err(ShuffleError::SizeMismatch {
            expected: bounds.len(),
            actual: processed.len(),
        });
    }
    if bounds.right > image.width() || bounds.bottom > image.height() {
        return Err(ShuffleError::InvalidRegion(format!(
            "region ({}) exceeds the {}x{} image",
            bounds.to_landmarks(),
            image.width(),
            image.height()
        )));
    }

    let mut output = image.clone();
    for ((x, y), pixel) in bounds.coordinates().zip(processed) {
        output.put_pixel(x, y, *pixel);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, RgbImage};

    #[test]
    fn test_locate_inside() {
        let bounds = locate(100, 100, LandmarkBox::new(10, 50, 20, 60)).unwrap();
        assert_eq!(bounds.height(), 40);
        assert_eq!(bounds.width(), 40);
        assert_eq!(bounds.len(), 1600);
    }

    #[test]
    fn test_locate_rejects_empty_box() {
        assert!(matches!(
            locate(100, 100, LandmarkBox::new(10, 10, 20, 60)),
            Err(ShuffleError::InvalidRegion(_))
        ));
        assert!(matches!(
            locate(100, 100, LandmarkBox::new(10, 50, 60, 60)),
            Err(ShuffleError::InvalidRegion(_))
        ));
        assert!(locate(100, 100, LandmarkBox::new(50, 10, 20, 60)).is_err());
    }

    #[test]
    fn test_locate_rejects_box_outside_image() {
        assert!(locate(100, 100, LandmarkBox::new(100, 150, 0, 10)).is_err());
        assert!(locate(100, 100, LandmarkBox::new(0, 10, 120, 130)).is_err());
    }

    #[test]
    fn test_locate_clips_partial_overlap() {
        let bounds = locate(100, 80, LandmarkBox::new(70, 120, 90, 140)).unwrap();
        assert_eq!(bounds.to_landmarks(), LandmarkBox::new(70, 80, 90, 100));
        assert_eq!(bounds.len(), 10 * 10);
    }

    #[test]
    fn test_enclosing_box() {
        let points = [(12, 40), (30, 22), (18, 35)];
        let bbox = LandmarkBox::enclosing(&points).unwrap();
        assert_eq!(bbox, LandmarkBox::new(22, 41, 12, 31));
        assert!(LandmarkBox::enclosing(&[]).is_none());
    }

    #[test]
    fn test_landmark_text_roundtrip() {
        let bbox = LandmarkBox::new(10, 50, 20, 60);
        assert_eq!(bbox.to_string(), "10 50 20 60");
        assert_eq!("10 50 20 60\n".parse::<LandmarkBox>().unwrap(), bbox);
        assert_eq!("10,50,20,60".parse::<LandmarkBox>().unwrap(), bbox);
    }

    #[test]
    fn test_landmark_parse_errors() {
        assert!("10 50 20".parse::<LandmarkBox>().is_err());
        assert!("10 50 20 60 70".parse::<LandmarkBox>().is_err());
        assert!("10 -50 20 60".parse::<LandmarkBox>().is_err());
    }

    #[test]
    fn test_extract_is_row_major() {
        let image = ImageBuffer::from_fn(4, 3, |x, y| Luma([(y * 10 + x) as u8]));
        let bounds = locate(4, 3, LandmarkBox::new(1, 3, 1, 3)).unwrap();
        let values: Vec<u8> = extract(&image, &bounds).iter().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![11, 12, 21, 22]);
    }

    #[test]
    fn test_compose_writes_only_region() {
        let image = RgbImage::from_fn(6, 5, |x, y| image::Rgb([x as u8, y as u8, 7]));
        let bounds = locate(6, 5, LandmarkBox::new(1, 3, 2, 5)).unwrap();
        let fill: Vec<_> = (0..bounds.len())
            .map(|i| image::Rgb([200, 100 + i as u8, 0]))
            .collect();

        let composed = compose(&image, &bounds, &fill).unwrap();
        let mut i = 0;
        for y in 0..5 {
            for x in 0..6 {
                if bounds.contains(x, y) {
                    assert_eq!(*composed.get_pixel(x, y), fill[i]);
                    i += 1;
                } else {
                    assert_eq!(composed.get_pixel(x, y), image.get_pixel(x, y));
                }
            }
        }
        assert_eq!(i, fill.len());
    }

    #[test]
    fn test_compose_size_mismatch() {
        let image = RgbImage::new(6, 5);
        let bounds = locate(6, 5, LandmarkBox::new(0, 2, 0, 2)).unwrap();
        let fill = vec![image::Rgb([0, 0, 0]); 3];
        assert!(matches!(
            compose(&image, &bounds, &fill),
            Err(ShuffleError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }
}
