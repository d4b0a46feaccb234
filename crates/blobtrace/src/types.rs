//! Shared types: the raster abstraction, coordinates, and errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so callers can build rasters without depending
/// on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` for the same reason.
pub use image::RgbImage;

/// Pixel value used for white / foreground in binary rasters.
pub const WHITE: u8 = 255;

/// Pixel value used for black / background in binary rasters.
pub const BLACK: u8 = 0;

/// Color space tag of a [`Raster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Single 8-bit channel.
    Grayscale,
    /// Three 8-bit channels.
    Rgb,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale => f.write_str("grayscale"),
            Self::Rgb => f.write_str("RGB"),
        }
    }
}

/// Order in which emitted coordinates are reported.
///
/// Components that produce coordinates (blob detection, contour tracing)
/// take this as an explicit parameter; the raster itself carries no
/// orientation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// `(row, col)`: [`IntPoint::x`] is the row, [`IntPoint::y`] the column.
    #[default]
    Matrix,
    /// `(x, y)`: [`IntPoint::x`] is the column, [`IntPoint::y`] the row.
    Cartesian,
}

impl CoordinateSystem {
    /// Build a point from a row/column pair in this convention.
    #[must_use]
    pub const fn point(self, row: u32, col: u32) -> IntPoint {
        match self {
            Self::Matrix => IntPoint::new(row, col),
            Self::Cartesian => IntPoint::new(col, row),
        }
    }

    /// Split a point expressed in this convention back into `(row, col)`.
    #[must_use]
    pub const fn row_col(self, point: IntPoint) -> (u32, u32) {
        match self {
            Self::Matrix => (point.x, point.y),
            Self::Cartesian => (point.y, point.x),
        }
    }
}

/// An integer pixel coordinate.
///
/// The meaning of `x` and `y` depends on the [`CoordinateSystem`] of the
/// component that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntPoint {
    /// First coordinate (row in `Matrix`, column in `Cartesian`).
    pub x: u32,
    /// Second coordinate (column in `Matrix`, row in `Cartesian`).
    pub y: u32,
}

impl IntPoint {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns `true` if `other` is one of the 8 neighbors of `self` or
    /// the same point.
    #[must_use]
    pub const fn touches(self, other: Self) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

/// Axis-aligned bounding rectangle, inclusive of its edge pixels.
///
/// Expressed in the same [`CoordinateSystem`] as the points it bounds:
/// `width` spans the `x` axis and `height` the `y` axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Smallest `x` of any bounded point.
    pub x: u32,
    /// Smallest `y` of any bounded point.
    pub y: u32,
    /// Extent along `x` (`max_x - min_x + 1`).
    pub width: u32,
    /// Extent along `y` (`max_y - min_y + 1`).
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for an empty set.
    #[must_use]
    pub fn enclosing(points: &[IntPoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Number of pixels covered by the box.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the point lies inside the box.
    #[must_use]
    pub const fn contains(&self, p: IntPoint) -> bool {
        p.x >= self.x && p.y >= self.y && p.x - self.x < self.width && p.y - self.y < self.height
    }
}

/// An in-memory 8-bit raster, grayscale or RGB.
///
/// Accessors take `(row, col)`; the flat index of a pixel is
/// `row * width + col`. Cloning duplicates the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Raster {
    /// Single-channel raster.
    Gray(GrayImage),
    /// Three-channel raster.
    Rgb(RgbImage),
}

impl From<GrayImage> for Raster {
    fn from(image: GrayImage) -> Self {
        Self::Gray(image)
    }
}

impl From<RgbImage> for Raster {
    fn from(image: RgbImage) -> Self {
        Self::Rgb(image)
    }
}

impl Raster {
    /// Create an all-black grayscale raster.
    #[must_use]
    pub fn new_gray(width: u32, height: u32) -> Self {
        Self::Gray(GrayImage::new(width, height))
    }

    /// Create an all-black RGB raster.
    #[must_use]
    pub fn new_rgb(width: u32, height: u32) -> Self {
        Self::Rgb(RgbImage::new(width, height))
    }

    /// Create a grayscale raster by evaluating `f(row, col)` per pixel.
    #[must_use]
    pub fn gray_from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        Self::Gray(GrayImage::from_fn(width, height, |x, y| image::Luma([f(y, x)])))
    }

    /// Width in pixels (number of columns).
    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            Self::Gray(img) => img.width(),
            Self::Rgb(img) => img.width(),
        }
    }

    /// Height in pixels (number of rows).
    #[must_use]
    pub fn height(&self) -> u32 {
        match self {
            Self::Gray(img) => img.height(),
            Self::Rgb(img) => img.height(),
        }
    }

    /// Number of pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Returns `true` if the raster has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raster's color space.
    #[must_use]
    pub const fn color_space(&self) -> ColorSpace {
        match self {
            Self::Gray(_) => ColorSpace::Grayscale,
            Self::Rgb(_) => ColorSpace::Rgb,
        }
    }

    /// Returns `true` for single-channel rasters.
    #[must_use]
    pub const fn is_grayscale(&self) -> bool {
        matches!(self, Self::Gray(_))
    }

    /// Returns `true` for three-channel rasters.
    #[must_use]
    pub const fn is_rgb(&self) -> bool {
        matches!(self, Self::Rgb(_))
    }

    /// Number of channels per pixel.
    #[must_use]
    pub const fn channels(&self) -> usize {
        match self {
            Self::Gray(_) => 1,
            Self::Rgb(_) => 3,
        }
    }

    /// Gray level at `(row, col)`.
    ///
    /// RGB rasters report their luminance.
    #[must_use]
    pub fn gray(&self, row: u32, col: u32) -> u8 {
        match self {
            Self::Gray(img) => img.get_pixel(col, row).0[0],
            Self::Rgb(img) => luminance(img.get_pixel(col, row).0),
        }
    }

    /// Set the gray level at `(row, col)`.
    ///
    /// On RGB rasters all three channels receive the value.
    pub fn set_gray(&mut self, row: u32, col: u32, value: u8) {
        match self {
            Self::Gray(img) => img.put_pixel(col, row, image::Luma([value])),
            Self::Rgb(img) => img.put_pixel(col, row, image::Rgb([value; 3])),
        }
    }

    /// `[r, g, b]` at `(row, col)`; grayscale rasters replicate the level.
    #[must_use]
    pub fn rgb(&self, row: u32, col: u32) -> [u8; 3] {
        match self {
            Self::Gray(img) => [img.get_pixel(col, row).0[0]; 3],
            Self::Rgb(img) => img.get_pixel(col, row).0,
        }
    }

    /// Set `[r, g, b]` at `(row, col)`; grayscale rasters store the luminance.
    pub fn set_rgb(&mut self, row: u32, col: u32, value: [u8; 3]) {
        match self {
            Self::Gray(img) => img.put_pixel(col, row, image::Luma([luminance(value)])),
            Self::Rgb(img) => img.put_pixel(col, row, image::Rgb(value)),
        }
    }

    /// Red channel at `(row, col)`.
    #[must_use]
    pub fn red(&self, row: u32, col: u32) -> u8 {
        self.rgb(row, col)[0]
    }

    /// Green channel at `(row, col)`.
    #[must_use]
    pub fn green(&self, row: u32, col: u32) -> u8 {
        self.rgb(row, col)[1]
    }

    /// Blue channel at `(row, col)`.
    #[must_use]
    pub fn blue(&self, row: u32, col: u32) -> u8 {
        self.rgb(row, col)[2]
    }

    /// Gray level at flat index `i`, or `None` if `i >= len()`.
    #[must_use]
    pub fn gray_at(&self, i: usize) -> Option<u8> {
        self.row_col(i).map(|(row, col)| self.gray(row, col))
    }

    /// Set the gray level at flat index `i`.
    ///
    /// Returns `false` and leaves the raster untouched if `i >= len()`.
    pub fn set_gray_at(&mut self, i: usize, value: u8) -> bool {
        let Some((row, col)) = self.row_col(i) else {
            return false;
        };
        self.set_gray(row, col, value);
        true
    }

    #[allow(clippy::cast_possible_truncation)]
    fn row_col(&self, i: usize) -> Option<(u32, u32)> {
        // In range implies a non-zero width.
        if i >= self.len() {
            return None;
        }
        let w = self.width() as usize;
        Some(((i / w) as u32, (i % w) as u32))
    }

    /// Raw interleaved samples, `channels()` bytes per pixel, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Gray(img) => img.as_raw(),
            Self::Rgb(img) => img.as_raw(),
        }
    }

    /// Mutable access to the raw interleaved samples.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Gray(img) => img,
            Self::Rgb(img) => img,
        }
    }

    /// Deep copy converted to RGB (gray levels are replicated).
    #[must_use]
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            Self::Gray(img) => {
                RgbImage::from_fn(img.width(), img.height(), |x, y| {
                    image::Rgb([img.get_pixel(x, y).0[0]; 3])
                })
            }
            Self::Rgb(img) => img.clone(),
        }
    }

    /// Deep copy converted to grayscale using the luminance weights
    /// `0.299 R + 0.587 G + 0.114 B`.
    #[must_use]
    pub fn to_grayscale(&self) -> GrayImage {
        match self {
            Self::Gray(img) => img.clone(),
            Self::Rgb(img) => GrayImage::from_fn(img.width(), img.height(), |x, y| {
                image::Luma([luminance(img.get_pixel(x, y).0)])
            }),
        }
    }

    /// Borrow the grayscale buffer, failing for RGB rasters.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidColorSpace`] if the raster is RGB.
    pub fn require_gray(&self, operation: &'static str) -> Result<&GrayImage, ImagingError> {
        match self {
            Self::Gray(img) => Ok(img),
            Self::Rgb(_) => Err(ImagingError::InvalidColorSpace {
                operation,
                expected: ColorSpace::Grayscale,
                found: ColorSpace::Rgb,
            }),
        }
    }

    /// Mutably borrow the grayscale buffer, failing for RGB rasters.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidColorSpace`] if the raster is RGB.
    pub fn require_gray_mut(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut GrayImage, ImagingError> {
        match self {
            Self::Gray(img) => Ok(img),
            Self::Rgb(_) => Err(ImagingError::InvalidColorSpace {
                operation,
                expected: ColorSpace::Grayscale,
                found: ColorSpace::Rgb,
            }),
        }
    }

    /// Fail unless `other` has the same dimensions and color space.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::DimensionMismatch`] when sizes differ and
    /// [`ImagingError::InvalidColorSpace`] when color spaces differ.
    pub fn require_same_shape(
        &self,
        other: &Self,
        operation: &'static str,
    ) -> Result<(), ImagingError> {
        let expected = (self.width(), self.height());
        let found = (other.width(), other.height());
        if expected != found {
            return Err(ImagingError::DimensionMismatch { expected, found });
        }
        if self.color_space() != other.color_space() {
            return Err(ImagingError::InvalidColorSpace {
                operation,
                expected: self.color_space(),
                found: other.color_space(),
            });
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn luminance([r, g, b]: [u8; 3]) -> u8 {
    let y = 0.114f64.mul_add(
        f64::from(b),
        0.299f64.mul_add(f64::from(r), 0.587 * f64::from(g)),
    );
    y.round().clamp(0.0, 255.0) as u8
}

/// An operator that rewrites a raster in place.
pub trait RasterFilter {
    /// Apply the operator to `raster`, replacing its contents.
    ///
    /// # Errors
    ///
    /// Implementations fail without modifying `raster` when its color
    /// space or dimensions are unsupported.
    fn apply_in_place(&self, raster: &mut Raster) -> Result<(), ImagingError>;

    /// Apply the operator to a copy of `raster`.
    ///
    /// # Errors
    ///
    /// Same as [`apply_in_place`](Self::apply_in_place).
    fn apply(&self, raster: &Raster) -> Result<Raster, ImagingError> {
        let mut out = raster.clone();
        self.apply_in_place(&mut out)?;
        Ok(out)
    }
}

/// Errors raised by raster operators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImagingError {
    /// The operator does not support the raster's color space.
    #[error("{operation} requires a {expected} raster, got {found}")]
    InvalidColorSpace {
        /// Name of the rejecting operator.
        operation: &'static str,
        /// Color space the operator accepts.
        expected: ColorSpace,
        /// Color space it was given.
        found: ColorSpace,
    },

    /// Two rasters combined by one operator differ in size.
    #[error("raster size mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, found.0, found.1)]
    DimensionMismatch {
        /// `(width, height)` of the reference raster.
        expected: (u32, u32),
        /// `(width, height)` of the offending raster.
        found: (u32, u32),
    },

    /// The kernel or structuring element is malformed.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// A rank-1 factorization was requested for a kernel of higher rank.
    #[error("kernel is not separable")]
    NotSeparable,

    /// Operator configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Raster tests ---

    #[test]
    fn gray_accessors_use_row_col_order() {
        let mut r = Raster::new_gray(4, 3);
        r.set_gray(2, 1, 77);
        assert_eq!(r.gray(2, 1), 77);
        assert_eq!(r.gray(1, 2), 0);
        // Flat index is row * width + col.
        assert_eq!(r.gray_at(2 * 4 + 1), Some(77));
        assert!(r.set_gray_at(5, 9));
        assert_eq!(r.gray(1, 1), 9);
    }

    #[test]
    fn flat_index_out_of_range() {
        let mut r = Raster::new_gray(4, 3);
        assert_eq!(r.gray_at(11), Some(0));
        assert_eq!(r.gray_at(12), None);
        assert!(!r.set_gray_at(12, 9));
        assert_eq!(r, Raster::new_gray(4, 3));

        let mut empty = Raster::new_gray(0, 5);
        assert_eq!(empty.gray_at(0), None);
        assert!(!empty.set_gray_at(0, 9));
        let mut rgb = Raster::new_rgb(2, 1);
        assert!(rgb.set_gray_at(1, 40));
        assert_eq!(rgb.rgb(0, 1), [40, 40, 40]);
        assert_eq!(rgb.gray_at(2), None);
    }

    #[test]
    fn dimensions_and_color_space() {
        let g = Raster::new_gray(5, 7);
        assert_eq!((g.width(), g.height(), g.len()), (5, 7, 35));
        assert!(g.is_grayscale());
        assert_eq!(g.channels(), 1);

        let c = Raster::new_rgb(2, 3);
        assert!(c.is_rgb());
        assert_eq!(c.color_space(), ColorSpace::Rgb);
        assert_eq!(c.as_raw().len(), 18);
    }

    #[test]
    fn rgb_accessors() {
        let mut r = Raster::new_rgb(3, 3);
        r.set_rgb(0, 2, [10, 20, 30]);
        assert_eq!(r.red(0, 2), 10);
        assert_eq!(r.green(0, 2), 20);
        assert_eq!(r.blue(0, 2), 30);
    }

    #[test]
    fn gray_to_rgb_replicates_level() {
        let r = Raster::gray_from_fn(2, 2, |row, col| u8::try_from(row * 2 + col).unwrap());
        let rgb = r.to_rgb();
        assert_eq!(rgb.get_pixel(1, 1).0, [3, 3, 3]);
    }

    #[test]
    fn rgb_to_gray_weights_green_highest() {
        let mut r = Raster::new_rgb(3, 1);
        r.set_rgb(0, 0, [255, 0, 0]);
        r.set_rgb(0, 1, [0, 255, 0]);
        r.set_rgb(0, 2, [0, 0, 255]);
        let g = r.to_grayscale();
        let (red, green, blue) = (
            g.get_pixel(0, 0).0[0],
            g.get_pixel(1, 0).0[0],
            g.get_pixel(2, 0).0[0],
        );
        assert!(green > red && red > blue, "R={red} G={green} B={blue}");
    }

    #[test]
    fn clone_is_deep() {
        let a = Raster::new_gray(2, 2);
        let mut b = a.clone();
        b.set_gray(0, 0, 255);
        assert_eq!(a.gray(0, 0), 0);
    }

    #[test]
    fn require_gray_rejects_rgb() {
        let r = Raster::new_rgb(2, 2);
        let err = r.require_gray("test op").unwrap_err();
        assert_eq!(
            err,
            ImagingError::InvalidColorSpace {
                operation: "test op",
                expected: ColorSpace::Grayscale,
                found: ColorSpace::Rgb,
            }
        );
    }

    #[test]
    fn require_same_shape_reports_sizes() {
        let a = Raster::new_gray(4, 4);
        let b = Raster::new_gray(4, 5);
        assert_eq!(
            a.require_same_shape(&b, "op"),
            Err(ImagingError::DimensionMismatch {
                expected: (4, 4),
                found: (4, 5),
            })
        );
        assert!(a.require_same_shape(&a.clone(), "op").is_ok());
    }

    // --- Coordinate tests ---

    #[test]
    fn coordinate_systems_swap_order() {
        assert_eq!(CoordinateSystem::Matrix.point(3, 8), IntPoint::new(3, 8));
        assert_eq!(CoordinateSystem::Cartesian.point(3, 8), IntPoint::new(8, 3));
        assert_eq!(
            CoordinateSystem::Cartesian.row_col(IntPoint::new(8, 3)),
            (3, 8)
        );
    }

    #[test]
    fn bounding_box_of_points() {
        let pts = [IntPoint::new(3, 5), IntPoint::new(6, 4), IntPoint::new(4, 6)];
        let bb = BoundingBox::enclosing(&pts).unwrap();
        assert_eq!(
            bb,
            BoundingBox {
                x: 3,
                y: 4,
                width: 4,
                height: 3
            }
        );
        assert_eq!(bb.area(), 12);
        assert!(bb.contains(IntPoint::new(6, 6)));
        assert!(!bb.contains(IntPoint::new(7, 6)));
        assert!(BoundingBox::enclosing(&[]).is_none());
    }

    #[test]
    fn touches_is_eight_connectivity() {
        let p = IntPoint::new(5, 5);
        assert!(p.touches(IntPoint::new(6, 6)));
        assert!(p.touches(p));
        assert!(!p.touches(IntPoint::new(7, 5)));
    }

    // --- Error tests ---

    #[test]
    fn error_display() {
        let err = ImagingError::InvalidColorSpace {
            operation: "binary erosion",
            expected: ColorSpace::Grayscale,
            found: ColorSpace::Rgb,
        };
        assert_eq!(
            err.to_string(),
            "binary erosion requires a grayscale raster, got RGB"
        );
        let err = ImagingError::DimensionMismatch {
            expected: (10, 10),
            found: (10, 12),
        };
        assert_eq!(
            err.to_string(),
            "raster size mismatch: expected 10x10, got 10x12"
        );
        assert_eq!(
            ImagingError::NotSeparable.to_string(),
            "kernel is not separable"
        );
    }

    #[test]
    fn coordinate_system_serde_round_trip() {
        let json = serde_json::to_string(&CoordinateSystem::Cartesian).unwrap();
        let back: CoordinateSystem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CoordinateSystem::Cartesian);
    }

    #[test]
    fn point_serde_round_trip() {
        let p = IntPoint::new(4, 9);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(serde_json::from_str::<IntPoint>(&json).unwrap(), p);
    }
}
