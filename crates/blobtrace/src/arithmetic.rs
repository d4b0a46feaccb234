//! Pixel-wise arithmetic on rasters.
//!
//! [`combine`] merges two rasters of the same size and color space
//! sample by sample, saturating to `0..=255`. [`invert`] maps every
//! sample `v` to `255 - v`.

use serde::{Deserialize, Serialize};

use crate::types::{ImagingError, Raster};

/// Sample-wise operation applied by [`combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    /// `a + b`, saturating at 255.
    Add,
    /// `a - b`, saturating at 0.
    Subtract,
    /// `|a - b|`.
    Difference,
    /// `min(a, b)`.
    Min,
    /// `max(a, b)`.
    Max,
    /// Bitwise `a & b`.
    And,
    /// Bitwise `a | b`.
    Or,
}

impl Op {
    /// Combine two samples.
    #[must_use]
    pub const fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            Self::Add => a.saturating_add(b),
            Self::Subtract => a.saturating_sub(b),
            Self::Difference => a.abs_diff(b),
            Self::Min => if a < b { a } else { b },
            Self::Max => if a > b { a } else { b },
            Self::And => a & b,
            Self::Or => a | b,
        }
    }
}

/// Combine `a` and `b` sample by sample into a new raster.
///
/// # Errors
///
/// Returns [`ImagingError::DimensionMismatch`] if the sizes differ and
/// [`ImagingError::InvalidColorSpace`] if one raster is grayscale and the
/// other RGB.
pub fn combine(a: &Raster, b: &Raster, op: Op) -> Result<Raster, ImagingError> {
    a.require_same_shape(b, "raster arithmetic")?;
    let mut out = a.clone();
    for (dst, &src) in out.as_raw_mut().iter_mut().zip(b.as_raw()) {
        *dst = op.apply(*dst, src);
    }
    Ok(out)
}

/// Negative of `raster`: every sample `v` becomes `255 - v`.
#[must_use = "returns the inverted raster"]
pub fn invert(raster: &Raster) -> Raster {
    let mut out = raster.clone();
    for v in out.as_raw_mut() {
        *v = !*v;
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ColorSpace;

    fn filled(width: u32, height: u32, level: u8) -> Raster {
        Raster::gray_from_fn(width, height, |_, _| level)
    }

    #[test]
    fn add_and_subtract_saturate() {
        let a = filled(2, 2, 200);
        let b = filled(2, 2, 100);
        assert_eq!(combine(&a, &b, Op::Add).unwrap(), filled(2, 2, 255));
        assert_eq!(combine(&b, &a, Op::Subtract).unwrap(), filled(2, 2, 0));
        assert_eq!(combine(&a, &b, Op::Subtract).unwrap(), filled(2, 2, 100));
    }

    #[test]
    fn sample_ops() {
        assert_eq!(Op::Difference.apply(10, 250), 240);
        assert_eq!(Op::Min.apply(10, 250), 10);
        assert_eq!(Op::Max.apply(10, 250), 250);
        assert_eq!(Op::And.apply(0b1100, 0b1010), 0b1000);
        assert_eq!(Op::Or.apply(0b1100, 0b1010), 0b1110);
    }

    #[test]
    fn rgb_combines_per_channel() {
        let mut a = Raster::new_rgb(1, 1);
        a.set_rgb(0, 0, [10, 20, 30]);
        let mut b = Raster::new_rgb(1, 1);
        b.set_rgb(0, 0, [30, 20, 10]);
        let out = combine(&a, &b, Op::Max).unwrap();
        assert_eq!(out.rgb(0, 0), [30, 20, 30]);
    }

    #[test]
    fn size_mismatch_faults() {
        let err = combine(&filled(3, 2, 0), &filled(2, 3, 0), Op::Add).unwrap_err();
        assert_eq!(
            err,
            ImagingError::DimensionMismatch {
                expected: (3, 2),
                found: (2, 3),
            }
        );
    }

    #[test]
    fn color_space_mismatch_faults() {
        let err = combine(&filled(2, 2, 0), &Raster::new_rgb(2, 2), Op::Or).unwrap_err();
        assert_eq!(
            err,
            ImagingError::InvalidColorSpace {
                operation: "raster arithmetic",
                expected: ColorSpace::Grayscale,
                found: ColorSpace::Rgb,
            }
        );
    }

    #[test]
    fn invert_swaps_black_and_white() {
        let mut r = filled(2, 1, 0);
        r.set_gray(0, 1, 55);
        let out = invert(&r);
        assert_eq!(out.gray(0, 0), 255);
        assert_eq!(out.gray(0, 1), 200);
        assert_eq!(invert(&out), r);
    }
}
