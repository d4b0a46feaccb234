//! Binary erosion, dilation, opening and closing.
//!
//! Input rasters must be grayscale and are treated as binary: white
//! (255) pixels form the objects, black (0) the background.
//!
//! Both primitives work by propagation from a snapshot of the input:
//! erosion copies every black pixel onto its neighborhood, dilation
//! copies every white pixel onto its neighborhood. The neighborhood is a
//! `(2r + 1)` square for [`MorphologyElement::Radius`] or the set cells of
//! a [`StructuringElement`]. Neighborhood cells outside the raster are
//! ignored. Levels other than 0 and 255 never propagate but can be
//! overwritten.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::kernel::StructuringElement;
use crate::types::{BLACK, ImagingError, Raster, RasterFilter, WHITE};

/// Neighborhood used by a morphological operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MorphologyElement {
    /// Full square of side `2 * radius + 1`.
    Radius(u32),
    /// Explicit structuring element.
    Element(StructuringElement),
}

impl Default for MorphologyElement {
    fn default() -> Self {
        Self::Radius(Self::DEFAULT_RADIUS)
    }
}

impl From<StructuringElement> for MorphologyElement {
    fn from(element: StructuringElement) -> Self {
        Self::Element(element)
    }
}

impl MorphologyElement {
    /// Radius used by [`Default`].
    pub const DEFAULT_RADIUS: u32 = 1;
}

/// Copy every `seed`-valued pixel of a snapshot onto its neighborhood.
///
/// A square neighborhood is clipped to the raster before it is walked, so
/// the cost per seed never exceeds the raster area whatever the radius.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn propagate(image: &mut GrayImage, element: &MorphologyElement, seed: u8) {
    let snapshot = image.clone();
    let (w, h) = (image.width(), image.height());
    let seeds = snapshot
        .enumerate_pixels()
        .filter(|(_, _, px)| px.0[0] == seed)
        .map(|(x, y, _)| (x, y));
    match element {
        MorphologyElement::Radius(r) => {
            for (x, y) in seeds {
                let rows = y.saturating_sub(*r)..=y.saturating_add(*r).min(h - 1);
                for ny in rows {
                    let cols = x.saturating_sub(*r)..=x.saturating_add(*r).min(w - 1);
                    for nx in cols {
                        image.put_pixel(nx, ny, image::Luma([seed]));
                    }
                }
            }
        }
        MorphologyElement::Element(e) => {
            let offsets = e.offsets();
            let (w, h) = (w as isize, h as isize);
            for (x, y) in seeds {
                for &(dr, dc) in &offsets {
                    let (nx, ny) = (x as isize + dc, y as isize + dr);
                    if (0..w).contains(&nx) && (0..h).contains(&ny) {
                        image.put_pixel(nx as u32, ny as u32, image::Luma([seed]));
                    }
                }
            }
        }
    }
}

macro_rules! binary_operator {
    ($(#[$doc:meta])* $name:ident, $op:literal, |$img:ident, $element:ident| $body:block) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub struct $name {
            /// Neighborhood of the operator.
            pub element: MorphologyElement,
        }

        impl $name {
            /// Operator with a square neighborhood of the given radius.
            #[must_use]
            pub const fn with_radius(radius: u32) -> Self {
                Self {
                    element: MorphologyElement::Radius(radius),
                }
            }

            /// Operator with an explicit structuring element.
            #[must_use]
            pub const fn with_element(element: StructuringElement) -> Self {
                Self {
                    element: MorphologyElement::Element(element),
                }
            }
        }

        impl RasterFilter for $name {
            fn apply_in_place(&self, raster: &mut Raster) -> Result<(), ImagingError> {
                let $img = raster.require_gray_mut($op)?;
                let $element = &self.element;
                $body
                Ok(())
            }
        }
    };
}

binary_operator!(
    /// Shrinks white objects: every black pixel blackens its neighborhood.
    BinaryErosion,
    "binary erosion",
    |img, element| {
        propagate(img, element, BLACK);
    }
);

binary_operator!(
    /// Grows white objects: every white pixel whitens its neighborhood.
    BinaryDilation,
    "binary dilation",
    |img, element| {
        propagate(img, element, WHITE);
    }
);

binary_operator!(
    /// Erosion followed by dilation with the same element. Removes white
    /// specks smaller than the element.
    BinaryOpening,
    "binary opening",
    |img, element| {
        propagate(img, element, BLACK);
        propagate(img, element, WHITE);
    }
);

binary_operator!(
    /// Dilation followed by erosion with the same element. Fills black
    /// gaps smaller than the element.
    BinaryClosing,
    "binary closing",
    |img, element| {
        propagate(img, element, WHITE);
        propagate(img, element, BLACK);
    }
);
