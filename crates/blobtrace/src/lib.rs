//! blobtrace: classical raster operators (sans-IO).
//!
//! Operates on in-memory grayscale or RGB [`Raster`]s:
//!
//! - [`kernel`]: convolution kernels, separability via SVD, structuring
//!   elements.
//! - [`convolution`]: full 2D and separable convolution with zero or
//!   replicate borders.
//! - [`morphology`]: binary erosion, dilation, opening and closing.
//! - [`blob`]: 4-connected component labeling with per-region statistics.
//! - [`contour`]: outer and hole boundary tracing of 8-connected regions.
//! - [`regions`]: region filters built on the labeler (biggest blob, area
//!   filter, hole filling).
//! - [`arithmetic`]: sample-wise combination of two rasters.
//!
//! In-place operators implement [`RasterFilter`]. Analyses
//! ([`BlobDetection`], [`FindContours`]) read the raster and return plain
//! data. Nothing here decodes files or touches the filesystem; callers
//! bring their own pixels.
//!
//! Operators log through the [`log`] facade at `debug` and `trace`
//! level. Install any logger to see them.

pub mod arithmetic;
pub mod blob;
pub mod contour;
pub mod convolution;
pub mod kernel;
mod labels;
pub mod morphology;
pub mod regions;
pub mod types;

pub use arithmetic::{Op, combine, invert};
pub use blob::{Blob, BlobDetection, BlobDetectionConfig, BlobReport};
pub use contour::{
    Contour, ContourKind, ContourSet, ContourTracer, ContourTracerKind, FindContours,
};
pub use convolution::{BorderMode, Convolution, ConvolutionConfig, SeparableConvolution};
pub use kernel::{Kernel, SeparableKernel, StructuringElement};
pub use morphology::{
    BinaryClosing, BinaryDilation, BinaryErosion, BinaryOpening, MorphologyElement,
};
pub use regions::{BlobsFiltering, ExtractBiggestBlob, FillHoles, blob_mask};
pub use types::{
    BoundingBox, ColorSpace, CoordinateSystem, ImagingError, IntPoint, Raster, RasterFilter,
};
