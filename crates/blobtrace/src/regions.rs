//! Region-level filters built on [`BlobDetection`].
//!
//! These operators label the raster, decide per region what to keep and
//! repaint the rejected regions in place. Regions follow the labeler's
//! rules: 4-connected, foreground where the red (or gray) channel is 255,
//! split by exact color.

use serde::{Deserialize, Serialize};

use crate::arithmetic::invert;
use crate::blob::{Blob, BlobDetection, BlobDetectionConfig, BlobReport};
use crate::types::{
    BLACK, CoordinateSystem, ImagingError, IntPoint, Raster, RasterFilter, WHITE,
};

/// Overwrite `points` (matrix convention) with `level` in every channel.
fn paint(raster: &mut Raster, points: &[IntPoint], level: u8) {
    for &p in points {
        let (row, col) = CoordinateSystem::Matrix.row_col(p);
        raster.set_gray(row, col, level);
    }
}

/// Label every region of `raster` with matrix coordinates.
fn all_regions(raster: &Raster) -> Result<BlobReport, ImagingError> {
    BlobDetection::default().process_image(raster)
}

/// Keeps only the largest foreground region; every other region is
/// cleared to black.
///
/// Ties go to the region found first in row-major order. A raster
/// without foreground is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractBiggestBlob;

impl RasterFilter for ExtractBiggestBlob {
    fn apply_in_place(&self, raster: &mut Raster) -> Result<(), ImagingError> {
        let report = all_regions(raster)?;
        let Some(keep) = report.biggest_blob_id() else {
            return Ok(());
        };
        for blob in report.blobs.iter().filter(|b| b.id != keep) {
            paint(raster, &blob.points, BLACK);
        }
        log::debug!(
            "kept blob {keep}, cleared {} others",
            report.blobs.len().saturating_sub(1)
        );
        Ok(())
    }
}

/// Clears every region whose area falls outside
/// `min_area < area <= max_area`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobsFiltering {
    /// Exclusive lower bound.
    pub min_area: u32,
    /// Inclusive upper bound.
    pub max_area: u32,
}

impl BlobsFiltering {
    /// Filter keeping regions with `min_area < area <= max_area`.
    #[must_use]
    pub const fn new(min_area: u32, max_area: u32) -> Self {
        Self { min_area, max_area }
    }

    const fn keeps(&self, blob: &Blob) -> bool {
        blob.area > self.min_area && blob.area <= self.max_area
    }
}

impl RasterFilter for BlobsFiltering {
    fn apply_in_place(&self, raster: &mut Raster) -> Result<(), ImagingError> {
        BlobDetectionConfig {
            filter_by_area: true,
            min_area: self.min_area,
            max_area: Some(self.max_area),
            ..BlobDetectionConfig::default()
        }
        .validate()?;

        let report = all_regions(raster)?;
        let mut cleared = 0usize;
        for blob in report.blobs.iter().filter(|b| !self.keeps(b)) {
            paint(raster, &blob.points, BLACK);
            cleared += 1;
        }
        log::debug!(
            "area filter ({}, {}]: cleared {cleared} of {} regions",
            self.min_area,
            self.max_area,
            report.region_count
        );
        Ok(())
    }
}

/// Fills holes in white objects: every 4-connected black region that
/// does not touch the raster border becomes white.
///
/// Only pure black (0) pixels belong to a hole. Grayscale only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FillHoles {
    /// Holes larger than this are left open. `None` fills every hole.
    pub max_hole_area: Option<u32>,
}

impl FillHoles {
    /// Fill only holes of at most `max_hole_area` pixels.
    #[must_use]
    pub const fn up_to(max_hole_area: u32) -> Self {
        Self {
            max_hole_area: Some(max_hole_area),
        }
    }
}

impl RasterFilter for FillHoles {
    fn apply_in_place(&self, raster: &mut Raster) -> Result<(), ImagingError> {
        raster.require_gray("fill holes")?;
        let (width, height) = (raster.width(), raster.height());

        // Pure black is the only level that inverts to foreground.
        let report = all_regions(&invert(raster))?;
        let mut filled = 0usize;
        for gap in &report.blobs {
            // Matrix convention: x spans rows, y spans columns.
            let b = gap.bounding_box;
            let touches_border =
                b.x == 0 || b.y == 0 || b.x + b.width == height || b.y + b.height == width;
            let small_enough = self.max_hole_area.is_none_or(|max| gap.area <= max);
            if !touches_border && small_enough {
                paint(raster, &gap.points, WHITE);
                filled += 1;
            }
        }
        log::debug!(
            "filled {filled} of {} background regions",
            report.region_count
        );
        Ok(())
    }
}

/// Grayscale raster with the member pixels of `blobs` white on black.
///
/// `coordinates` is the convention the blobs were detected in. Points
/// outside `width x height` are skipped.
#[must_use]
pub fn blob_mask(width: u32, height: u32, blobs: &[Blob], coordinates: CoordinateSystem) -> Raster {
    let mut mask = Raster::new_gray(width, height);
    for p in blobs.iter().flat_map(|b| &b.points) {
        let (row, col) = coordinates.row_col(*p);
        if row < height && col < width {
            mask.set_gray(row, col, WHITE);
        }
    }
    mask
}
