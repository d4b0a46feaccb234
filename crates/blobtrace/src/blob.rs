//! Connected-component labeling ("blob detection").
//!
//! A row-major scan seeds a region at every foreground pixel that has no
//! label yet and grows it with a stack-based 4-connected flood fill.
//! A pixel is foreground when its red channel (its gray level, for
//! grayscale rasters) is 255; the fill accepts neighbors whose full color
//! equals the seed's, so two touching foreground pixels of different
//! colors start separate regions.
//!
//! Regions are numbered from [`FIRST_LABEL`] upward in discovery order.
//! Labels live in an integer [`PaddedGrid`] allocated per call; the
//! input raster is never written.
//!
//! When area filtering is enabled only regions with
//! `min_area < area <= max_area` are reported, but the largest region is
//! tracked over all of them.

use serde::{Deserialize, Serialize};

use crate::labels::{FIRST_LABEL, PaddedGrid, UNLABELED};
use crate::types::{BoundingBox, CoordinateSystem, ImagingError, IntPoint, Raster};

/// Key of a frame cell; never equal to a packed 24-bit color.
const FRAME_KEY: u32 = u32::MAX;

/// Configuration for [`BlobDetection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobDetectionConfig {
    /// Only report regions with `min_area < area <= max_area`.
    pub filter_by_area: bool,

    /// Exclusive lower area bound used when filtering.
    pub min_area: u32,

    /// Inclusive upper area bound used when filtering. `None` means the
    /// pixel count of the processed raster.
    pub max_area: Option<u32>,

    /// Convention of every emitted coordinate.
    pub coordinate_system: CoordinateSystem,
}

impl Default for BlobDetectionConfig {
    fn default() -> Self {
        Self {
            filter_by_area: false,
            min_area: Self::DEFAULT_MIN_AREA,
            max_area: None,
            coordinate_system: CoordinateSystem::default(),
        }
    }
}

impl BlobDetectionConfig {
    /// Default exclusive lower area bound.
    pub const DEFAULT_MIN_AREA: u32 = 1;

    /// Check that the area bounds are ordered.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidConfig`] if `max_area` is set and
    /// below `min_area`.
    pub fn validate(&self) -> Result<(), ImagingError> {
        match self.max_area {
            Some(max) if max < self.min_area => Err(ImagingError::InvalidConfig(format!(
                "max_area ({max}) is below min_area ({})",
                self.min_area
            ))),
            _ => Ok(()),
        }
    }
}

/// One 4-connected foreground region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Label assigned at discovery, starting at 2.
    pub id: u32,
    /// Number of member pixels.
    pub area: u32,
    /// Mean member coordinate, truncated toward zero.
    pub centroid: IntPoint,
    /// Smallest box containing every member.
    pub bounding_box: BoundingBox,
    /// Member pixels in flood-fill order.
    pub points: Vec<IntPoint>,
}

impl Blob {
    /// Bounding box width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.bounding_box.width) / f64::from(self.bounding_box.height)
    }

    /// Fraction of the bounding box covered by the region.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn extent(&self) -> f64 {
        f64::from(self.area) / self.bounding_box.area() as f64
    }

    /// Returns `true` if `point` is a member pixel.
    #[must_use]
    pub fn contains(&self, point: IntPoint) -> bool {
        self.bounding_box.contains(point) && self.points.contains(&point)
    }
}

/// Result of one [`BlobDetection::process_image`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlobReport {
    /// Regions that passed the area filter, in discovery order.
    pub blobs: Vec<Blob>,
    /// Number of regions found before filtering.
    pub region_count: u32,
    /// Id and area of the largest region found, filtered or not. Ties go
    /// to the region discovered first.
    pub biggest: Option<(u32, u32)>,
}

impl BlobReport {
    /// Id of the largest region, or `None` when there was no foreground.
    #[must_use]
    pub fn biggest_blob_id(&self) -> Option<u32> {
        self.biggest.map(|(id, _)| id)
    }

    /// The largest region if it passed the filter.
    #[must_use]
    pub fn biggest_blob(&self) -> Option<&Blob> {
        let id = self.biggest_blob_id()?;
        self.blobs.iter().find(|b| b.id == id)
    }

    /// Sum of the reported blobs' areas.
    #[must_use]
    pub fn total_area(&self) -> u64 {
        self.blobs.iter().map(|b| u64::from(b.area)).sum()
    }
}

/// Connected-component labeler.
///
/// Holds configuration only, so one instance can process any number of
/// rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlobDetection {
    /// Filtering and output options.
    pub config: BlobDetectionConfig,
}

impl BlobDetection {
    /// Labeler with the given configuration.
    #[must_use]
    pub const fn new(config: BlobDetectionConfig) -> Self {
        Self { config }
    }

    /// Labeler reporting only regions with `min_area < area <= max_area`.
    #[must_use]
    pub fn with_area_filter(min_area: u32, max_area: u32) -> Self {
        Self::new(BlobDetectionConfig {
            filter_by_area: true,
            min_area,
            max_area: Some(max_area),
            ..BlobDetectionConfig::default()
        })
    }

    /// Label every foreground region of `raster`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidConfig`] if the area bounds are
    /// inconsistent.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn process_image(&self, raster: &Raster) -> Result<BlobReport, ImagingError> {
        self.config.validate()?;
        let (width, height) = (raster.width(), raster.height());
        let max_area = self
            .config
            .max_area
            .unwrap_or_else(|| width.saturating_mul(height));

        let mut keys = PaddedGrid::new(width, height, FRAME_KEY);
        for row in 0..height {
            for col in 0..width {
                let [r, g, b] = raster.rgb(row, col);
                let key = u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b);
                keys.set(row as usize + 1, col as usize + 1, key);
            }
        }

        let mut labels = PaddedGrid::new(width, height, UNLABELED);
        let mut stack = Vec::new();
        let mut report = BlobReport::default();
        let mut next_label = FIRST_LABEL;
        let stride = keys.stride();

        for row in 0..height {
            for col in 0..width {
                let seed = keys.index(row as usize + 1, col as usize + 1);
                if labels.get_at(seed) != UNLABELED || raster.red(row, col) != 255 {
                    continue;
                }

                let label = next_label;
                next_label += 1;
                let seed_key = keys.get_at(seed);
                let mut region = RegionAccumulator::default();

                stack.push(seed);
                while let Some(i) = stack.pop() {
                    if labels.get_at(i) != UNLABELED || keys.get_at(i) != seed_key {
                        continue;
                    }
                    labels.set_at(i, label);
                    region.add((i / stride - 1) as u32, (i % stride - 1) as u32);
                    stack.extend([i - stride, i + stride, i - 1, i + 1]);
                }

                let blob = region.finish(label as u32, self.config.coordinate_system);
                report.region_count += 1;
                if report.biggest.is_none_or(|(_, area)| blob.area > area) {
                    report.biggest = Some((blob.id, blob.area));
                }
                if !self.config.filter_by_area
                    || (blob.area > self.config.min_area && blob.area <= max_area)
                {
                    report.blobs.push(blob);
                }
            }
        }

        log::debug!(
            "blob detection on {width}x{height}: {} regions, {} reported, biggest {:?}",
            report.region_count,
            report.blobs.len(),
            report.biggest
        );
        Ok(report)
    }
}

/// Running statistics of the region being filled.
#[derive(Debug, Default)]
struct RegionAccumulator {
    rows: Vec<u32>,
    cols: Vec<u32>,
    row_sum: u64,
    col_sum: u64,
}

impl RegionAccumulator {
    fn add(&mut self, row: u32, col: u32) {
        self.rows.push(row);
        self.cols.push(col);
        self.row_sum += u64::from(row);
        self.col_sum += u64::from(col);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finish(self, id: u32, cs: CoordinateSystem) -> Blob {
        let area = self.rows.len() as u32;
        let n = u64::from(area.max(1));
        let centroid = cs.point((self.row_sum / n) as u32, (self.col_sum / n) as u32);
        let points: Vec<IntPoint> = self
            .rows
            .iter()
            .zip(&self.cols)
            .map(|(&r, &c)| cs.point(r, c))
            .collect();
        let bounding_box = BoundingBox::enclosing(&points).unwrap_or(BoundingBox {
            x: centroid.x,
            y: centroid.y,
            width: 0,
            height: 0,
        });
        Blob {
            id,
            area,
            centroid,
            bounding_box,
            points,
        }
    }
}
