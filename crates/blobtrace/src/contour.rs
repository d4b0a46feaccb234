//! Contour tracing: extract the outer and hole boundaries of every
//! 8-connected foreground region.
//!
//! Any nonzero gray level is foreground. [`FindContours::process`] returns
//! a [`ContourSet`] with the outer boundaries and the inner (hole)
//! boundaries in separate lists. Each [`Contour`] carries the label of the
//! region it bounds, so a region with holes yields one outer contour and
//! any number of inner contours sharing its label.
//!
//! # Strategy pattern
//!
//! [`ContourTracer`] is the seam for tracing algorithms and
//! [`ContourTracerKind`] selects one at runtime. The default,
//! [`MooreLabeling`](ContourTracerKind::MooreLabeling), labels regions and
//! follows their borders in a single row-major scan over a padded label
//! buffer. [`BorderFollowing`](ContourTracerKind::BorderFollowing) wraps
//! `imageproc`'s Suzuki-Abe implementation and reports the same topology
//! with a different point order.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::labels::{FIRST_LABEL, PaddedGrid, UNLABELED, VISITED};
use crate::types::{CoordinateSystem, ImagingError, IntPoint, Raster};

/// Neighbor offsets as `(d_col, d_row)`, clockwise from east.
const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Search direction of an outer trace (east).
const OUTER_START: usize = 0;

/// Search direction of an inner trace (south-east, from the last
/// foreground pixel before the hole).
const INNER_START: usize = 1;

/// Whether a contour bounds a region from outside or a hole inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContourKind {
    /// Boundary between a region and the background around it.
    Outer,
    /// Boundary of a background hole enclosed by a region.
    Inner,
}

/// One closed boundary trace.
///
/// The last point connects back to the first. Thin (one pixel wide)
/// parts of a region are walked in both directions, so their pixels
/// appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    /// Label of the bounded region, starting at 2.
    pub label: u32,
    /// Outer or inner boundary.
    pub kind: ContourKind,
    /// Boundary pixels in tracing order.
    pub points: Vec<IntPoint>,
}

impl Contour {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if consecutive points, including last to first, are
    /// all 8-neighbors.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let Some((&first, &last)) = self.points.first().zip(self.points.last()) else {
            return false;
        };
        last.touches(first) && self.points.windows(2).all(|w| w[0].touches(w[1]))
    }

    /// Length of the closed polyline: 1 per axial step, `√2` per diagonal
    /// step.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let Some(&first) = self.points.first() else {
            return 0.0;
        };
        let step = |a: IntPoint, b: IntPoint| match (a.x.abs_diff(b.x), a.y.abs_diff(b.y)) {
            (0, 0) => 0.0,
            (0, _) | (_, 0) => 1.0,
            _ => std::f64::consts::SQRT_2,
        };
        let closing = self.points.last().map_or(0.0, |&last| step(last, first));
        self.points
            .windows(2)
            .map(|w| step(w[0], w[1]))
            .sum::<f64>()
            + closing
    }
}

/// Outer and inner contours of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContourSet {
    /// Outer contours, one per region, in discovery order.
    pub outer: Vec<Contour>,
    /// Inner contours, in discovery order.
    pub inner: Vec<Contour>,
}

impl ContourSet {
    /// Outer contours, one per region.
    #[must_use]
    pub fn outer_contours(&self) -> &[Contour] {
        &self.outer
    }

    /// Inner (hole) contours.
    #[must_use]
    pub fn inner_contours(&self) -> &[Contour] {
        &self.inner
    }

    /// Inner contours of the region with `label`.
    pub fn holes_of(&self, label: u32) -> impl Iterator<Item = &Contour> {
        self.inner.iter().filter(move |c| c.label == label)
    }

    /// Total number of contours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outer.len() + self.inner.len()
    }

    /// Returns `true` if no contour was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty() && self.inner.is_empty()
    }
}

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourTracerKind {
    /// Single-pass labeling with Moore-neighbor border following.
    #[default]
    MooreLabeling,

    /// Suzuki-Abe border following via `imageproc::contours::find_contours`.
    ///
    /// Holes take the label of their enclosing outer border.
    BorderFollowing,
}

/// Trait for contour tracing strategies.
///
/// Input: a grayscale image whose nonzero pixels are foreground.
/// Output: outer and inner contours with points in `coordinates`.
pub trait ContourTracer {
    /// Trace every region boundary in `image`.
    fn trace(&self, image: &GrayImage, coordinates: CoordinateSystem) -> ContourSet;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, image: &GrayImage, coordinates: CoordinateSystem) -> ContourSet {
        match *self {
            Self::MooreLabeling => MooreTracer::new(image).run(coordinates),
            Self::BorderFollowing => trace_border_following(image, coordinates),
        }
    }
}

/// Contour extraction entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FindContours {
    /// Algorithm used for tracing.
    pub tracer: ContourTracerKind,
    /// Convention of every emitted point.
    pub coordinate_system: CoordinateSystem,
}

impl FindContours {
    /// Default tracer emitting points in `coordinate_system`.
    #[must_use]
    pub fn new(coordinate_system: CoordinateSystem) -> Self {
        Self {
            coordinate_system,
            ..Self::default()
        }
    }

    /// Same options with a different tracing algorithm.
    #[must_use]
    pub fn with_tracer(self, tracer: ContourTracerKind) -> Self {
        Self { tracer, ..self }
    }

    /// Trace the outer and inner contours of `raster`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidColorSpace`] if `raster` is RGB.
    pub fn process(&self, raster: &Raster) -> Result<ContourSet, ImagingError> {
        let image = raster.require_gray("contour tracing")?;
        let contours = self.tracer.trace(image, self.coordinate_system);
        log::debug!(
            "{:?} traced {} outer and {} inner contours on {}x{}",
            self.tracer,
            contours.outer.len(),
            contours.inner.len(),
            image.width(),
            image.height()
        );
        Ok(contours)
    }
}

/// Working state of one labeling scan.
struct MooreTracer {
    foreground: PaddedGrid<bool>,
    labels: PaddedGrid<i32>,
    steps: [isize; 8],
    width: usize,
    height: usize,
}

impl MooreTracer {
    #[allow(clippy::cast_possible_wrap)]
    fn new(image: &GrayImage) -> Self {
        let foreground = PaddedGrid::mask(image, |v| v > 0);
        let labels = PaddedGrid::new(image.width(), image.height(), UNLABELED);
        let stride = foreground.stride() as isize;
        Self {
            steps: DIRECTIONS.map(|(dc, dr)| dr * stride + dc),
            foreground,
            labels,
            width: image.width() as usize,
            height: image.height() as usize,
        }
    }

    /// Sweep clockwise from `dir` for the next foreground neighbor of
    /// `at`, marking skipped background cells as visited. An isolated
    /// pixel yields itself.
    fn next_point(&mut self, at: usize, mut dir: usize) -> (usize, usize) {
        for _ in 0..7 {
            let candidate = at.wrapping_add_signed(self.steps[dir]);
            if self.foreground.get_at(candidate) {
                return (candidate, dir);
            }
            self.labels.set_at(candidate, VISITED);
            dir = (dir + 1) % 8;
        }
        (at, dir)
    }

    /// Follow the border through `start` until the first move repeats.
    fn follow(&mut self, start: usize, dir: usize, label: i32) -> Vec<usize> {
        let (second, mut dir) = self.next_point(start, dir);
        let mut path = vec![second];
        let mut current = second;
        let mut done = start == second;
        while !done {
            self.labels.set_at(current, label);
            let (next, next_dir) = self.next_point(current, (dir + 6) % 8);
            dir = next_dir;
            let previous = current;
            current = next;
            done = previous == start && current == second;
            if !done {
                path.push(current);
            }
        }
        path
    }

    fn run(mut self, coordinates: CoordinateSystem) -> ContourSet {
        let mut contours = ContourSet::default();
        let mut next_label = FIRST_LABEL;

        for row in 1..=self.height {
            let mut label = UNLABELED;
            for col in 1..=self.width {
                let i = self.labels.index(row, col);
                if self.foreground.get_at(i) {
                    if label != UNLABELED {
                        self.labels.set_at(i, label);
                        continue;
                    }
                    label = self.labels.get_at(i);
                    if label == UNLABELED {
                        label = next_label;
                        next_label += 1;
                        let path = self.follow(i, OUTER_START, label);
                        contours
                            .outer
                            .push(self.contour(label, ContourKind::Outer, &path, coordinates));
                        self.labels.set_at(i, label);
                    }
                } else if label != UNLABELED {
                    if self.labels.get_at(i) == UNLABELED {
                        let path = self.follow(i - 1, INNER_START, label);
                        contours
                            .inner
                            .push(self.contour(label, ContourKind::Inner, &path, coordinates));
                    }
                    label = UNLABELED;
                }
            }
        }
        contours
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn contour(
        &self,
        label: i32,
        kind: ContourKind,
        path: &[usize],
        coordinates: CoordinateSystem,
    ) -> Contour {
        let stride = self.labels.stride();
        Contour {
            label: label as u32,
            kind,
            points: path
                .iter()
                .map(|&i| coordinates.point((i / stride - 1) as u32, (i % stride - 1) as u32))
                .collect(),
        }
    }
}

/// Suzuki-Abe border following via `imageproc::contours::find_contours`.
///
/// Outer borders are labeled from 2 in the order `imageproc` reports
/// them; a hole inherits the label of its parent border.
#[allow(clippy::cast_sign_loss)]
fn trace_border_following(image: &GrayImage, coordinates: CoordinateSystem) -> ContourSet {
    use imageproc::contours::BorderType;

    let found: Vec<imageproc::contours::Contour<u32>> = imageproc::contours::find_contours(image);

    let mut labels = vec![None; found.len()];
    let mut next_label = FIRST_LABEL as u32;
    for (slot, c) in labels.iter_mut().zip(&found) {
        if matches!(c.border_type, BorderType::Outer) {
            *slot = Some(next_label);
            next_label += 1;
        }
    }

    let mut contours = ContourSet::default();
    for (i, c) in found.into_iter().enumerate() {
        let (kind, label) = match c.border_type {
            BorderType::Outer => (ContourKind::Outer, labels[i]),
            BorderType::Hole => (ContourKind::Inner, c.parent.and_then(|p| labels[p])),
        };
        let points = c
            .points
            .into_iter()
            .map(|p| coordinates.point(p.y, p.x))
            .collect();
        let contour = Contour {
            label: label.unwrap_or(UNLABELED as u32),
            kind,
            points,
        };
        match kind {
            ContourKind::Outer => contours.outer.push(contour),
            ContourKind::Inner => contours.inner.push(contour),
        }
    }
    contours
}
