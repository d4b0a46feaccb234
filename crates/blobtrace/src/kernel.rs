//! Convolution kernels and morphological structuring elements.
//!
//! A [`Kernel`] is a rectangular matrix of real weights with odd
//! dimensions so that it has a center cell. Separability is decided by
//! the numerical rank of that matrix: a rank-1 kernel is the outer
//! product of a column and a row vector and can be applied as two 1D
//! passes (see [`crate::convolution::SeparableConvolution`]).
//!
//! A [`StructuringElement`] is the binary counterpart used by
//! [`crate::morphology`]: cells equal to `1` are part of the
//! neighborhood.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::types::ImagingError;

/// Lower bound of the element sum accepted by [`Kernel::is_normalized`].
pub const NORMALIZED_SUM_MIN: f64 = 0.99;

/// Upper bound of the element sum accepted by [`Kernel::is_normalized`].
pub const NORMALIZED_SUM_MAX: f64 = 1.0;

/// Rounding slack above [`NORMALIZED_SUM_MAX`]; a kernel produced by
/// [`Kernel::normalize`] may sum to `1.0 + ulp`.
const SUM_SLACK: f64 = 1e-9;

/// A 2D convolution kernel with odd width and height.
///
/// Serialized as a list of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Kernel {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Kernel {
    /// Create a kernel from row-major `values`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] if either dimension is zero
    /// or even, if `values.len() != width * height`, or if any weight is
    /// not finite.
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Result<Self, ImagingError> {
        check_dimensions(width, height)?;
        if values.len() != width * height {
            return Err(ImagingError::InvalidKernel(format!(
                "expected {} weights for a {width}x{height} kernel, got {}",
                width * height,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ImagingError::InvalidKernel(
                "weights must be finite".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Create a kernel from a slice of equally long rows.
    ///
    /// # Errors
    ///
    /// Same as [`Kernel::new`], plus ragged rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ImagingError> {
        let (width, values) = flatten_rows(rows)?;
        Self::new(width, rows.len(), values)
    }

    /// Outer product `vertical * horizontal^T`: cell `(r, c)` is
    /// `vertical[r] * horizontal[c]`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] if either vector is empty
    /// or has even length.
    pub fn outer(horizontal: &[f64], vertical: &[f64]) -> Result<Self, ImagingError> {
        let values = vertical
            .iter()
            .flat_map(|&v| horizontal.iter().map(move |&h| v * h))
            .collect();
        Self::new(horizontal.len(), vertical.len(), values)
    }

    /// `(2 * radius + 1)` square kernel of ones (a box / mean filter when
    /// divided by its sum).
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] if the kernel size does not
    /// fit in `usize`.
    pub fn box_filter(radius: usize) -> Result<Self, ImagingError> {
        let side = square_side(radius)?;
        Ok(Self {
            width: side,
            height: side,
            values: vec![1.0; side * side],
        })
    }

    /// Sampled, normalized Gaussian of the given `radius` and `sigma`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] if `sigma` is not a
    /// positive finite number, or if the kernel size does not fit in
    /// `usize`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    pub fn gaussian(radius: usize, sigma: f64) -> Result<Self, ImagingError> {
        square_side(radius)?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(ImagingError::InvalidKernel(format!(
                "gaussian sigma must be positive, got {sigma}"
            )));
        }
        let r = radius as isize;
        let taps: Vec<f64> = (-r..=r)
            .map(|d| {
                let d = d as f64;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        Ok(Self::outer(&taps, &taps)?.normalize())
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Horizontal half-extent, `(width - 1) / 2`.
    #[must_use]
    pub const fn radius_x(&self) -> usize {
        (self.width - 1) / 2
    }

    /// Vertical half-extent, `(height - 1) / 2`.
    #[must_use]
    pub const fn radius_y(&self) -> usize {
        (self.height - 1) / 2
    }

    /// Weight at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    /// Row-major weights.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Divide every weight by the sum of all weights.
    ///
    /// A kernel whose weights sum to zero is returned unchanged.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let sum = self.sum();
        if sum == 0.0 {
            return self.clone();
        }
        Self {
            values: self.values.iter().map(|v| v / sum).collect(),
            ..self.clone()
        }
    }

    /// Returns `true` if the weights sum to a value in
    /// [[`NORMALIZED_SUM_MIN`], [`NORMALIZED_SUM_MAX`]].
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (NORMALIZED_SUM_MIN..=NORMALIZED_SUM_MAX + SUM_SLACK).contains(&self.sum())
    }

    /// Numerical rank of the weight matrix.
    ///
    /// Singular values below `max(width, height) * s_max * f64::EPSILON`
    /// count as zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rank(&self) -> usize {
        let sv = self.to_matrix().singular_values();
        let s_max = sv.iter().copied().fold(0.0_f64, f64::max);
        let tol = self.width.max(self.height) as f64 * s_max * f64::EPSILON;
        log::trace!(
            "{}x{} kernel singular values {:?}",
            self.width,
            self.height,
            sv.as_slice()
        );
        sv.iter().filter(|&&s| s > tol).count()
    }

    /// Returns `true` if the kernel has rank 1.
    #[must_use]
    pub fn is_separable(&self) -> bool {
        self.rank() == 1
    }

    /// Factor a rank-1 kernel into a row and a column vector.
    ///
    /// Both vectors are the leading singular vectors scaled by the square
    /// root of the leading singular value, so their outer product
    /// reproduces the kernel. The sign is chosen so that the largest
    /// magnitude entry of the vertical vector is positive.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::NotSeparable`] if the rank is not 1.
    pub fn decompose(&self) -> Result<SeparableKernel, ImagingError> {
        if !self.is_separable() {
            return Err(ImagingError::NotSeparable);
        }
        let svd = self.to_matrix().svd(true, true);
        let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
            return Err(ImagingError::NotSeparable);
        };
        let (lead, s) = svd
            .singular_values
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, s)| if s > best.1 { (i, s) } else { best });
        let scale = s.sqrt();

        let mut vertical: Vec<f64> = u.column(lead).iter().map(|x| x * scale).collect();
        let mut horizontal: Vec<f64> = v_t.row(lead).iter().map(|x| x * scale).collect();

        let dominant = vertical
            .iter()
            .copied()
            .fold(0.0_f64, |a, b| if b.abs() > a.abs() { b } else { a });
        if dominant < 0.0 {
            vertical.iter_mut().for_each(|x| *x = -*x);
            horizontal.iter_mut().for_each(|x| *x = -*x);
        }

        Ok(SeparableKernel {
            horizontal,
            vertical,
        })
    }

    fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.height, self.width, &self.values)
    }
}

impl TryFrom<Vec<Vec<f64>>> for Kernel {
    type Error = ImagingError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Kernel> for Vec<Vec<f64>> {
    fn from(kernel: Kernel) -> Self {
        kernel
            .values
            .chunks(kernel.width)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

/// A kernel given as a horizontal and a vertical 1D pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparableKernel {
    /// Weights applied along each row (left to right).
    pub horizontal: Vec<f64>,
    /// Weights applied along each column (top to bottom).
    pub vertical: Vec<f64>,
}

impl SeparableKernel {
    /// Pair two 1D kernels.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] if either vector is empty,
    /// has even length, or holds a non-finite weight.
    pub fn new(horizontal: Vec<f64>, vertical: Vec<f64>) -> Result<Self, ImagingError> {
        check_dimensions(horizontal.len(), vertical.len())?;
        if horizontal.iter().chain(&vertical).any(|v| !v.is_finite()) {
            return Err(ImagingError::InvalidKernel(
                "weights must be finite".to_string(),
            ));
        }
        Ok(Self {
            horizontal,
            vertical,
        })
    }

    /// Product of the two vectors' sums: the sum of the equivalent 2D
    /// kernel.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.horizontal.iter().sum::<f64>() * self.vertical.iter().sum::<f64>()
    }

    /// The equivalent 2D kernel.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] for malformed vectors
    /// (only possible when the public fields were edited directly).
    pub fn to_kernel(&self) -> Result<Kernel, ImagingError> {
        Kernel::outer(&self.horizontal, &self.vertical)
    }
}

/// A binary structuring element with odd width and height.
///
/// Serialized as a list of rows of `0`/`1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct StructuringElement {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl StructuringElement {
    /// Create an element from rows of `0`/`1`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] for empty, ragged or
    /// even-sized input, or for any cell other than `0` or `1`.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, ImagingError> {
        let (width, values) = flatten_rows(rows)?;
        check_dimensions(width, rows.len())?;
        let cells = values
            .into_iter()
            .map(|v| match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(ImagingError::InvalidKernel(format!(
                    "structuring element cells must be 0 or 1, got {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Full `(2 * radius + 1)` square.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] if the element size does not
    /// fit in `usize`.
    pub fn square(radius: usize) -> Result<Self, ImagingError> {
        let side = square_side(radius)?;
        Ok(Self {
            width: side,
            height: side,
            cells: vec![true; side * side],
        })
    }

    /// Plus-shaped element with arms of length `radius`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidKernel`] if the element size does not
    /// fit in `usize`.
    pub fn cross(radius: usize) -> Result<Self, ImagingError> {
        let side = square_side(radius)?;
        let cells = (0..side * side)
            .map(|i| i / side == radius || i % side == radius)
            .collect();
        Ok(Self {
            width: side,
            height: side,
            cells,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if the cell at `(row, col)` is set.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.width + col]
    }

    /// `(d_row, d_col)` offsets of the set cells relative to the center
    /// cell `((height - 1) / 2, (width - 1) / 2)`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let cy = ((self.height - 1) / 2) as isize;
        let cx = ((self.width - 1) / 2) as isize;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(|(i, _)| {
                (
                    (i / self.width) as isize - cy,
                    (i % self.width) as isize - cx,
                )
            })
            .collect()
    }
}

impl TryFrom<Vec<Vec<u8>>> for StructuringElement {
    type Error = ImagingError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<StructuringElement> for Vec<Vec<u8>> {
    fn from(element: StructuringElement) -> Self {
        element
            .cells
            .chunks(element.width)
            .map(|row| row.iter().map(|&set| u8::from(set)).collect())
            .collect()
    }
}

/// Side of a `(2 * radius + 1)` square whose cell count fits in `usize`.
fn square_side(radius: usize) -> Result<usize, ImagingError> {
    radius
        .checked_mul(2)
        .and_then(|d| d.checked_add(1))
        .filter(|side| side.checked_mul(*side).is_some())
        .ok_or_else(|| ImagingError::InvalidKernel(format!("radius {radius} is too large")))
}

fn check_dimensions(width: usize, height: usize) -> Result<(), ImagingError> {
    if width == 0 || height == 0 {
        return Err(ImagingError::InvalidKernel("kernel is empty".to_string()));
    }
    if width % 2 == 0 || height % 2 == 0 {
        return Err(ImagingError::InvalidKernel(format!(
            "kernel dimensions must be odd, got {width}x{height}"
        )));
    }
    Ok(())
}

fn flatten_rows<T: Copy, R: AsRef<[T]>>(rows: &[R]) -> Result<(usize, Vec<T>), ImagingError> {
    let width = rows.first().map_or(0, |r| r.as_ref().len());
    let mut values = Vec::with_capacity(width * rows.len());
    for (i, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != width {
            return Err(ImagingError::InvalidKernel(format!(
                "row {i} has {} cells, expected {width}",
                row.len()
            )));
        }
        values.extend_from_slice(row);
    }
    Ok((width, values))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    fn sobel_x() -> Kernel {
        Kernel::from_rows(&[[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]]).unwrap()
    }

    // --- construction ---

    #[test]
    fn rejects_even_and_empty_kernels() {
        assert!(matches!(
            Kernel::from_rows(&[[1.0, 1.0], [1.0, 1.0]]),
            Err(ImagingError::InvalidKernel(_))
        ));
        assert!(matches!(
            Kernel::new(0, 0, vec![]),
            Err(ImagingError::InvalidKernel(_))
        ));
        assert!(matches!(
            Kernel::new(3, 1, vec![1.0, 2.0]),
            Err(ImagingError::InvalidKernel(_))
        ));
        assert!(matches!(
            Kernel::new(1, 1, vec![f64::NAN]),
            Err(ImagingError::InvalidKernel(_))
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]];
        assert!(matches!(
            Kernel::from_rows(&rows),
            Err(ImagingError::InvalidKernel(_))
        ));
    }

    #[test]
    fn rectangular_kernel_radii() {
        let k = Kernel::new(5, 3, vec![1.0; 15]).unwrap();
        assert_eq!((k.radius_x(), k.radius_y()), (2, 1));
        assert_close(k.sum(), 15.0);
    }

    #[test]
    fn outer_product_layout() {
        let k = Kernel::outer(&[1.0, 2.0, 3.0], &[1.0, 10.0, 100.0]).unwrap();
        assert_close(k.get(0, 2), 3.0);
        assert_close(k.get(2, 0), 100.0);
        assert_close(k.get(1, 1), 20.0);
    }

    // --- normalization ---

    #[test]
    fn normalize_divides_by_sum() {
        let k = Kernel::box_filter(1).unwrap().normalize();
        for &v in k.values() {
            assert_close(v, 1.0 / 9.0);
        }
        assert!(k.is_normalized());
        assert!(!Kernel::box_filter(1).unwrap().is_normalized());
    }

    #[test]
    fn normalized_sum_bounds() {
        let single = |v: f64| Kernel::new(1, 1, vec![v]).unwrap();
        assert!(single(NORMALIZED_SUM_MIN).is_normalized());
        assert!(single(NORMALIZED_SUM_MAX).is_normalized());
        assert!(!single(0.989).is_normalized());
        assert!(!single(1.01).is_normalized());
        // Spread over several cells, the same sums land on the same side.
        assert!(Kernel::from_rows(&[[0.25, 0.5, 0.25]]).unwrap().is_normalized());
        assert!(!Kernel::from_rows(&[[0.5, 0.25, 0.239]]).unwrap().is_normalized());
    }

    #[test]
    fn normalize_is_idempotent() {
        let k = Kernel::from_rows(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 7.0]]).unwrap();
        let once = k.normalize();
        let twice = once.normalize();
        for (a, b) in once.values().iter().zip(twice.values()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn normalize_zero_sum_is_identity() {
        let k = sobel_x();
        assert_eq!(k.normalize(), k);
        assert!(!k.is_normalized());
    }

    #[test]
    fn gaussian_is_normalized_and_symmetric() {
        let g = Kernel::gaussian(2, 1.0).unwrap();
        assert!(g.is_normalized());
        assert_close(g.get(0, 0), g.get(4, 4));
        assert_close(g.get(0, 2), g.get(2, 0));
        assert!(g.get(2, 2) > g.get(1, 2));
        assert!(Kernel::gaussian(1, 0.0).is_err());
    }

    // --- separability ---

    #[test]
    fn box_and_sobel_are_separable() {
        assert!(Kernel::box_filter(2).unwrap().is_separable());
        assert!(sobel_x().is_separable());
        assert!(Kernel::gaussian(3, 1.5).unwrap().is_separable());
    }

    #[test]
    fn laplacian_is_not_separable() {
        let lap = Kernel::from_rows(&[[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]]).unwrap();
        assert_eq!(lap.rank(), 2);
        assert!(!lap.is_separable());
        assert_eq!(lap.decompose(), Err(ImagingError::NotSeparable));
    }

    #[test]
    fn zero_kernel_has_rank_zero() {
        let k = Kernel::new(3, 3, vec![0.0; 9]).unwrap();
        assert_eq!(k.rank(), 0);
        assert!(!k.is_separable());
    }

    #[test]
    fn decompose_reconstructs_kernel() {
        for k in [
            sobel_x(),
            Kernel::box_filter(1).unwrap(),
            Kernel::gaussian(2, 0.8).unwrap(),
            Kernel::outer(&[1.0, -2.0, 5.0, 0.5, 1.0], &[3.0, 1.0, 2.0]).unwrap(),
        ] {
            let sep = k.decompose().unwrap();
            assert_eq!(sep.horizontal.len(), k.width());
            assert_eq!(sep.vertical.len(), k.height());
            let rebuilt = sep.to_kernel().unwrap();
            for (a, b) in rebuilt.values().iter().zip(k.values()) {
                assert_close(*a, *b);
            }
            assert_close(sep.sum(), k.sum());
        }
    }

    #[test]
    fn decompose_sign_makes_dominant_vertical_positive() {
        let k = Kernel::outer(&[1.0, 1.0, 1.0], &[-1.0, -2.0, -1.0]).unwrap();
        let sep = k.decompose().unwrap();
        assert!(sep.vertical[1] > 0.0);
        assert!(sep.horizontal.iter().all(|&h| h < 0.0));
    }

    #[test]
    fn separable_kernel_validates_lengths() {
        assert!(SeparableKernel::new(vec![1.0, 2.0], vec![1.0]).is_err());
        assert!(SeparableKernel::new(vec![1.0, 2.0, 1.0], vec![]).is_err());
        let s = SeparableKernel::new(vec![1.0, 2.0, 1.0], vec![1.0]).unwrap();
        assert_close(s.sum(), 4.0);
    }

    // --- structuring elements ---

    #[test]
    fn structuring_element_rejects_non_binary() {
        assert!(matches!(
            StructuringElement::from_rows(&[[0u8, 2, 0], [1, 1, 1], [0, 1, 0]]),
            Err(ImagingError::InvalidKernel(_))
        ));
        assert!(StructuringElement::from_rows(&[[1u8, 1]]).is_err());
    }

    #[test]
    fn oversized_radius_is_rejected() {
        for radius in [usize::MAX, usize::MAX / 2, 1 << (usize::BITS / 2)] {
            assert!(matches!(
                Kernel::box_filter(radius),
                Err(ImagingError::InvalidKernel(_))
            ));
            assert!(StructuringElement::square(radius).is_err());
            assert!(StructuringElement::cross(radius).is_err());
            assert!(Kernel::gaussian(radius, 1.0).is_err());
        }
        assert_eq!(Kernel::box_filter(0).unwrap().values(), &[1.0]);
    }

    #[test]
    fn cross_offsets() {
        let mut offsets = StructuringElement::cross(1).unwrap().offsets();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn rectangular_element_offsets_are_centered() {
        let e = StructuringElement::from_rows(&[[1u8, 0, 0, 0, 1]]).unwrap();
        assert_eq!(e.offsets(), vec![(0, -2), (0, 2)]);
        assert_eq!(StructuringElement::square(2).unwrap().offsets().len(), 25);
    }

    // --- serde ---

    #[test]
    fn kernel_serde_round_trip_as_rows() {
        let k = sobel_x();
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "[[1.0,0.0,-1.0],[2.0,0.0,-2.0],[1.0,0.0,-1.0]]");
        let back: Kernel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, k);
    }

    #[test]
    fn kernel_deserialize_validates() {
        assert!(serde_json::from_str::<Kernel>("[[1.0,2.0]]").is_err());
    }

    #[test]
    fn structuring_element_serde_round_trip() {
        let e = StructuringElement::cross(1).unwrap();
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "[[0,1,0],[1,1,1],[0,1,0]]");
        let back: StructuringElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
