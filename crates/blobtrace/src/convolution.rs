//! Border-aware 2D and separable convolution.
//!
//! Every output sample is the weighted sum of the kernel-shaped
//! neighborhood around it, divided by a divisor and clamped to
//! `0..=255`. The divisor is the configured one, or the kernel's weight
//! sum when none is given; a zero sum means no division.
//!
//! Taps that fall outside the raster follow the [`BorderMode`]: they are
//! skipped ([`BorderMode::Zero`]) or read the center pixel's own value
//! ([`BorderMode::Replicate`]).
//!
//! Both operators snapshot the raster before writing, so a pass only ever
//! reads pre-operation values. RGB rasters are convolved channel by
//! channel with the same kernel.

use serde::{Deserialize, Serialize};

use crate::kernel::{Kernel, SeparableKernel};
use crate::types::{ImagingError, Raster, RasterFilter};

/// What an out-of-bounds kernel tap reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderMode {
    /// The tap contributes nothing (zero padding).
    #[default]
    Zero,
    /// The tap reads the value of the pixel being computed.
    Replicate,
}

/// Options shared by [`Convolution`] and [`SeparableConvolution`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConvolutionConfig {
    /// Out-of-bounds tap policy.
    pub border: BorderMode,

    /// Explicit divisor. `None` divides by the kernel's weight sum (or
    /// not at all when that sum is zero).
    pub divisor: Option<f64>,
}

impl ConvolutionConfig {
    /// Default border policy.
    pub const DEFAULT_BORDER: BorderMode = BorderMode::Zero;

    /// Divisor actually applied for a kernel summing to `kernel_sum`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidConfig`] if the explicit divisor is
    /// zero or not finite.
    pub fn resolve_divisor(&self, kernel_sum: f64) -> Result<f64, ImagingError> {
        match self.divisor {
            Some(d) if d == 0.0 || !d.is_finite() => Err(ImagingError::InvalidConfig(format!(
                "convolution divisor must be finite and non-zero, got {d}"
            ))),
            Some(d) => Ok(d),
            None if kernel_sum == 0.0 => Ok(1.0),
            None => Ok(kernel_sum),
        }
    }
}

/// Convolution with a full 2D kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Convolution {
    kernel: Kernel,
    config: ConvolutionConfig,
}

impl Convolution {
    /// Convolve with `kernel` using the default configuration.
    #[must_use]
    pub fn new(kernel: Kernel) -> Self {
        Self::with_config(kernel, ConvolutionConfig::default())
    }

    /// Convolve with `kernel` using `config`.
    #[must_use]
    pub const fn with_config(kernel: Kernel, config: ConvolutionConfig) -> Self {
        Self { kernel, config }
    }

    /// Use the given border policy.
    #[must_use]
    pub fn border(mut self, border: BorderMode) -> Self {
        self.config.border = border;
        self
    }

    /// Divide by `divisor` instead of the kernel sum.
    #[must_use]
    pub fn divisor(mut self, divisor: f64) -> Self {
        self.config.divisor = Some(divisor);
        self
    }

    /// The kernel being applied.
    #[must_use]
    pub const fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ConvolutionConfig {
        &self.config
    }
}

impl RasterFilter for Convolution {
    fn apply_in_place(&self, raster: &mut Raster) -> Result<(), ImagingError> {
        let divisor = self.config.resolve_divisor(self.kernel.sum())?;
        let layout = Layout::of(raster);
        let src = raster.as_raw().to_vec();
        let dst = raster.as_raw_mut();

        let (kw, kh) = (self.kernel.width(), self.kernel.height());
        let (rx, ry) = (self.kernel.radius_x(), self.kernel.radius_y());
        let replicate = self.config.border == BorderMode::Replicate;

        for row in 0..layout.height {
            for col in 0..layout.width {
                for c in 0..layout.channels {
                    let center = f64::from(src[layout.at(row, col, c)]);
                    let mut acc = 0.0;
                    for kr in 0..kh {
                        let sr = (row + kr).checked_sub(ry).filter(|&r| r < layout.height);
                        for kc in 0..kw {
                            let w = self.kernel.get(kr, kc);
                            let sc = (col + kc).checked_sub(rx).filter(|&x| x < layout.width);
                            match (sr, sc) {
                                (Some(sr), Some(sc)) => {
                                    acc += w * f64::from(src[layout.at(sr, sc, c)]);
                                }
                                _ if replicate => acc += w * center,
                                _ => {}
                            }
                        }
                    }
                    dst[layout.at(row, col, c)] = to_sample(acc / divisor);
                }
            }
        }
        Ok(())
    }
}

/// Convolution with a rank-1 kernel, applied as a horizontal then a
/// vertical pass.
///
/// The horizontal pass writes unscaled sums to a full-size scratch
/// buffer; the vertical pass reads it and divides once by the combined
/// divisor (product of the two weight sums unless configured).
#[derive(Debug, Clone, PartialEq)]
pub struct SeparableConvolution {
    kernel: SeparableKernel,
    config: ConvolutionConfig,
}

impl SeparableConvolution {
    /// Convolve with the pair of 1D kernels using the default
    /// configuration.
    #[must_use]
    pub fn new(kernel: SeparableKernel) -> Self {
        Self::with_config(kernel, ConvolutionConfig::default())
    }

    /// Convolve with the pair of 1D kernels using `config`.
    #[must_use]
    pub const fn with_config(kernel: SeparableKernel, config: ConvolutionConfig) -> Self {
        Self { kernel, config }
    }

    /// Build from a 2D kernel, factoring it when its rank is 1.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::NotSeparable`] if `kernel` has rank other
    /// than 1.
    pub fn from_kernel(kernel: &Kernel, config: ConvolutionConfig) -> Result<Self, ImagingError> {
        Ok(Self::with_config(kernel.decompose()?, config))
    }

    /// Use the given border policy.
    #[must_use]
    pub fn border(mut self, border: BorderMode) -> Self {
        self.config.border = border;
        self
    }

    /// Divide by `divisor` instead of the combined kernel sum.
    #[must_use]
    pub fn divisor(mut self, divisor: f64) -> Self {
        self.config.divisor = Some(divisor);
        self
    }

    /// The kernel pair being applied.
    #[must_use]
    pub const fn kernel(&self) -> &SeparableKernel {
        &self.kernel
    }
}

impl RasterFilter for SeparableConvolution {
    fn apply_in_place(&self, raster: &mut Raster) -> Result<(), ImagingError> {
        let SeparableKernel {
            horizontal,
            vertical,
        } = &self.kernel;
        if horizontal.len() % 2 == 0 || vertical.len() % 2 == 0 {
            return Err(ImagingError::InvalidKernel(format!(
                "separable kernel lengths must be odd, got {} and {}",
                horizontal.len(),
                vertical.len()
            )));
        }
        let divisor = self.config.resolve_divisor(self.kernel.sum())?;
        let layout = Layout::of(raster);
        let replicate = self.config.border == BorderMode::Replicate;
        let (rx, ry) = ((horizontal.len() - 1) / 2, (vertical.len() - 1) / 2);

        let src: Vec<f64> = raster.as_raw().iter().map(|&v| f64::from(v)).collect();
        let mut scratch = vec![0.0; src.len()];

        for row in 0..layout.height {
            for col in 0..layout.width {
                for c in 0..layout.channels {
                    let center = src[layout.at(row, col, c)];
                    scratch[layout.at(row, col, c)] = horizontal
                        .iter()
                        .enumerate()
                        .map(|(k, w)| {
                            match (col + k).checked_sub(rx).filter(|&x| x < layout.width) {
                                Some(x) => w * src[layout.at(row, x, c)],
                                None if replicate => w * center,
                                None => 0.0,
                            }
                        })
                        .sum();
                }
            }
        }

        let dst = raster.as_raw_mut();
        for row in 0..layout.height {
            for col in 0..layout.width {
                for c in 0..layout.channels {
                    let center = scratch[layout.at(row, col, c)];
                    let acc: f64 = vertical
                        .iter()
                        .enumerate()
                        .map(|(k, w)| {
                            match (row + k).checked_sub(ry).filter(|&y| y < layout.height) {
                                Some(y) => w * scratch[layout.at(y, col, c)],
                                None if replicate => w * center,
                                None => 0.0,
                            }
                        })
                        .sum();
                    dst[layout.at(row, col, c)] = to_sample(acc / divisor);
                }
            }
        }
        Ok(())
    }
}

/// Interleaved sample layout of a raster buffer.
#[derive(Debug, Clone, Copy)]
struct Layout {
    width: usize,
    height: usize,
    channels: usize,
}

impl Layout {
    fn of(raster: &Raster) -> Self {
        Self {
            width: raster.width() as usize,
            height: raster.height() as usize,
            channels: raster.channels(),
        }
    }

    const fn at(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.width + col) * self.channels + channel
    }
}

/// Round to the nearest integer and clamp into `0..=255`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_sample(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
