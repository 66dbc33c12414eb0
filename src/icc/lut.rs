//! LUT building blocks: shaper curves and multi-dimensional CLUTs
//!
//! A LUT chain evaluates: input curves → (3x3 matrix) → CLUT → output
//! curves, all over the encoded [0, 1] domain. PCS encoding and decoding
//! around the chain is the transform engine's job.

use crate::error::{Error, Result};
use crate::math::interpolation::{
    lut1d_interp, nlinear_clut, tetrahedral_clut, trilinear_clut, MAX_CHANNELS,
};
use crate::math::{Matrix3x3, ParametricCurve};

/// CLUT interpolation method for 3-dimensional inputs
///
/// Non-3D CLUTs always use N-linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClutInterpolation {
    /// Tetrahedral (6 tetrahedra per cell, CMM standard)
    #[default]
    Tetrahedral,
    /// Trilinear (8-corner blend)
    Trilinear,
    /// Generic 2^N-corner blend
    NLinear,
}

/// A single shaper curve over the [0, 1] domain
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Identity (linear)
    Identity,
    /// Simple power curve
    Gamma(f64),
    /// ICC parametric curve (types 0-4)
    Parametric(ParametricCurve),
    /// Sampled table, values normalized to [0, 1]
    Table(Vec<f64>),
}

impl Default for Curve {
    fn default() -> Self {
        Curve::Identity
    }
}

impl Curve {
    /// Create from an 8-bit sample table
    pub fn from_u8_table(table: &[u8]) -> Self {
        if table.is_empty() {
            return Curve::Identity;
        }
        Curve::Table(table.iter().map(|&v| v as f64 / 255.0).collect())
    }

    /// Create from a 16-bit sample table
    pub fn from_u16_table(table: &[u16]) -> Self {
        if table.is_empty() {
            return Curve::Identity;
        }
        Curve::Table(table.iter().map(|&v| v as f64 / 65535.0).collect())
    }

    /// Evaluate the curve at x (clamped to [0, 1])
    pub fn eval(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Curve::Identity => x,
            Curve::Gamma(g) => x.powf(*g),
            Curve::Parametric(p) => p.eval(x),
            Curve::Table(table) => lut1d_interp(table, x),
        }
    }

    /// Evaluate the inverse curve at y (clamped to [0, 1])
    ///
    /// Tables are inverted by binary search and assumed non-decreasing.
    pub fn eval_inverse(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, 1.0);
        match self {
            Curve::Identity => y,
            Curve::Gamma(g) => {
                if g.abs() > 1e-10 {
                    y.powf(1.0 / *g)
                } else {
                    y
                }
            }
            Curve::Parametric(p) => p.eval_inverse(y),
            Curve::Table(table) => invert_table(table, y),
        }
    }
}

/// Invert a non-decreasing table by binary search + local interpolation
fn invert_table(table: &[f64], y: f64) -> f64 {
    if table.len() < 2 {
        return y;
    }

    let mut lo = 0usize;
    let mut hi = table.len() - 1;
    while lo < hi {
        let mid = (lo + hi) / 2;
        if table[mid] < y {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    if lo == 0 {
        return 0.0;
    }

    let v0 = table[lo - 1];
    let v1 = table[lo];
    let t = if (v1 - v0).abs() > 1e-10 {
        (y - v0) / (v1 - v0)
    } else {
        0.0
    };

    ((lo - 1) as f64 + t) / (table.len() - 1) as f64
}

/// Sample storage for a CLUT grid
///
/// Samples may be kept as 16-bit unorm exactly as a profile stores them;
/// they are promoted to f64 at lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ClutSamples {
    F64(Vec<f64>),
    U16(Vec<u16>),
}

impl ClutSamples {
    fn len(&self) -> usize {
        match self {
            ClutSamples::F64(v) => v.len(),
            ClutSamples::U16(v) => v.len(),
        }
    }

    #[inline]
    fn get(&self, i: usize) -> f64 {
        match self {
            ClutSamples::F64(v) => v.get(i).copied().unwrap_or(0.0),
            ClutSamples::U16(v) => v.get(i).map(|&s| s as f64 / 65535.0).unwrap_or(0.0),
        }
    }
}

/// A multi-dimensional lookup table on a regular grid
///
/// Flat sample layout is row-major with the first input channel varying
/// slowest and the output channel fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Clut {
    /// Grid points per input dimension
    pub grid_points: Vec<usize>,
    /// Number of output channels
    pub output_channels: usize,
    samples: ClutSamples,
}

impl Clut {
    /// Create a CLUT from f64 samples, validating the grid geometry
    pub fn new(grid_points: Vec<usize>, output_channels: usize, samples: Vec<f64>) -> Result<Self> {
        Self::from_samples(grid_points, output_channels, ClutSamples::F64(samples))
    }

    /// Create a CLUT from 16-bit unorm samples
    pub fn new_u16(
        grid_points: Vec<usize>,
        output_channels: usize,
        samples: Vec<u16>,
    ) -> Result<Self> {
        Self::from_samples(grid_points, output_channels, ClutSamples::U16(samples))
    }

    fn from_samples(
        grid_points: Vec<usize>,
        output_channels: usize,
        samples: ClutSamples,
    ) -> Result<Self> {
        if grid_points.is_empty() || grid_points.len() > MAX_CHANNELS {
            return Err(Error::profile(format!(
                "CLUT has {} input dimensions, supported range is 1..={}",
                grid_points.len(),
                MAX_CHANNELS
            )));
        }
        if grid_points.iter().any(|&g| g < 2) {
            return Err(Error::profile("CLUT grid needs at least 2 points per axis"));
        }
        if output_channels == 0 || output_channels > MAX_CHANNELS {
            return Err(Error::profile(format!(
                "CLUT has {output_channels} output channels"
            )));
        }

        let expected: usize = grid_points.iter().product::<usize>() * output_channels;
        if samples.len() != expected {
            return Err(Error::profile(format!(
                "CLUT sample count {} does not match grid ({} expected)",
                samples.len(),
                expected
            )));
        }

        Ok(Self {
            grid_points,
            output_channels,
            samples,
        })
    }

    /// Build an identity CLUT (output = input) for testing and defaults
    pub fn identity(dimensions: usize, grid: usize) -> Result<Self> {
        let total: usize = grid.pow(dimensions as u32);
        let mut samples = vec![0.0; total * dimensions];
        for flat in 0..total {
            let mut rem = flat;
            // Decode the flat index back to grid coordinates, last axis fastest
            for d in (0..dimensions).rev() {
                let coord = rem % grid;
                rem /= grid;
                samples[flat * dimensions + d] = coord as f64 / (grid - 1) as f64;
            }
        }
        Self::new(vec![grid; dimensions], dimensions, samples)
    }

    /// Number of input dimensions
    pub fn input_dimensions(&self) -> usize {
        self.grid_points.len()
    }

    /// Evaluate the CLUT at `input`, writing `output_channels` values
    ///
    /// Inputs are clamped to the grid; out-of-grid inputs evaluate to the
    /// clamped-face value.
    pub fn eval(&self, input: &[f64], out: &mut [f64], interp: ClutInterpolation) {
        let uniform_3d = self.grid_points.len() == 3
            && self.grid_points[0] == self.grid_points[1]
            && self.grid_points[1] == self.grid_points[2];

        if uniform_3d && input.len() >= 3 {
            let grid = self.grid_points[0];
            let point = [input[0], input[1], input[2]];
            match interp {
                ClutInterpolation::Tetrahedral => {
                    tetrahedral_clut(|i| self.samples.get(i), grid, self.output_channels, point, out)
                }
                ClutInterpolation::Trilinear => {
                    trilinear_clut(|i| self.samples.get(i), grid, self.output_channels, point, out)
                }
                ClutInterpolation::NLinear => nlinear_clut(
                    |i| self.samples.get(i),
                    &self.grid_points,
                    self.output_channels,
                    input,
                    out,
                ),
            }
        } else {
            nlinear_clut(
                |i| self.samples.get(i),
                &self.grid_points,
                self.output_channels,
                input,
                out,
            );
        }
    }
}

/// One LUT chain of a profile tag (A2B or B2A)
///
/// Evaluates input curves → optional 3x3 matrix → optional CLUT → output
/// curves over the encoded [0, 1] domain.
#[derive(Debug, Clone, PartialEq)]
pub struct LutData {
    /// Input channel count
    pub input_channels: usize,
    /// Output channel count
    pub output_channels: usize,
    /// One curve per input channel (empty means identity)
    pub input_curves: Vec<Curve>,
    /// Optional 3x3 matrix, valid only for 3-channel input
    pub matrix: Option<Matrix3x3>,
    /// Optional CLUT
    pub clut: Option<Clut>,
    /// One curve per output channel (empty means identity)
    pub output_curves: Vec<Curve>,
}

impl LutData {
    /// An identity chain with the given channel counts
    ///
    /// Without a CLUT, channels pass through; missing outputs read 0.
    pub fn identity(input_channels: usize, output_channels: usize) -> Self {
        Self {
            input_channels,
            output_channels,
            input_curves: Vec::new(),
            matrix: None,
            clut: None,
            output_curves: Vec::new(),
        }
    }

    /// Validate internal consistency against declared channel counts
    pub fn validate(&self) -> Result<()> {
        if self.input_channels == 0 || self.input_channels > MAX_CHANNELS {
            return Err(Error::profile(format!(
                "LUT input channel count {} out of range",
                self.input_channels
            )));
        }
        if self.output_channels == 0 || self.output_channels > MAX_CHANNELS {
            return Err(Error::profile(format!(
                "LUT output channel count {} out of range",
                self.output_channels
            )));
        }
        if !self.input_curves.is_empty() && self.input_curves.len() != self.input_channels {
            return Err(Error::profile(format!(
                "LUT has {} input curves for {} channels",
                self.input_curves.len(),
                self.input_channels
            )));
        }
        if !self.output_curves.is_empty() && self.output_curves.len() != self.output_channels {
            return Err(Error::profile(format!(
                "LUT has {} output curves for {} channels",
                self.output_curves.len(),
                self.output_channels
            )));
        }
        if self.matrix.is_some() && self.input_channels != 3 {
            return Err(Error::profile(
                "LUT matrix element requires 3 input channels",
            ));
        }
        if let Some(clut) = &self.clut {
            if clut.input_dimensions() != self.input_channels {
                return Err(Error::profile(format!(
                    "CLUT is {}-dimensional but the LUT declares {} input channels",
                    clut.input_dimensions(),
                    self.input_channels
                )));
            }
            if clut.output_channels != self.output_channels {
                return Err(Error::profile(format!(
                    "CLUT outputs {} channels but the LUT declares {}",
                    clut.output_channels, self.output_channels
                )));
            }
        } else if self.input_channels < self.output_channels {
            // Without a CLUT the chain can only pass channels through
            return Err(Error::profile(format!(
                "LUT without CLUT cannot widen {} channels to {}",
                self.input_channels, self.output_channels
            )));
        }
        Ok(())
    }

    /// Evaluate the chain over the encoded [0, 1] domain
    pub fn eval(&self, input: &[f64], out: &mut [f64], interp: ClutInterpolation) {
        let mut stage = [0.0f64; MAX_CHANNELS];
        let n_in = self.input_channels.min(input.len());

        for c in 0..n_in {
            stage[c] = match self.input_curves.get(c) {
                Some(curve) => curve.eval(input[c]),
                None => input[c],
            };
        }

        if let Some(matrix) = &self.matrix {
            let v = matrix.multiply_vec([stage[0], stage[1], stage[2]]);
            stage[..3].copy_from_slice(&v);
        }

        let mut result = [0.0f64; MAX_CHANNELS];
        if let Some(clut) = &self.clut {
            clut.eval(&stage[..self.input_channels], &mut result, interp);
        } else {
            result[..self.input_channels].copy_from_slice(&stage[..self.input_channels]);
        }

        for c in 0..self.output_channels.min(out.len()) {
            out[c] = match self.output_curves.get(c) {
                Some(curve) => curve.eval(result[c]),
                None => result[c],
            };
        }
    }
}
