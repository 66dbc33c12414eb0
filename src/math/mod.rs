//! Numeric building blocks for color transforms
//!
//! This module provides:
//! - 3x3 matrix operations (RGB↔XYZ, chromatic adaptation)
//! - Interpolation (1D curves, 3D and N-D lookup tables)
//! - Chromatic adaptation transforms
//! - Gamma / transfer function evaluation

pub mod adaptation;
pub mod gamma;
pub mod interpolation;
pub mod matrix;

pub use adaptation::{adaptation_matrix, CatSpec};
pub use gamma::{ParametricCurve, ParametricCurveType, Transfer};
pub use interpolation::{lerp, lut1d_interp, nlinear_clut, tetrahedral_clut, trilinear_clut};
pub use matrix::Matrix3x3;
