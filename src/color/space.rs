//! Colorspace descriptions
//!
//! A colorspace carries the parameterization a color's values are relative
//! to: a white point for the device-independent kinds, primaries + white +
//! transfer function for the RGB family, or an ICC profile for
//! profile-bound colors.

use std::sync::Arc;

use crate::color::{white_point, WhitePoint};
use crate::error::{Error, Result};
use crate::icc::IccProfile;
use crate::math::{Matrix3x3, Transfer};

/// CIE xy chromaticity coordinates of a primary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chromaticity {
    pub x: f64,
    pub y: f64,
}

impl Chromaticity {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An RGB working space: primaries, white point, and transfer function
///
/// Presets are frozen records; the RGB↔XYZ matrices are derived from the
/// primaries and white point at plan time.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbColorspace {
    /// Preset name ("sRGB", "Adobe RGB (1998)", …)
    pub name: &'static str,
    /// Reference white
    pub white: WhitePoint,
    /// xy chromaticities of the R, G, B primaries
    pub primaries: [Chromaticity; 3],
    /// Companding function pair
    pub transfer: Transfer,
}

impl RgbColorspace {
    /// IEC 61966-2-1 sRGB
    pub const SRGB: Self = Self {
        name: "sRGB",
        white: white_point::D65,
        primaries: [
            Chromaticity::new(0.64, 0.33),
            Chromaticity::new(0.30, 0.60),
            Chromaticity::new(0.15, 0.06),
        ],
        transfer: Transfer::Srgb,
    };

    /// Adobe RGB (1998), gamma 563/256
    pub const ADOBE_RGB: Self = Self {
        name: "Adobe RGB (1998)",
        white: white_point::D65,
        primaries: [
            Chromaticity::new(0.64, 0.33),
            Chromaticity::new(0.21, 0.71),
            Chromaticity::new(0.15, 0.06),
        ],
        transfer: Transfer::Gamma(563.0 / 256.0),
    };

    /// Apple RGB, gamma 1.8
    pub const APPLE_RGB: Self = Self {
        name: "Apple RGB",
        white: white_point::D65,
        primaries: [
            Chromaticity::new(0.625, 0.34),
            Chromaticity::new(0.28, 0.595),
            Chromaticity::new(0.155, 0.07),
        ],
        transfer: Transfer::Gamma(1.8),
    };

    /// ProPhoto RGB (ROMM), D50 native
    pub const PRO_PHOTO: Self = Self {
        name: "ProPhoto RGB",
        white: white_point::D50,
        primaries: [
            Chromaticity::new(0.7347, 0.2653),
            Chromaticity::new(0.1596, 0.8404),
            Chromaticity::new(0.0366, 0.0001),
        ],
        transfer: Transfer::Gamma(1.8),
    };

    /// Display P3 (P3 primaries with sRGB transfer and D65 white)
    pub const DISPLAY_P3: Self = Self {
        name: "Display P3",
        white: white_point::D65,
        primaries: [
            Chromaticity::new(0.68, 0.32),
            Chromaticity::new(0.265, 0.69),
            Chromaticity::new(0.15, 0.06),
        ],
        transfer: Transfer::Srgb,
    };

    /// ITU-R BT.709
    pub const REC709: Self = Self {
        name: "Rec. 709",
        white: white_point::D65,
        primaries: [
            Chromaticity::new(0.64, 0.33),
            Chromaticity::new(0.30, 0.60),
            Chromaticity::new(0.15, 0.06),
        ],
        transfer: Transfer::Rec709,
    };

    /// ITU-R BT.2020
    pub const REC2020: Self = Self {
        name: "Rec. 2020",
        white: white_point::D65,
        primaries: [
            Chromaticity::new(0.708, 0.292),
            Chromaticity::new(0.17, 0.797),
            Chromaticity::new(0.131, 0.046),
        ],
        transfer: Transfer::Rec2020,
    };

    /// Derive the linear-RGB → XYZ matrix from primaries and white point
    ///
    /// Columns are the primaries' tristimuli scaled so that (1,1,1) maps
    /// exactly to the white point (Lindbloom's construction).
    pub fn to_xyz_matrix(&self) -> Result<Matrix3x3> {
        let mut p = Matrix3x3::zero();
        for (col, prim) in self.primaries.iter().enumerate() {
            if prim.y.abs() < 1e-12 {
                return Err(Error::setup(format!(
                    "RGB space '{}' has a primary with zero y chromaticity",
                    self.name
                )));
            }
            p.m[0][col] = prim.x / prim.y;
            p.m[1][col] = 1.0;
            p.m[2][col] = (1.0 - prim.x - prim.y) / prim.y;
        }

        let p_inv = p.inverse().ok_or_else(|| {
            Error::setup(format!("RGB space '{}' has degenerate primaries", self.name))
        })?;
        let s = p_inv.multiply_vec(self.white.xyz.to_array());

        let mut m = p;
        for row in 0..3 {
            for col in 0..3 {
                m.m[row][col] *= s[col];
            }
        }
        Ok(m)
    }

    /// Derive the XYZ → linear-RGB matrix
    pub fn from_xyz_matrix(&self) -> Result<Matrix3x3> {
        self.to_xyz_matrix()?.inverse().ok_or_else(|| {
            Error::setup(format!("RGB space '{}' has degenerate primaries", self.name))
        })
    }

    /// Luma coefficients (Kr, Kb) used by the YCbCr conversion
    ///
    /// Rec.709 and Rec.2020 use their own constants; everything else uses
    /// the BT.601 values, matching the JPEG/JFIF convention for sRGB.
    pub fn luma_coefficients(&self) -> (f64, f64) {
        match self.name {
            "Rec. 709" => (0.2126, 0.0722),
            "Rec. 2020" => (0.2627, 0.0593),
            _ => (0.299, 0.114),
        }
    }
}

/// A colorspace a color's values are bound to
#[derive(Debug, Clone)]
pub enum Colorspace {
    /// Device-independent kinds parameterized by a white point
    Standard(WhitePoint),
    /// RGB-family working space (also parameterizes HSV, HSL, YCbCr)
    Rgb(RgbColorspace),
    /// ICC profile-bound space
    Icc(Arc<IccProfile>),
}

impl Colorspace {
    /// The reference white of this space
    pub fn white_point(&self) -> WhitePoint {
        match self {
            Colorspace::Standard(white) => *white,
            Colorspace::Rgb(space) => space.white,
            Colorspace::Icc(profile) => profile.white_point(),
        }
    }

    /// The RGB working space, if this is an RGB-family space
    pub fn rgb(&self) -> Option<&RgbColorspace> {
        match self {
            Colorspace::Rgb(space) => Some(space),
            _ => None,
        }
    }

    /// The ICC profile, if this is a profile-bound space
    pub fn icc_profile(&self) -> Option<&Arc<IccProfile>> {
        match self {
            Colorspace::Icc(profile) => Some(profile),
            _ => None,
        }
    }

    /// Whether two spaces carry identical parameters
    ///
    /// Used by the planner to decide between a plain assignment and a
    /// re-parameterization chain. ICC spaces compare by profile identity.
    pub fn same_parameters(&self, other: &Colorspace) -> bool {
        match (self, other) {
            (Colorspace::Standard(a), Colorspace::Standard(b)) => a.approx_eq(b, 1e-6),
            (Colorspace::Rgb(a), Colorspace::Rgb(b)) => a == b,
            (Colorspace::Icc(a), Colorspace::Icc(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
