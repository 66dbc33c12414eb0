//! Color values and the colorspaces they are bound to
//!
//! A [`Color`] is a fixed-arity vector of `f64` channel values plus a
//! reference to the [`Colorspace`] those values are relative to. The
//! channel count is determined by the color's [`ColorKind`]; the buffer is
//! heap-allocated and its address is stable for as long as a converter
//! borrows the color.

pub mod space;
pub mod white_point;
pub mod xyz;

pub use space::{Chromaticity, Colorspace, RgbColorspace};
pub use white_point::WhitePoint;
pub use xyz::Xyz;

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::icc::IccProfile;

/// The tagged kind of a color, fixing its channel count and semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorKind {
    /// CIE XYZ tristimulus
    Xyz,
    /// CIE L*a*b*
    Lab,
    /// Polar form of Lab (lightness, chroma, hue in degrees)
    LchAb,
    /// Polar form of Luv
    LchUv,
    /// CIE L*u*v*
    Luv,
    /// Chromaticity + luminance
    XyY,
    /// Companded RGB in a working space
    Rgb,
    /// Hue/saturation/value over an RGB space
    Hsv,
    /// Hue/saturation/lightness over an RGB space
    Hsl,
    /// Luma + chroma difference over an RGB space
    YCbCr,
    /// Cyan/magenta/yellow (naive complement of RGB)
    Cmy,
    /// Cyan/magenta/yellow/key
    Cmyk,
    /// Single achromatic channel
    Gray,
}

impl ColorKind {
    /// Fixed channel count for this kind
    pub const fn channels(&self) -> usize {
        match self {
            ColorKind::Gray => 1,
            ColorKind::Cmyk => 4,
            _ => 3,
        }
    }

    /// Whether this kind is parameterized by an RGB working space
    pub const fn is_rgb_family(&self) -> bool {
        matches!(
            self,
            ColorKind::Rgb | ColorKind::Hsv | ColorKind::Hsl | ColorKind::YCbCr
        )
    }
}

impl fmt::Display for ColorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorKind::Xyz => "XYZ",
            ColorKind::Lab => "Lab",
            ColorKind::LchAb => "LCHab",
            ColorKind::LchUv => "LCHuv",
            ColorKind::Luv => "Luv",
            ColorKind::XyY => "xyY",
            ColorKind::Rgb => "RGB",
            ColorKind::Hsv => "HSV",
            ColorKind::Hsl => "HSL",
            ColorKind::YCbCr => "YCbCr",
            ColorKind::Cmy => "CMY",
            ColorKind::Cmyk => "CMYK",
            ColorKind::Gray => "Gray",
        };
        f.write_str(name)
    }
}

/// A color: channel values bound to a colorspace
#[derive(Debug, Clone)]
pub struct Color {
    kind: ColorKind,
    values: Box<[f64]>,
    space: Colorspace,
}

impl Color {
    /// Create a color, validating channel count and space compatibility
    pub fn new(kind: ColorKind, values: &[f64], space: Colorspace) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::MissingArgument("values"));
        }
        if values.len() != kind.channels() {
            return Err(Error::setup(format!(
                "{kind} takes {} channels, got {}",
                kind.channels(),
                values.len()
            )));
        }

        match &space {
            Colorspace::Rgb(_) => {
                if !kind.is_rgb_family() {
                    return Err(Error::setup(format!(
                        "{kind} cannot be bound to an RGB working space"
                    )));
                }
            }
            Colorspace::Standard(white) => {
                if kind.is_rgb_family() {
                    return Err(Error::setup(format!(
                        "{kind} requires an RGB working space"
                    )));
                }
                if !white.xyz.is_positive_finite() {
                    return Err(Error::setup("white point must be finite and positive"));
                }
            }
            Colorspace::Icc(profile) => {
                if kind != profile.data_kind() && kind != profile.pcs_kind() {
                    return Err(Error::setup(format!(
                        "{kind} matches neither side of profile (device {}, PCS {})",
                        profile.data_kind(),
                        profile.pcs_kind()
                    )));
                }
            }
        }

        Ok(Self {
            kind,
            values: values.into(),
            space,
        })
    }

    fn from_parts(kind: ColorKind, values: &[f64], space: Colorspace) -> Self {
        Self {
            kind,
            values: values.into(),
            space,
        }
    }

    /// CIE XYZ under the given white point
    pub fn xyz(x: f64, y: f64, z: f64, white: WhitePoint) -> Self {
        Self::from_parts(ColorKind::Xyz, &[x, y, z], Colorspace::Standard(white))
    }

    /// CIE Lab under the given white point
    pub fn lab(l: f64, a: f64, b: f64, white: WhitePoint) -> Self {
        Self::from_parts(ColorKind::Lab, &[l, a, b], Colorspace::Standard(white))
    }

    /// LCHab (polar Lab) under the given white point
    pub fn lch_ab(l: f64, c: f64, h: f64, white: WhitePoint) -> Self {
        Self::from_parts(ColorKind::LchAb, &[l, c, h], Colorspace::Standard(white))
    }

    /// LCHuv (polar Luv) under the given white point
    pub fn lch_uv(l: f64, c: f64, h: f64, white: WhitePoint) -> Self {
        Self::from_parts(ColorKind::LchUv, &[l, c, h], Colorspace::Standard(white))
    }

    /// CIE Luv under the given white point
    pub fn luv(l: f64, u: f64, v: f64, white: WhitePoint) -> Self {
        Self::from_parts(ColorKind::Luv, &[l, u, v], Colorspace::Standard(white))
    }

    /// xyY chromaticity + luminance under the given white point
    pub fn xyy(x: f64, y: f64, big_y: f64, white: WhitePoint) -> Self {
        Self::from_parts(ColorKind::XyY, &[x, y, big_y], Colorspace::Standard(white))
    }

    /// Achromatic gray under the given white point
    pub fn gray(value: f64, white: WhitePoint) -> Self {
        Self::from_parts(ColorKind::Gray, &[value], Colorspace::Standard(white))
    }

    /// Companded RGB in a working space
    pub fn rgb(r: f64, g: f64, b: f64, space: RgbColorspace) -> Self {
        Self::from_parts(ColorKind::Rgb, &[r, g, b], Colorspace::Rgb(space))
    }

    /// HSV over an RGB working space (hue in degrees)
    pub fn hsv(h: f64, s: f64, v: f64, space: RgbColorspace) -> Self {
        Self::from_parts(ColorKind::Hsv, &[h, s, v], Colorspace::Rgb(space))
    }

    /// HSL over an RGB working space (hue in degrees)
    pub fn hsl(h: f64, s: f64, l: f64, space: RgbColorspace) -> Self {
        Self::from_parts(ColorKind::Hsl, &[h, s, l], Colorspace::Rgb(space))
    }

    /// YCbCr over an RGB working space (Cb, Cr centered on 0.5)
    pub fn ycbcr(y: f64, cb: f64, cr: f64, space: RgbColorspace) -> Self {
        Self::from_parts(ColorKind::YCbCr, &[y, cb, cr], Colorspace::Rgb(space))
    }

    /// Naive CMY (complement of sRGB by convention)
    pub fn cmy(c: f64, m: f64, y: f64) -> Self {
        Self::from_parts(
            ColorKind::Cmy,
            &[c, m, y],
            Colorspace::Standard(white_point::D65),
        )
    }

    /// Naive CMYK (complement of sRGB by convention)
    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self::from_parts(
            ColorKind::Cmyk,
            &[c, m, y, k],
            Colorspace::Standard(white_point::D65),
        )
    }

    /// A device-side color bound to an ICC profile
    pub fn device(values: &[f64], profile: Arc<IccProfile>) -> Result<Self> {
        let kind = profile.data_kind();
        Self::new(kind, values, Colorspace::Icc(profile))
    }

    /// The color's kind
    pub fn kind(&self) -> ColorKind {
        self.kind
    }

    /// The colorspace the values are bound to
    pub fn space(&self) -> &Colorspace {
        &self.space
    }

    /// The channel values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable access to the channel values
    ///
    /// This is the intended way to feed new inputs to a converter between
    /// `convert()` calls.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::white_point::{D50, D65};

    #[test]
    fn test_channel_counts() {
        assert_eq!(ColorKind::Gray.channels(), 1);
        assert_eq!(ColorKind::Xyz.channels(), 3);
        assert_eq!(ColorKind::Cmyk.channels(), 4);
    }

    #[test]
    fn test_constructors() {
        let c = Color::lab(50.0, 20.0, -30.0, D50);
        assert_eq!(c.kind(), ColorKind::Lab);
        assert_eq!(c.values(), &[50.0, 20.0, -30.0]);
        assert_eq!(c.space().white_point().name, "D50");

        let c = Color::rgb(0.1, 0.2, 0.3, RgbColorspace::SRGB);
        assert_eq!(c.kind(), ColorKind::Rgb);
        assert!(c.space().rgb().is_some());
    }

    #[test]
    fn test_new_rejects_empty_values() {
        let err = Color::new(ColorKind::Xyz, &[], Colorspace::Standard(D65)).unwrap_err();
        assert!(matches!(err, Error::MissingArgument(_)));
    }

    #[test]
    fn test_new_rejects_channel_mismatch() {
        let err = Color::new(ColorKind::Xyz, &[1.0, 2.0], Colorspace::Standard(D65)).unwrap_err();
        assert!(matches!(err, Error::ConversionSetup(_)));
    }

    #[test]
    fn test_new_rejects_space_kind_mismatch() {
        // Lab cannot live in an RGB working space
        let err = Color::new(
            ColorKind::Lab,
            &[50.0, 0.0, 0.0],
            Colorspace::Rgb(RgbColorspace::SRGB),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConversionSetup(_)));

        // HSV requires an RGB working space
        let err = Color::new(
            ColorKind::Hsv,
            &[0.0, 0.0, 0.0],
            Colorspace::Standard(D65),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConversionSetup(_)));
    }

    #[test]
    fn test_values_mut() {
        let mut c = Color::xyz(0.0, 0.0, 0.0, D65);
        c.values_mut().copy_from_slice(&[0.1, 0.2, 0.3]);
        assert_eq!(c.values(), &[0.1, 0.2, 0.3]);
    }
}
