//! In-memory ICC profile model
//!
//! The conversion core consumes validated profile values; serialization
//! lives outside. [`IccProfileBuilder`] is the programmatic constructor
//! and enforces the structural invariants the transform engine relies on.

use std::fmt;
use std::sync::Arc;

use crate::color::{white_point, Color, ColorKind, Colorspace, RgbColorspace, WhitePoint, Xyz};
use crate::error::{Error, Result};
use crate::icc::lut::{Curve, LutData};
use crate::math::adaptation::{adaptation_matrix, CatSpec};
use crate::math::{Matrix3x3, ParametricCurve, Transfer};

/// ICC profile class (device class)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    /// Input device (scanner, camera)
    Input,
    /// Display device (monitor)
    Display,
    /// Output device (printer)
    Output,
    /// Device-to-device link
    DeviceLink,
    /// Color space conversion
    ColorSpace,
    /// PCS-to-PCS effect
    Abstract,
    /// Named color palette
    NamedColor,
}

/// Profile Connection Space type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcsType {
    Xyz,
    Lab,
}

impl PcsType {
    /// The color kind inhabiting this PCS
    pub fn kind(&self) -> ColorKind {
        match self {
            PcsType::Xyz => ColorKind::Xyz,
            PcsType::Lab => ColorKind::Lab,
        }
    }
}

/// Device-side color space of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataColorSpace {
    Rgb,
    Gray,
    Cmy,
    Cmyk,
    Xyz,
    Lab,
}

impl DataColorSpace {
    /// The color kind inhabiting the device side
    pub fn kind(&self) -> ColorKind {
        match self {
            DataColorSpace::Rgb => ColorKind::Rgb,
            DataColorSpace::Gray => ColorKind::Gray,
            DataColorSpace::Cmy => ColorKind::Cmy,
            DataColorSpace::Cmyk => ColorKind::Cmyk,
            DataColorSpace::Xyz => ColorKind::Xyz,
            DataColorSpace::Lab => ColorKind::Lab,
        }
    }

    /// Channel count of the device side
    pub fn channels(&self) -> usize {
        self.kind().channels()
    }
}

impl fmt::Display for DataColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// ICC rendering intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    /// Best for photos, maintains relative appearance
    Perceptual,
    /// Preserves in-gamut colors exactly (media-relative)
    #[default]
    RelativeColorimetric,
    /// Maintains saturation, for business graphics
    Saturation,
    /// Preserves absolute white point
    AbsoluteColorimetric,
}

impl RenderingIntent {
    /// Index of the A2B/B2A tag slot serving this intent
    pub(crate) fn table_slot(&self) -> usize {
        match self {
            RenderingIntent::Perceptual => 0,
            // Absolute colorimetric renders through the colorimetric tables
            RenderingIntent::RelativeColorimetric | RenderingIntent::AbsoluteColorimetric => 1,
            RenderingIntent::Saturation => 2,
        }
    }
}

/// ICC profile version (major.minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProfileVersion {
    pub const V2: Self = Self { major: 2, minor: 4 };
    pub const V4: Self = Self { major: 4, minor: 4 };

    /// Check if this is a v4 profile
    pub fn is_v4(&self) -> bool {
        self.major == 4
    }
}

/// Matrix/TRC tag set of a shaper profile
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixShaper {
    /// Colorant matrix, columns are the R, G, B tristimuli (PCS-adapted)
    pub colorants: Matrix3x3,
    /// Per-channel tone reproduction curves (decode: encoded → linear)
    pub trc: [Curve; 3],
}

/// A validated, in-memory ICC profile as consumed by the conversion core
#[derive(Debug, Clone)]
pub struct IccProfile {
    class: ProfileClass,
    version: ProfileVersion,
    pcs: PcsType,
    data_space: DataColorSpace,
    rendering_intent: RenderingIntent,
    white: Xyz,
    description: String,
    a2b: [Option<LutData>; 3],
    b2a: [Option<LutData>; 3],
    matrix_shaper: Option<MatrixShaper>,
    gray_trc: Option<Curve>,
}

impl IccProfile {
    /// Start building a profile
    pub fn builder(
        class: ProfileClass,
        data_space: DataColorSpace,
        pcs: PcsType,
    ) -> IccProfileBuilder {
        IccProfileBuilder::new(class, data_space, pcs)
    }

    /// Build a display profile from an RGB working space
    ///
    /// Produces a matrix/TRC profile with XYZ PCS: colorants are the
    /// space's primaries Bradford-adapted to D50, the TRC mirrors the
    /// space's transfer function.
    pub fn from_rgb_space(space: &RgbColorspace) -> Result<Arc<Self>> {
        let to_xyz = space.to_xyz_matrix()?;
        let adapt = adaptation_matrix(&CatSpec::bradford(), &space.white, &white_point::D50);
        let colorants = adapt.multiply(&to_xyz);

        let trc_curve = match space.transfer {
            Transfer::Linear => Curve::Identity,
            Transfer::Gamma(g) => Curve::Gamma(g),
            Transfer::Srgb => Curve::Parametric(ParametricCurve::srgb()),
            // Piecewise broadcast curves are sampled into a table
            other => {
                let table: Vec<f64> = (0..1024)
                    .map(|i| other.decode(i as f64 / 1023.0))
                    .collect();
                Curve::Table(table)
            }
        };

        IccProfile::builder(ProfileClass::Display, DataColorSpace::Rgb, PcsType::Xyz)
            .white(space.white.xyz)
            .description(space.name)
            .matrix_shaper(MatrixShaper {
                colorants,
                trc: [trc_curve.clone(), trc_curve.clone(), trc_curve],
            })
            .build()
    }

    /// Profile class
    pub fn class(&self) -> ProfileClass {
        self.class
    }

    /// Profile version
    pub fn version(&self) -> ProfileVersion {
        self.version
    }

    /// Profile Connection Space
    pub fn pcs(&self) -> PcsType {
        self.pcs
    }

    /// Device-side data color space
    pub fn data_space(&self) -> DataColorSpace {
        self.data_space
    }

    /// Color kind inhabiting the device side
    pub fn data_kind(&self) -> ColorKind {
        self.data_space.kind()
    }

    /// Color kind inhabiting the PCS side
    pub fn pcs_kind(&self) -> ColorKind {
        self.pcs.kind()
    }

    /// Header rendering intent
    pub fn rendering_intent(&self) -> RenderingIntent {
        self.rendering_intent
    }

    /// Media white point as a white point value
    pub fn white_point(&self) -> WhitePoint {
        WhitePoint {
            name: "ICC media white",
            xyz: self.white,
        }
    }

    /// Media white tristimulus
    pub fn media_white(&self) -> Xyz {
        self.white
    }

    /// Profile description text
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Device-side channel count
    pub fn device_channels(&self) -> usize {
        self.data_space.channels()
    }

    /// The A2B LUT serving an intent, with ICC fallback to other slots
    pub fn a2b_for_intent(&self, intent: RenderingIntent) -> Option<&LutData> {
        let slot = intent.table_slot();
        self.a2b[slot]
            .as_ref()
            .or(self.a2b[0].as_ref())
            .or_else(|| self.a2b.iter().flatten().next())
    }

    /// The B2A LUT serving an intent, with ICC fallback to other slots
    pub fn b2a_for_intent(&self, intent: RenderingIntent) -> Option<&LutData> {
        let slot = intent.table_slot();
        self.b2a[slot]
            .as_ref()
            .or(self.b2a[0].as_ref())
            .or_else(|| self.b2a.iter().flatten().next())
    }

    /// The matrix/TRC tag set, if present
    pub fn matrix_shaper(&self) -> Option<&MatrixShaper> {
        self.matrix_shaper.as_ref()
    }

    /// The gray TRC tag, if present
    pub fn gray_trc(&self) -> Option<&Curve> {
        self.gray_trc.as_ref()
    }

    /// Check if this is a matrix/TRC profile
    pub fn is_matrix_shaper(&self) -> bool {
        self.matrix_shaper.is_some()
    }

    /// Build a fresh zeroed Color inhabiting this profile's PCS
    ///
    /// Used as a temporary endpoint in multi-stage pipelines and in tests.
    /// Takes the Arc handle; clone it to keep a reference.
    pub fn make_pcs_color(self: Arc<Self>) -> Color {
        let kind = self.pcs_kind();
        let values = vec![0.0; kind.channels()];
        // The PCS side always validates against the profile
        Color::new(kind, &values, Colorspace::Icc(self))
            .unwrap_or_else(|_| Color::xyz(0.0, 0.0, 0.0, white_point::D50))
    }
}

/// Builder enforcing profile invariants at `build()`
#[derive(Debug, Clone)]
pub struct IccProfileBuilder {
    class: ProfileClass,
    version: ProfileVersion,
    pcs: PcsType,
    data_space: DataColorSpace,
    rendering_intent: RenderingIntent,
    white: Xyz,
    description: String,
    a2b: [Option<LutData>; 3],
    b2a: [Option<LutData>; 3],
    matrix_shaper: Option<MatrixShaper>,
    gray_trc: Option<Curve>,
}

impl IccProfileBuilder {
    /// Start a builder with the required header fields
    pub fn new(class: ProfileClass, data_space: DataColorSpace, pcs: PcsType) -> Self {
        Self {
            class,
            version: ProfileVersion::V4,
            pcs,
            data_space,
            rendering_intent: RenderingIntent::default(),
            white: white_point::D50.xyz,
            description: String::new(),
            a2b: [None, None, None],
            b2a: [None, None, None],
            matrix_shaper: None,
            gray_trc: None,
        }
    }

    /// Set the profile version
    pub fn version(mut self, version: ProfileVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the media white point
    pub fn white(mut self, white: Xyz) -> Self {
        self.white = white;
        self
    }

    /// Set the header rendering intent
    pub fn rendering_intent(mut self, intent: RenderingIntent) -> Self {
        self.rendering_intent = intent;
        self
    }

    /// Set the description text
    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    /// Attach an A2B LUT to an intent slot (0 perceptual, 1 colorimetric, 2 saturation)
    pub fn a2b(mut self, slot: usize, lut: LutData) -> Self {
        if slot < 3 {
            self.a2b[slot] = Some(lut);
        }
        self
    }

    /// Attach a B2A LUT to an intent slot
    pub fn b2a(mut self, slot: usize, lut: LutData) -> Self {
        if slot < 3 {
            self.b2a[slot] = Some(lut);
        }
        self
    }

    /// Attach a matrix/TRC tag set
    pub fn matrix_shaper(mut self, shaper: MatrixShaper) -> Self {
        self.matrix_shaper = Some(shaper);
        self
    }

    /// Attach a gray TRC tag
    pub fn gray_trc(mut self, curve: Curve) -> Self {
        self.gray_trc = Some(curve);
        self
    }

    /// Validate and build the profile
    pub fn build(self) -> Result<Arc<IccProfile>> {
        if !self.white.is_positive_finite() {
            return Err(Error::profile("media white must be finite and positive"));
        }

        let dev_ch = self.data_space.channels();
        for lut in self.a2b.iter().flatten() {
            lut.validate()?;
            if lut.input_channels != dev_ch || lut.output_channels != 3 {
                return Err(Error::profile(format!(
                    "A2B LUT is {}→{} channels, profile is {}→PCS",
                    lut.input_channels, lut.output_channels, dev_ch
                )));
            }
        }
        for lut in self.b2a.iter().flatten() {
            lut.validate()?;
            if lut.input_channels != 3 || lut.output_channels != dev_ch {
                return Err(Error::profile(format!(
                    "B2A LUT is {}→{} channels, profile is PCS→{}",
                    lut.input_channels, lut.output_channels, dev_ch
                )));
            }
        }

        if let Some(shaper) = &self.matrix_shaper {
            if self.pcs != PcsType::Xyz {
                return Err(Error::profile("matrix/TRC profiles require an XYZ PCS"));
            }
            if self.data_space != DataColorSpace::Rgb {
                return Err(Error::profile("matrix/TRC profiles require RGB data"));
            }
            if shaper.colorants.inverse().is_none() {
                return Err(Error::profile("colorant matrix is singular"));
            }
        }

        if self.gray_trc.is_some() && self.data_space != DataColorSpace::Gray {
            return Err(Error::profile("gray TRC requires a Gray data space"));
        }

        match self.class {
            ProfileClass::Abstract => {
                if self.a2b[0].is_none() {
                    return Err(Error::profile("abstract profiles require an A2B0 LUT"));
                }
                // Abstract profiles transform PCS to PCS
                let kind_ok = matches!(
                    self.data_space,
                    DataColorSpace::Xyz | DataColorSpace::Lab
                );
                if !kind_ok {
                    return Err(Error::profile(
                        "abstract profiles must declare a PCS-typed data space",
                    ));
                }
            }
            ProfileClass::DeviceLink => {
                if self.a2b[0].is_none() {
                    return Err(Error::profile("device link profiles require an A2B0 LUT"));
                }
            }
            ProfileClass::NamedColor => {
                return Err(Error::profile(
                    "named color profiles carry no conversion transform",
                ));
            }
            _ => {
                let has_forward = self.a2b.iter().any(Option::is_some)
                    || self.matrix_shaper.is_some()
                    || self.gray_trc.is_some();
                if !has_forward {
                    return Err(Error::profile(
                        "profile has no device→PCS transform (A2B, matrix/TRC, or gray TRC)",
                    ));
                }
            }
        }

        Ok(Arc::new(IccProfile {
            class: self.class,
            version: self.version,
            pcs: self.pcs,
            data_space: self.data_space,
            rendering_intent: self.rendering_intent,
            white: self.white,
            description: self.description,
            a2b: self.a2b,
            b2a: self.b2a,
            matrix_shaper: self.matrix_shaper,
            gray_trc: self.gray_trc,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::lut::Clut;

    fn rgb_lab_lut() -> LutData {
        LutData {
            input_channels: 3,
            output_channels: 3,
            input_curves: Vec::new(),
            matrix: None,
            clut: Some(Clut::identity(3, 2).unwrap()),
            output_curves: Vec::new(),
        }
    }

    #[test]
    fn test_display_profile_builds() {
        let profile = IccProfile::builder(ProfileClass::Display, DataColorSpace::Rgb, PcsType::Lab)
            .a2b(1, rgb_lab_lut())
            .build()
            .unwrap();

        assert_eq!(profile.class(), ProfileClass::Display);
        assert_eq!(profile.data_kind(), ColorKind::Rgb);
        assert_eq!(profile.pcs_kind(), ColorKind::Lab);
        assert!(profile
            .a2b_for_intent(RenderingIntent::RelativeColorimetric)
            .is_some());
        // Falls back to the colorimetric table for other intents
        assert!(profile.a2b_for_intent(RenderingIntent::Perceptual).is_some());
    }

    #[test]
    fn test_profile_without_transform_rejected() {
        let err = IccProfile::builder(ProfileClass::Display, DataColorSpace::Rgb, PcsType::Xyz)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::IccProfileInvariant(_)));
    }

    #[test]
    fn test_a2b_channel_mismatch_rejected() {
        // CMYK profile with a 3-channel A2B
        let err = IccProfile::builder(ProfileClass::Output, DataColorSpace::Cmyk, PcsType::Lab)
            .a2b(0, rgb_lab_lut())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::IccProfileInvariant(_)));
    }

    #[test]
    fn test_matrix_shaper_requires_xyz_pcs() {
        let shaper = MatrixShaper {
            colorants: Matrix3x3::identity(),
            trc: [Curve::Identity, Curve::Identity, Curve::Identity],
        };
        let err = IccProfile::builder(ProfileClass::Display, DataColorSpace::Rgb, PcsType::Lab)
            .matrix_shaper(shaper)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::IccProfileInvariant(_)));
    }

    #[test]
    fn test_abstract_requires_pcs_data_space() {
        let err = IccProfile::builder(ProfileClass::Abstract, DataColorSpace::Rgb, PcsType::Lab)
            .a2b(0, rgb_lab_lut())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::IccProfileInvariant(_)));
    }

    #[test]
    fn test_from_rgb_space() {
        let profile = IccProfile::from_rgb_space(&RgbColorspace::SRGB).unwrap();
        assert!(profile.is_matrix_shaper());
        assert_eq!(profile.pcs(), PcsType::Xyz);
        assert_eq!(profile.description(), "sRGB");
        // Media white is the space's white (D65), not the PCS illuminant
        assert!(profile.media_white().approx_eq(&white_point::D65.xyz, 1e-9));
    }

    #[test]
    fn test_make_pcs_color() {
        let profile = IccProfile::builder(ProfileClass::Display, DataColorSpace::Rgb, PcsType::Lab)
            .a2b(1, rgb_lab_lut())
            .build()
            .unwrap();
        let color = profile.make_pcs_color();
        assert_eq!(color.kind(), ColorKind::Lab);
        assert_eq!(color.values(), &[0.0, 0.0, 0.0]);
        assert!(color.space().icc_profile().is_some());
    }
}
