//! Direction-bound ICC transform chains
//!
//! Given a profile, a direction, and a rendering intent, [`IccTransform`]
//! builds the ordered chain the engine executes: shaper curves → matrix →
//! CLUT → output curves → PCS encode/decode. Transforms never mutate
//! profile state; every derived table is cloned into the transform at
//! build time, so registry or profile changes after construction cannot
//! affect an assembled pipeline.
//!
//! At the PCS boundary values are *actual* colorimetry: Lab in its natural
//! ranges and XYZ with white Y = 1. Encoding to the LUT [0, 1] domain uses
//! the ICC v4 conventions (L/100, (a+128)/255, XYZ / 1.99997).

use crate::color::Xyz;
use crate::color::white_point::D50;
use crate::error::{Error, Result};
use crate::icc::lut::{ClutInterpolation, Curve, LutData};
use crate::icc::profile::{IccProfile, PcsType, ProfileClass, RenderingIntent};
use crate::math::interpolation::MAX_CHANNELS;
use crate::math::{Matrix3x3, Transfer};

/// Scale of the ICC XYZ PCS encoding (u1Fixed15 full scale)
const XYZ_PCS_SCALE: f64 = 1.999969482421875;

/// Transform direction relative to the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IccDirection {
    /// Device values → Profile Connection Space
    DeviceToPcs,
    /// Profile Connection Space → device values
    PcsToDevice,
}

#[derive(Debug, Clone)]
enum Chain {
    /// LUT chain; PCS codecs applied per the option flags
    Lut {
        lut: LutData,
        encode_input: Option<PcsType>,
        decode_output: Option<PcsType>,
    },
    /// TRC decode then colorant matrix (device → XYZ)
    Shaper { matrix: Matrix3x3, trc: [Curve; 3] },
    /// Inverse colorant matrix then TRC encode (XYZ → device)
    ShaperInverse { matrix: Matrix3x3, trc: [Curve; 3] },
    /// Gray TRC to the PCS neutral axis
    GrayToPcs { trc: Curve },
    /// PCS neutral axis back through the gray TRC
    PcsToGray { trc: Curve },
}

/// One profile's transform chain, bound to a direction and intent
#[derive(Debug, Clone)]
pub struct IccTransform {
    direction: IccDirection,
    chain: Chain,
    interp: ClutInterpolation,
    pcs: PcsType,
    media_white: Xyz,
    absolute: bool,
    input_channels: usize,
    output_channels: usize,
}

impl IccTransform {
    /// Build the device → PCS chain of a profile
    ///
    /// For Abstract profiles the "device" side is itself the PCS and the
    /// input is PCS-encoded before the LUT.
    pub fn device_to_pcs(
        profile: &IccProfile,
        intent: RenderingIntent,
        interp: ClutInterpolation,
    ) -> Result<Self> {
        let pcs = profile.pcs();
        let is_abstract = profile.class() == ProfileClass::Abstract;

        let chain = if let Some(lut) = profile.a2b_for_intent(intent) {
            Chain::Lut {
                lut: lut.clone(),
                encode_input: is_abstract.then_some(pcs),
                decode_output: Some(pcs),
            }
        } else if let Some(shaper) = profile.matrix_shaper() {
            Chain::Shaper {
                matrix: shaper.colorants,
                trc: shaper.trc.clone(),
            }
        } else if let Some(trc) = profile.gray_trc() {
            Chain::GrayToPcs { trc: trc.clone() }
        } else {
            return Err(Error::profile(format!(
                "profile '{}' has no device→PCS transform",
                profile.description()
            )));
        };

        Ok(Self {
            direction: IccDirection::DeviceToPcs,
            chain,
            interp,
            pcs,
            media_white: profile.media_white(),
            absolute: intent == RenderingIntent::AbsoluteColorimetric,
            input_channels: profile.device_channels(),
            output_channels: 3,
        })
    }

    /// Build the PCS → device chain of a profile
    pub fn pcs_to_device(
        profile: &IccProfile,
        intent: RenderingIntent,
        interp: ClutInterpolation,
    ) -> Result<Self> {
        match profile.class() {
            ProfileClass::DeviceLink => {
                return Err(Error::setup(
                    "device link profiles encode a one-way transform",
                ))
            }
            ProfileClass::Abstract => {
                return Err(Error::setup("abstract profiles are applied forward only"))
            }
            _ => {}
        }

        let pcs = profile.pcs();
        let chain = if let Some(lut) = profile.b2a_for_intent(intent) {
            Chain::Lut {
                lut: lut.clone(),
                encode_input: Some(pcs),
                decode_output: None,
            }
        } else if let Some(shaper) = profile.matrix_shaper() {
            let inverse = shaper
                .colorants
                .inverse()
                .ok_or_else(|| Error::profile("colorant matrix is singular"))?;
            Chain::ShaperInverse {
                matrix: inverse,
                trc: shaper.trc.clone(),
            }
        } else if let Some(trc) = profile.gray_trc() {
            Chain::PcsToGray { trc: trc.clone() }
        } else {
            return Err(Error::profile(format!(
                "profile '{}' has no PCS→device transform",
                profile.description()
            )));
        };

        Ok(Self {
            direction: IccDirection::PcsToDevice,
            chain,
            interp,
            pcs,
            media_white: profile.media_white(),
            absolute: intent == RenderingIntent::AbsoluteColorimetric,
            input_channels: 3,
            output_channels: profile.device_channels(),
        })
    }

    /// Transform direction
    pub fn direction(&self) -> IccDirection {
        self.direction
    }

    /// Input channel count
    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    /// Output channel count
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Execute the chain
    ///
    /// `input` carries `input_channels()` values, `out` receives
    /// `output_channels()`. Allocation-free.
    pub fn apply(&self, input: &[f64], out: &mut [f64]) {
        match &self.chain {
            Chain::Lut {
                lut,
                encode_input,
                decode_output,
            } => {
                let mut enc = [0.0f64; MAX_CHANNELS];
                if let Some(pcs) = encode_input {
                    let mut pcs_vals = [input[0], input[1], input[2]];
                    if self.absolute && self.direction == IccDirection::PcsToDevice {
                        pcs_vals = self.absolute_to_relative(pcs_vals);
                    }
                    pcs_encode(*pcs, pcs_vals, &mut enc);
                } else {
                    enc[..lut.input_channels].copy_from_slice(&input[..lut.input_channels]);
                }

                let mut dec = [0.0f64; MAX_CHANNELS];
                lut.eval(&enc[..lut.input_channels], &mut dec, self.interp);

                if let Some(pcs) = decode_output {
                    let mut pcs_vals = pcs_decode(*pcs, &dec);
                    if self.absolute && self.direction == IccDirection::DeviceToPcs {
                        pcs_vals = self.relative_to_absolute(pcs_vals);
                    }
                    out[..3].copy_from_slice(&pcs_vals);
                } else {
                    out[..lut.output_channels].copy_from_slice(&dec[..lut.output_channels]);
                }
            }
            Chain::Shaper { matrix, trc } => {
                let lin = [
                    trc[0].eval(input[0]),
                    trc[1].eval(input[1]),
                    trc[2].eval(input[2]),
                ];
                let mut xyz = matrix.multiply_vec(lin);
                if self.absolute {
                    xyz = self.relative_to_absolute(xyz);
                }
                out[..3].copy_from_slice(&xyz);
            }
            Chain::ShaperInverse { matrix, trc } => {
                let mut xyz = [input[0], input[1], input[2]];
                if self.absolute {
                    xyz = self.absolute_to_relative(xyz);
                }
                let lin = matrix.multiply_vec(xyz);
                out[0] = trc[0].eval_inverse(lin[0]);
                out[1] = trc[1].eval_inverse(lin[1]);
                out[2] = trc[2].eval_inverse(lin[2]);
            }
            Chain::GrayToPcs { trc } => {
                let y = trc.eval(input[0]);
                match self.pcs {
                    PcsType::Lab => {
                        out[0] = 100.0 * Transfer::LStar.encode(y);
                        out[1] = 0.0;
                        out[2] = 0.0;
                    }
                    PcsType::Xyz => {
                        out[0] = D50.xyz.x * y;
                        out[1] = D50.xyz.y * y;
                        out[2] = D50.xyz.z * y;
                    }
                }
            }
            Chain::PcsToGray { trc } => {
                let y = match self.pcs {
                    PcsType::Lab => Transfer::LStar.decode(input[0] / 100.0),
                    PcsType::Xyz => input[1],
                };
                out[0] = trc.eval_inverse(y);
            }
        }
    }

    /// Media-relative → ICC-absolute XYZ (white point scaling)
    ///
    /// Lab PCS values render media-relative even under the absolute
    /// intent; scaling applies to XYZ only.
    fn relative_to_absolute(&self, xyz: [f64; 3]) -> [f64; 3] {
        if self.pcs != PcsType::Xyz {
            return xyz;
        }
        [
            xyz[0] * self.media_white.x / D50.xyz.x,
            xyz[1] * self.media_white.y / D50.xyz.y,
            xyz[2] * self.media_white.z / D50.xyz.z,
        ]
    }

    fn absolute_to_relative(&self, xyz: [f64; 3]) -> [f64; 3] {
        if self.pcs != PcsType::Xyz {
            return xyz;
        }
        [
            xyz[0] * D50.xyz.x / self.media_white.x,
            xyz[1] * D50.xyz.y / self.media_white.y,
            xyz[2] * D50.xyz.z / self.media_white.z,
        ]
    }
}

/// Encode actual PCS values into the LUT [0, 1] domain
fn pcs_encode(pcs: PcsType, vals: [f64; 3], out: &mut [f64; MAX_CHANNELS]) {
    match pcs {
        PcsType::Lab => {
            out[0] = vals[0] / 100.0;
            out[1] = (vals[1] + 128.0) / 255.0;
            out[2] = (vals[2] + 128.0) / 255.0;
        }
        PcsType::Xyz => {
            out[0] = vals[0] / XYZ_PCS_SCALE;
            out[1] = vals[1] / XYZ_PCS_SCALE;
            out[2] = vals[2] / XYZ_PCS_SCALE;
        }
    }
}

/// Decode LUT [0, 1] outputs into actual PCS values
fn pcs_decode(pcs: PcsType, enc: &[f64; MAX_CHANNELS]) -> [f64; 3] {
    match pcs {
        PcsType::Lab => [
            enc[0] * 100.0,
            enc[1] * 255.0 - 128.0,
            enc[2] * 255.0 - 128.0,
        ],
        PcsType::Xyz => [
            enc[0] * XYZ_PCS_SCALE,
            enc[1] * XYZ_PCS_SCALE,
            enc[2] * XYZ_PCS_SCALE,
        ],
    }
}
