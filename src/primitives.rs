//! Primitive color-space transforms
//!
//! Deterministic pure functions converting fixed-arity value arrays
//! between specific color-space kinds. No primitive reads global state;
//! every constant (white point, working-space matrix, luma coefficients)
//! is bound at plan time.
//!
//! [`builtin_paths`] wraps these functions into the registry entries the
//! planner discovers on first use.

use std::sync::Arc;

use crate::color::{ColorKind, Xyz};
use crate::error::{Error, Result};
use crate::pipeline::{Op, OpKind, StageParams};

// CIE 1976 constants: delta = 6/29
const LAB_DELTA: f64 = 6.0 / 29.0;
const LAB_DELTA_CUBED: f64 = LAB_DELTA * LAB_DELTA * LAB_DELTA;

/// CIE 1976 forward function f(t)
#[inline]
pub fn lab_f(t: f64) -> f64 {
    if t > LAB_DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * LAB_DELTA * LAB_DELTA) + 4.0 / 29.0
    }
}

/// CIE 1976 inverse function f⁻¹(t)
#[inline]
pub fn lab_f_inv(t: f64) -> f64 {
    if t > LAB_DELTA {
        t * t * t
    } else {
        3.0 * LAB_DELTA * LAB_DELTA * (t - 4.0 / 29.0)
    }
}

/// XYZ → Lab under an explicit white point
pub fn xyz_to_lab(white: &Xyz, xyz: &[f64], lab: &mut [f64]) {
    let fx = lab_f(xyz[0] / white.x);
    let fy = lab_f(xyz[1] / white.y);
    let fz = lab_f(xyz[2] / white.z);

    lab[0] = 116.0 * fy - 16.0;
    lab[1] = 500.0 * (fx - fy);
    lab[2] = 200.0 * (fy - fz);
}

/// Lab → XYZ under an explicit white point
pub fn lab_to_xyz(white: &Xyz, lab: &[f64], xyz: &mut [f64]) {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = lab[1] / 500.0 + fy;
    let fz = fy - lab[2] / 200.0;

    xyz[0] = lab_f_inv(fx) * white.x;
    xyz[1] = lab_f_inv(fy) * white.y;
    xyz[2] = lab_f_inv(fz) * white.z;
}

/// Lab → LCHab (polar form, hue in degrees [0, 360))
pub fn lab_to_lch(lab: &[f64], lch: &mut [f64]) {
    lch[0] = lab[0];
    lch[1] = lab[1].hypot(lab[2]);
    lch[2] = wrap_degrees(lab[2].atan2(lab[1]).to_degrees());
}

/// LCHab → Lab
pub fn lch_to_lab(lch: &[f64], lab: &mut [f64]) {
    let h = lch[2].to_radians();
    lab[0] = lch[0];
    lab[1] = lch[1] * h.cos();
    lab[2] = lch[1] * h.sin();
}

/// XYZ → Luv under an explicit white point
pub fn xyz_to_luv(white: &Xyz, xyz: &[f64], luv: &mut [f64]) {
    let denom = xyz[0] + 15.0 * xyz[1] + 3.0 * xyz[2];
    let denom_n = white.x + 15.0 * white.y + 3.0 * white.z;

    let (up, vp) = if denom.abs() > 1e-15 {
        (4.0 * xyz[0] / denom, 9.0 * xyz[1] / denom)
    } else {
        (0.0, 0.0)
    };
    let upn = 4.0 * white.x / denom_n;
    let vpn = 9.0 * white.y / denom_n;

    let yr = xyz[1] / white.y;
    let l = if yr > LAB_DELTA_CUBED {
        116.0 * yr.cbrt() - 16.0
    } else {
        (24389.0 / 27.0) * yr
    };

    luv[0] = l;
    if denom.abs() > 1e-15 {
        luv[1] = 13.0 * l * (up - upn);
        luv[2] = 13.0 * l * (vp - vpn);
    } else {
        luv[1] = 0.0;
        luv[2] = 0.0;
    }
}

/// Luv → XYZ under an explicit white point
pub fn luv_to_xyz(white: &Xyz, luv: &[f64], xyz: &mut [f64]) {
    let l = luv[0];
    if l.abs() < 1e-12 {
        xyz[0] = 0.0;
        xyz[1] = 0.0;
        xyz[2] = 0.0;
        return;
    }

    let denom_n = white.x + 15.0 * white.y + 3.0 * white.z;
    let upn = 4.0 * white.x / denom_n;
    let vpn = 9.0 * white.y / denom_n;

    let up = luv[1] / (13.0 * l) + upn;
    let vp = luv[2] / (13.0 * l) + vpn;

    let y = if l > 8.0 {
        white.y * ((l + 16.0) / 116.0).powi(3)
    } else {
        white.y * l * 27.0 / 24389.0
    };

    if vp.abs() > 1e-15 {
        xyz[0] = y * 9.0 * up / (4.0 * vp);
        xyz[1] = y;
        xyz[2] = y * (12.0 - 3.0 * up - 20.0 * vp) / (4.0 * vp);
    } else {
        xyz[0] = 0.0;
        xyz[1] = y;
        xyz[2] = 0.0;
    }
}

/// Luv → LCHuv (polar form, hue in degrees [0, 360))
pub fn luv_to_lch(luv: &[f64], lch: &mut [f64]) {
    lab_to_lch(luv, lch)
}

/// LCHuv → Luv
pub fn lch_to_luv(lch: &[f64], luv: &mut [f64]) {
    lch_to_lab(lch, luv)
}

/// XYZ → xyY; black maps to the white point's chromaticity with Y = 0
pub fn xyz_to_xyy(white: &Xyz, xyz: &[f64], xyy: &mut [f64]) {
    let sum = xyz[0] + xyz[1] + xyz[2];
    if sum.abs() > 1e-15 {
        xyy[0] = xyz[0] / sum;
        xyy[1] = xyz[1] / sum;
    } else {
        let wsum = white.x + white.y + white.z;
        xyy[0] = white.x / wsum;
        xyy[1] = white.y / wsum;
    }
    xyy[2] = xyz[1];
}

/// xyY → XYZ; zero chromaticity denominator maps to black
pub fn xyy_to_xyz(xyy: &[f64], xyz: &mut [f64]) {
    let (x, y, big_y) = (xyy[0], xyy[1], xyy[2]);
    if y.abs() > 1e-15 {
        xyz[0] = x * big_y / y;
        xyz[1] = big_y;
        xyz[2] = (1.0 - x - y) * big_y / y;
    } else {
        xyz[0] = 0.0;
        xyz[1] = 0.0;
        xyz[2] = 0.0;
    }
}

/// Companded RGB → HSV (hue in degrees [0, 360), S and V in [0, 1])
pub fn rgb_to_hsv(rgb: &[f64], hsv: &mut [f64]) {
    let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    hsv[0] = hue_from_rgb(r, g, b, max, delta);
    hsv[1] = if max.abs() > 1e-15 { delta / max } else { 0.0 };
    hsv[2] = max;
}

/// HSV → companded RGB
pub fn hsv_to_rgb(hsv: &[f64], rgb: &mut [f64]) {
    let (h, s, v) = (wrap_degrees(hsv[0]), hsv[1], hsv[2]);
    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = sector_rgb(hp, c, x);
    let m = v - c;
    rgb[0] = r1 + m;
    rgb[1] = g1 + m;
    rgb[2] = b1 + m;
}

/// Companded RGB → HSL (hue in degrees [0, 360), S and L in [0, 1])
pub fn rgb_to_hsl(rgb: &[f64], hsl: &mut [f64]) {
    let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    hsl[0] = hue_from_rgb(r, g, b, max, delta);
    hsl[1] = if delta.abs() < 1e-15 {
        0.0
    } else {
        let denom = 1.0 - (2.0 * l - 1.0).abs();
        if denom.abs() > 1e-15 {
            delta / denom
        } else {
            0.0
        }
    };
    hsl[2] = l;
}

/// HSL → companded RGB
pub fn hsl_to_rgb(hsl: &[f64], rgb: &mut [f64]) {
    let (h, s, l) = (wrap_degrees(hsl[0]), hsl[1], hsl[2]);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = sector_rgb(hp, c, x);
    let m = l - c / 2.0;
    rgb[0] = r1 + m;
    rgb[1] = g1 + m;
    rgb[2] = b1 + m;
}

/// Companded RGB → full-range YCbCr (Cb, Cr centered on 0.5)
pub fn rgb_to_ycbcr(kr: f64, kb: f64, rgb: &[f64], ycbcr: &mut [f64]) {
    let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
    let y = kr * r + (1.0 - kr - kb) * g + kb * b;
    ycbcr[0] = y;
    ycbcr[1] = 0.5 * (b - y) / (1.0 - kb) + 0.5;
    ycbcr[2] = 0.5 * (r - y) / (1.0 - kr) + 0.5;
}

/// Full-range YCbCr → companded RGB
pub fn ycbcr_to_rgb(kr: f64, kb: f64, ycbcr: &[f64], rgb: &mut [f64]) {
    let (y, cb, cr) = (ycbcr[0], ycbcr[1] - 0.5, ycbcr[2] - 0.5);
    let b = y + 2.0 * (1.0 - kb) * cb;
    let r = y + 2.0 * (1.0 - kr) * cr;
    let kg = 1.0 - kr - kb;
    rgb[0] = r;
    rgb[1] = (y - kr * r - kb * b) / kg;
    rgb[2] = b;
}

/// CMYK → CMY (naive undercolor addition)
pub fn cmyk_to_cmy(cmyk: &[f64], cmy: &mut [f64]) {
    let k = cmyk[3];
    cmy[0] = cmyk[0] * (1.0 - k) + k;
    cmy[1] = cmyk[1] * (1.0 - k) + k;
    cmy[2] = cmyk[2] * (1.0 - k) + k;
}

/// CMY → CMYK (naive black extraction)
pub fn cmy_to_cmyk(cmy: &[f64], cmyk: &mut [f64]) {
    let k = cmy[0].min(cmy[1]).min(cmy[2]);
    if k >= 1.0 {
        cmyk[0] = 0.0;
        cmyk[1] = 0.0;
        cmyk[2] = 0.0;
    } else {
        cmyk[0] = (cmy[0] - k) / (1.0 - k);
        cmyk[1] = (cmy[1] - k) / (1.0 - k);
        cmyk[2] = (cmy[2] - k) / (1.0 - k);
    }
    cmyk[3] = k;
}

/// CMY → companded RGB (complement)
pub fn cmy_to_rgb(cmy: &[f64], rgb: &mut [f64]) {
    rgb[0] = 1.0 - cmy[0];
    rgb[1] = 1.0 - cmy[1];
    rgb[2] = 1.0 - cmy[2];
}

/// Companded RGB → CMY (complement)
pub fn rgb_to_cmy(rgb: &[f64], cmy: &mut [f64]) {
    cmy[0] = 1.0 - rgb[0];
    cmy[1] = 1.0 - rgb[1];
    cmy[2] = 1.0 - rgb[2];
}

/// Gray (relative luminance) → XYZ under an explicit white point
pub fn gray_to_xyz(white: &Xyz, gray: &[f64], xyz: &mut [f64]) {
    xyz[0] = white.x * gray[0];
    xyz[1] = white.y * gray[0];
    xyz[2] = white.z * gray[0];
}

/// XYZ → Gray (relative luminance)
pub fn xyz_to_gray(white: &Xyz, xyz: &[f64], gray: &mut [f64]) {
    gray[0] = xyz[1] / white.y;
}

/// Wrap an angle in degrees into [0, 360)
#[inline]
fn wrap_degrees(h: f64) -> f64 {
    let wrapped = h % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Shared hue computation for HSV/HSL
#[inline]
fn hue_from_rgb(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    if delta.abs() < 1e-15 {
        return 0.0;
    }
    let h = if max == r {
        (g - b) / delta % 6.0
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    wrap_degrees(h * 60.0)
}

/// Map a hue sector to chroma components
#[inline]
fn sector_rgb(hp: f64, c: f64, x: f64) -> (f64, f64, f64) {
    match hp as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    }
}

// ============================================================================
// Registry entries
// ============================================================================

/// A registered conversion primitive between two color kinds
///
/// `build` materializes the hop as one or more compiled ops with every
/// constant bound from the stage parameters.
#[derive(Clone)]
pub struct ConversionPath {
    /// Input color kind
    pub from: ColorKind,
    /// Output color kind
    pub to: ColorKind,
    /// Stage builder invoked at plan time
    pub build: PathBuilder,
}

/// Builder resolving stage parameters into compiled ops
pub type PathBuilder = Arc<dyn Fn(&StageParams) -> Result<Vec<Op>> + Send + Sync>;

impl std::fmt::Debug for ConversionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConversionPath({} → {})", self.from, self.to)
    }
}

fn path(
    from: ColorKind,
    to: ColorKind,
    build: impl Fn(&StageParams) -> Result<Vec<Op>> + Send + Sync + 'static,
) -> ConversionPath {
    ConversionPath {
        from,
        to,
        build: Arc::new(build),
    }
}

/// Wrap a white-point-parameterized function into a single op
fn white_op(
    channels_in: usize,
    channels_out: usize,
    params: &StageParams,
    f: fn(&Xyz, &[f64], &mut [f64]),
) -> Vec<Op> {
    let white = params.white.xyz;
    vec![Op {
        kind: OpKind::Func(Arc::new(move |input, out| f(&white, input, out))),
        in_ch: channels_in,
        out_ch: channels_out,
    }]
}

/// Wrap a parameter-free function into a single op
fn plain_op(channels_in: usize, channels_out: usize, f: fn(&[f64], &mut [f64])) -> Vec<Op> {
    vec![Op {
        kind: OpKind::Func(Arc::new(move |input, out| f(input, out))),
        in_ch: channels_in,
        out_ch: channels_out,
    }]
}

fn require_rgb(params: &StageParams, what: &str) -> Result<crate::color::RgbColorspace> {
    params
        .rgb
        .clone()
        .ok_or_else(|| Error::setup(format!("{what} requires an RGB working space binding")))
}

/// The built-in primitive catalog, in registration order
///
/// Registration order is the planner's deterministic tie-break order. The
/// RGB↔XYZ entries emit a companding op plus a separate matrix op so the
/// assembler can fuse adjacent matrices (including chromatic adaptation)
/// into one.
pub fn builtin_paths() -> Vec<ConversionPath> {
    use ColorKind::*;

    vec![
        path(Xyz, Lab, |p| Ok(white_op(3, 3, p, xyz_to_lab))),
        path(Lab, Xyz, |p| Ok(white_op(3, 3, p, lab_to_xyz))),
        path(Lab, LchAb, |_| Ok(plain_op(3, 3, lab_to_lch))),
        path(LchAb, Lab, |_| Ok(plain_op(3, 3, lch_to_lab))),
        path(Xyz, Luv, |p| Ok(white_op(3, 3, p, xyz_to_luv))),
        path(Luv, Xyz, |p| Ok(white_op(3, 3, p, luv_to_xyz))),
        path(Luv, LchUv, |_| Ok(plain_op(3, 3, luv_to_lch))),
        path(LchUv, Luv, |_| Ok(plain_op(3, 3, lch_to_luv))),
        path(Xyz, XyY, |p| Ok(white_op(3, 3, p, xyz_to_xyy))),
        path(XyY, Xyz, |_| Ok(plain_op(3, 3, xyy_to_xyz))),
        path(Rgb, Xyz, |p| {
            let space = require_rgb(p, "RGB → XYZ")?;
            let matrix = space.to_xyz_matrix()?;
            let transfer = space.transfer;
            Ok(vec![
                Op {
                    kind: OpKind::Func(Arc::new(move |input, out| {
                        out[0] = transfer.decode(input[0]);
                        out[1] = transfer.decode(input[1]);
                        out[2] = transfer.decode(input[2]);
                    })),
                    in_ch: 3,
                    out_ch: 3,
                },
                Op {
                    kind: OpKind::Matrix(matrix),
                    in_ch: 3,
                    out_ch: 3,
                },
            ])
        }),
        path(Xyz, Rgb, |p| {
            let space = require_rgb(p, "XYZ → RGB")?;
            let matrix = space.from_xyz_matrix()?;
            let transfer = space.transfer;
            Ok(vec![
                Op {
                    kind: OpKind::Matrix(matrix),
                    in_ch: 3,
                    out_ch: 3,
                },
                Op {
                    kind: OpKind::Func(Arc::new(move |input, out| {
                        out[0] = transfer.encode(input[0]);
                        out[1] = transfer.encode(input[1]);
                        out[2] = transfer.encode(input[2]);
                    })),
                    in_ch: 3,
                    out_ch: 3,
                },
            ])
        }),
        path(Rgb, Hsv, |_| Ok(plain_op(3, 3, rgb_to_hsv))),
        path(Hsv, Rgb, |_| Ok(plain_op(3, 3, hsv_to_rgb))),
        path(Rgb, Hsl, |_| Ok(plain_op(3, 3, rgb_to_hsl))),
        path(Hsl, Rgb, |_| Ok(plain_op(3, 3, hsl_to_rgb))),
        path(Rgb, YCbCr, |p| {
            let space = require_rgb(p, "RGB → YCbCr")?;
            let (kr, kb) = space.luma_coefficients();
            Ok(vec![Op {
                kind: OpKind::Func(Arc::new(move |input, out| {
                    rgb_to_ycbcr(kr, kb, input, out)
                })),
                in_ch: 3,
                out_ch: 3,
            }])
        }),
        path(YCbCr, Rgb, |p| {
            let space = require_rgb(p, "YCbCr → RGB")?;
            let (kr, kb) = space.luma_coefficients();
            Ok(vec![Op {
                kind: OpKind::Func(Arc::new(move |input, out| {
                    ycbcr_to_rgb(kr, kb, input, out)
                })),
                in_ch: 3,
                out_ch: 3,
            }])
        }),
        path(Cmyk, Cmy, |_| Ok(plain_op(4, 3, cmyk_to_cmy))),
        path(Cmy, Cmyk, |_| Ok(plain_op(3, 4, cmy_to_cmyk))),
        path(Cmy, Rgb, |_| Ok(plain_op(3, 3, cmy_to_rgb))),
        path(Rgb, Cmy, |_| Ok(plain_op(3, 3, rgb_to_cmy))),
        path(Gray, Xyz, |p| Ok(white_op(1, 3, p, gray_to_xyz))),
        path(Xyz, Gray, |p| Ok(white_op(3, 1, p, xyz_to_gray))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::white_point::{D50, D65};

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_xyz_lab_white() {
        // The white point itself maps to L=100, a=b=0
        let mut lab = [0.0; 3];
        xyz_to_lab(&D65.xyz, &D65.xyz.to_array(), &mut lab);
        assert!((lab[0] - 100.0).abs() < 1e-9);
        assert!(lab[1].abs() < 1e-9);
        assert!(lab[2].abs() < 1e-9);
    }

    #[test]
    fn test_xyz_lab_reference_value() {
        let mut lab = [0.0; 3];
        xyz_to_lab(&D65.xyz, &[0.3, 0.4, 0.5], &mut lab);
        assert!((lab[0] - 69.469531).abs() < 1e-5);
        assert!((lab[1] - (-27.970699)).abs() < 1e-5);
        assert!((lab[2] - (-6.938993)).abs() < 1e-5);
    }

    #[test]
    fn test_xyz_lab_roundtrip() {
        for &(x, y, z) in &[
            (0.1, 0.1, 0.1),
            (0.3, 0.4, 0.5),
            (0.9504, 1.0, 1.0888),
            (0.001, 0.002, 0.003),
        ] {
            let mut lab = [0.0; 3];
            let mut back = [0.0; 3];
            xyz_to_lab(&D50.xyz, &[x, y, z], &mut lab);
            lab_to_xyz(&D50.xyz, &lab, &mut back);
            assert!((back[0] - x).abs() < 1e-10 * x.max(1.0));
            assert!((back[1] - y).abs() < 1e-10 * y.max(1.0));
            assert!((back[2] - z).abs() < 1e-10 * z.max(1.0));
        }
    }

    #[test]
    fn test_lab_lch_known_value() {
        // Lab(50, 20, -30) → C ≈ 36.0555, h ≈ 303.69°
        let mut lch = [0.0; 3];
        lab_to_lch(&[50.0, 20.0, -30.0], &mut lch);
        assert!((lch[0] - 50.0).abs() < EPSILON);
        assert!((lch[1] - 36.0555).abs() < 1e-3);
        assert!((lch[2] - 303.69).abs() < 1e-2);

        let mut back = [0.0; 3];
        lch_to_lab(&lch, &mut back);
        assert!((back[1] - 20.0).abs() < 1e-9);
        assert!((back[2] - (-30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_xyz_luv_reference_value() {
        let mut luv = [0.0; 3];
        xyz_to_luv(&D65.xyz, &[0.3, 0.4, 0.5], &mut luv);
        assert!((luv[0] - 69.469531).abs() < 1e-5, "L: {}", luv[0]);
        assert!((luv[1] - (-39.730856)).abs() < 1e-5, "u: {}", luv[1]);
        assert!((luv[2] - (-6.139157)).abs() < 1e-5, "v: {}", luv[2]);
    }

    #[test]
    fn test_xyz_luv_roundtrip() {
        for &(x, y, z) in &[(0.3, 0.4, 0.5), (0.2, 0.2, 0.2), (0.7, 0.9, 1.0)] {
            let mut luv = [0.0; 3];
            let mut back = [0.0; 3];
            xyz_to_luv(&D65.xyz, &[x, y, z], &mut luv);
            luv_to_xyz(&D65.xyz, &luv, &mut back);
            assert!((back[0] - x).abs() < 1e-9, "x: {}", back[0]);
            assert!((back[1] - y).abs() < 1e-9, "y: {}", back[1]);
            assert!((back[2] - z).abs() < 1e-9, "z: {}", back[2]);
        }
    }

    #[test]
    fn test_luv_black() {
        let mut luv = [0.0; 3];
        xyz_to_luv(&D65.xyz, &[0.0, 0.0, 0.0], &mut luv);
        assert!(luv[0].abs() < EPSILON && luv[1].abs() < EPSILON && luv[2].abs() < EPSILON);

        let mut xyz = [0.0; 3];
        luv_to_xyz(&D65.xyz, &luv, &mut xyz);
        assert!(xyz[0].abs() < EPSILON && xyz[1].abs() < EPSILON && xyz[2].abs() < EPSILON);
    }

    #[test]
    fn test_xyy_roundtrip() {
        let mut xyy = [0.0; 3];
        let mut back = [0.0; 3];
        xyz_to_xyy(&D65.xyz, &[0.5, 0.6, 0.7], &mut xyy);
        xyy_to_xyz(&xyy, &mut back);
        assert!((back[0] - 0.5).abs() < 1e-12);
        assert!((back[1] - 0.6).abs() < 1e-12);
        assert!((back[2] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_xyy_black_keeps_white_chromaticity() {
        let mut xyy = [0.0; 3];
        xyz_to_xyy(&D65.xyz, &[0.0, 0.0, 0.0], &mut xyy);
        assert!((xyy[0] - 0.31273).abs() < 1e-4);
        assert!((xyy[1] - 0.32902).abs() < 1e-4);
        assert!(xyy[2].abs() < EPSILON);
    }

    #[test]
    fn test_rgb_hsv_reference_value() {
        let mut hsv = [0.0; 3];
        rgb_to_hsv(&[0.35, 0.17, 0.63], &mut hsv);
        assert!((hsv[0] - 263.478261).abs() < 1e-5, "h: {}", hsv[0]);
        assert!((hsv[1] - 0.730159).abs() < 1e-5, "s: {}", hsv[1]);
        assert!((hsv[2] - 0.63).abs() < 1e-9, "v: {}", hsv[2]);

        let mut back = [0.0; 3];
        hsv_to_rgb(&hsv, &mut back);
        assert!((back[0] - 0.35).abs() < 1e-9);
        assert!((back[1] - 0.17).abs() < 1e-9);
        assert!((back[2] - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_rgb_hsl_reference_value() {
        let mut hsl = [0.0; 3];
        rgb_to_hsl(&[0.35, 0.17, 0.63], &mut hsl);
        assert!((hsl[0] - 263.478261).abs() < 1e-5, "h: {}", hsl[0]);
        assert!((hsl[1] - 0.575).abs() < 1e-5, "s: {}", hsl[1]);
        assert!((hsl[2] - 0.4).abs() < 1e-9, "l: {}", hsl[2]);

        let mut back = [0.0; 3];
        hsl_to_rgb(&hsl, &mut back);
        assert!((back[0] - 0.35).abs() < 1e-9);
        assert!((back[1] - 0.17).abs() < 1e-9);
        assert!((back[2] - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_hsv_gray_has_zero_saturation() {
        let mut hsv = [0.0; 3];
        rgb_to_hsv(&[0.5, 0.5, 0.5], &mut hsv);
        assert!(hsv[0].abs() < EPSILON);
        assert!(hsv[1].abs() < EPSILON);
        assert!((hsv[2] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_ycbcr_601_reference_value() {
        let mut ycc = [0.0; 3];
        rgb_to_ycbcr(0.299, 0.114, &[0.35, 0.17, 0.63], &mut ycc);
        assert!((ycc[0] - 0.276260).abs() < 1e-6, "y: {}", ycc[0]);
        assert!((ycc[1] - 0.699628).abs() < 1e-6, "cb: {}", ycc[1]);
        assert!((ycc[2] - 0.552596).abs() < 1e-6, "cr: {}", ycc[2]);

        let mut back = [0.0; 3];
        ycbcr_to_rgb(0.299, 0.114, &ycc, &mut back);
        assert!((back[0] - 0.35).abs() < 1e-12);
        assert!((back[1] - 0.17).abs() < 1e-12);
        assert!((back[2] - 0.63).abs() < 1e-12);
    }

    #[test]
    fn test_ycbcr_709_reference_value() {
        let mut ycc = [0.0; 3];
        rgb_to_ycbcr(0.2126, 0.0722, &[0.35, 0.17, 0.63], &mut ycc);
        assert!((ycc[0] - 0.241480).abs() < 1e-6);
        assert!((ycc[1] - 0.709377).abs() < 1e-6);
        assert!((ycc[2] - 0.568910).abs() < 1e-6);
    }

    #[test]
    fn test_cmyk_roundtrip() {
        let cmy_in = [0.6, 0.3, 0.8];
        let mut cmyk = [0.0; 4];
        let mut back = [0.0; 3];
        cmy_to_cmyk(&cmy_in, &mut cmyk);
        assert!((cmyk[3] - 0.3).abs() < EPSILON);
        cmyk_to_cmy(&cmyk, &mut back);
        for c in 0..3 {
            assert!((back[c] - cmy_in[c]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cmy_rgb_complement() {
        let mut rgb = [0.0; 3];
        cmy_to_rgb(&[1.0, 0.0, 0.5], &mut rgb);
        assert_eq!(rgb, [0.0, 1.0, 0.5]);

        let mut cmy = [0.0; 3];
        rgb_to_cmy(&rgb, &mut cmy);
        assert_eq!(cmy, [1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_gray_xyz_roundtrip() {
        let mut xyz = [0.0; 3];
        let mut back = [0.0; 1];
        gray_to_xyz(&D50.xyz, &[0.42], &mut xyz);
        assert!((xyz[1] - 0.42).abs() < EPSILON);
        xyz_to_gray(&D50.xyz, &xyz, &mut back);
        assert!((back[0] - 0.42).abs() < EPSILON);
    }

    #[test]
    fn test_builtin_paths_cover_spec() {
        let paths = builtin_paths();
        let has = |from, to| paths.iter().any(|p| p.from == from && p.to == to);
        use ColorKind::*;

        for (from, to) in [
            (Xyz, Lab),
            (Lab, Xyz),
            (Lab, LchAb),
            (LchAb, Lab),
            (Xyz, Luv),
            (Luv, LchUv),
            (Rgb, Xyz),
            (Xyz, Rgb),
            (Rgb, Hsv),
            (Rgb, Hsl),
            (Rgb, YCbCr),
            (Cmyk, Cmy),
            (Cmy, Rgb),
            (Gray, Xyz),
            (Xyz, Gray),
        ] {
            assert!(has(from, to), "missing builtin path {from} → {to}");
        }
    }
}
