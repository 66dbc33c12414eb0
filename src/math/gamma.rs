//! Gamma and transfer function operations
//!
//! This module provides:
//! - Transfer functions for RGB working spaces (sRGB, pure gamma,
//!   Rec.709/Rec.2020 piecewise, L*)
//! - ICC parametric curve types 0-4 with inverses

/// A transfer function pair for an RGB working space
///
/// `decode` maps encoded (companded) values to linear light; `encode` is
/// the inverse. Out-of-range inputs are handled by sign mirroring so that
/// negative values pass through with defined math instead of producing
/// NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transfer {
    /// Identity (already linear)
    Linear,
    /// Pure power function with the given decoding exponent
    Gamma(f64),
    /// IEC 61966-2-1 piecewise sRGB function
    Srgb,
    /// ITU-R BT.709 camera curve (1.099 / 4.5 / 0.018)
    Rec709,
    /// ITU-R BT.2020 curve (same shape as 709 with higher-precision constants)
    Rec2020,
    /// CIE L* lightness curve scaled to [0, 1]
    LStar,
}

const REC2020_ALPHA: f64 = 1.09929682680944;
const REC2020_BETA: f64 = 0.018053968510807;

// CIE L* constants: epsilon = (6/29)^3, kappa = (29/3)^3
const LSTAR_EPS: f64 = 216.0 / 24389.0;
const LSTAR_KAPPA: f64 = 24389.0 / 27.0;

impl Transfer {
    /// Encoded → linear
    #[inline]
    pub fn decode(&self, encoded: f64) -> f64 {
        mirrored(encoded, |v| match self {
            Transfer::Linear => v,
            Transfer::Gamma(g) => v.powf(*g),
            Transfer::Srgb => {
                if v <= 0.04045 {
                    v / 12.92
                } else {
                    ((v + 0.055) / 1.055).powf(2.4)
                }
            }
            Transfer::Rec709 => {
                if v < 0.081 {
                    v / 4.5
                } else {
                    ((v + 0.099) / 1.099).powf(1.0 / 0.45)
                }
            }
            Transfer::Rec2020 => {
                if v < REC2020_BETA * 4.5 {
                    v / 4.5
                } else {
                    ((v + (REC2020_ALPHA - 1.0)) / REC2020_ALPHA).powf(1.0 / 0.45)
                }
            }
            Transfer::LStar => {
                let l = v * 100.0;
                if l > 8.0 {
                    ((l + 16.0) / 116.0).powi(3)
                } else {
                    l / LSTAR_KAPPA
                }
            }
        })
    }

    /// Linear → encoded
    #[inline]
    pub fn encode(&self, linear: f64) -> f64 {
        mirrored(linear, |v| match self {
            Transfer::Linear => v,
            Transfer::Gamma(g) => {
                if g.abs() > 1e-10 {
                    v.powf(1.0 / g)
                } else {
                    v
                }
            }
            Transfer::Srgb => {
                if v <= 0.0031308 {
                    v * 12.92
                } else {
                    1.055 * v.powf(1.0 / 2.4) - 0.055
                }
            }
            Transfer::Rec709 => {
                if v < 0.018 {
                    v * 4.5
                } else {
                    1.099 * v.powf(0.45) - 0.099
                }
            }
            Transfer::Rec2020 => {
                if v < REC2020_BETA {
                    v * 4.5
                } else {
                    REC2020_ALPHA * v.powf(0.45) - (REC2020_ALPHA - 1.0)
                }
            }
            Transfer::LStar => {
                if v > LSTAR_EPS {
                    (116.0 * v.cbrt() - 16.0) / 100.0
                } else {
                    LSTAR_KAPPA * v / 100.0
                }
            }
        })
    }
}

/// Apply `f` to |x| and restore the sign, extending curves over negatives
#[inline]
fn mirrored(x: f64, f: impl FnOnce(f64) -> f64) -> f64 {
    if x < 0.0 {
        -f(-x)
    } else {
        f(x)
    }
}

/// ICC Parametric Curve Type
///
/// As defined in ICC.1:2022 Section 10.18
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParametricCurveType {
    /// Type 0: Y = X^g
    Gamma,
    /// Type 1: Y = (aX + b)^g  if X >= -b/a, else 0
    Cie122,
    /// Type 2: Y = (aX + b)^g + c  if X >= -b/a, else c
    Iec61966_3,
    /// Type 3: Y = (aX + b)^g  if X >= d, else cX (sRGB-like)
    Iec61966_2_1,
    /// Type 4: Y = (aX + b)^g + e  if X >= d, else cX + f
    Full,
}

impl ParametricCurveType {
    /// Get the function type from the ICC encoded value
    pub fn from_icc(function_type: u16) -> Option<Self> {
        match function_type {
            0 => Some(Self::Gamma),
            1 => Some(Self::Cie122),
            2 => Some(Self::Iec61966_3),
            3 => Some(Self::Iec61966_2_1),
            4 => Some(Self::Full),
            _ => None,
        }
    }

    /// Get the number of parameters required
    pub fn param_count(&self) -> usize {
        match self {
            Self::Gamma => 1,
            Self::Cie122 => 3,
            Self::Iec61966_3 => 4,
            Self::Iec61966_2_1 => 5,
            Self::Full => 7,
        }
    }
}

/// ICC Parametric Curve
///
/// Represents the 5 parametric curve types of ICC.1:2022. The curve maps
/// the encoded [0, 1] domain to linear output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricCurve {
    /// Curve type (0-4)
    pub curve_type: ParametricCurveType,
    /// Gamma value (g)
    pub g: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl ParametricCurve {
    /// Create a simple gamma curve (type 0)
    pub fn gamma(g: f64) -> Self {
        Self {
            curve_type: ParametricCurveType::Gamma,
            g,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Create an sRGB transfer function curve (type 3)
    pub fn srgb() -> Self {
        Self {
            curve_type: ParametricCurveType::Iec61966_2_1,
            g: 2.4,
            a: 1.0 / 1.055,
            b: 0.055 / 1.055,
            c: 1.0 / 12.92,
            d: 0.04045,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Create from ICC parameters, in spec order [g, a, b, c, d, e, f]
    pub fn from_params(curve_type: ParametricCurveType, params: &[f64]) -> Option<Self> {
        if params.len() < curve_type.param_count() {
            return None;
        }

        let p = |i: usize| params.get(i).copied().unwrap_or(0.0);
        Some(Self {
            curve_type,
            g: p(0),
            a: if curve_type == ParametricCurveType::Gamma {
                1.0
            } else {
                p(1)
            },
            b: p(2),
            c: p(3),
            d: p(4),
            e: p(5),
            f: p(6),
        })
    }

    /// Evaluate the curve (encoded → linear). Input is clamped to [0, 1].
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);

        match self.curve_type {
            ParametricCurveType::Gamma => x.powf(self.g),
            ParametricCurveType::Cie122 => {
                if x >= self.threshold() {
                    (self.a * x + self.b).max(0.0).powf(self.g)
                } else {
                    0.0
                }
            }
            ParametricCurveType::Iec61966_3 => {
                if x >= self.threshold() {
                    (self.a * x + self.b).max(0.0).powf(self.g) + self.c
                } else {
                    self.c
                }
            }
            ParametricCurveType::Iec61966_2_1 => {
                if x >= self.d {
                    (self.a * x + self.b).max(0.0).powf(self.g)
                } else {
                    self.c * x
                }
            }
            ParametricCurveType::Full => {
                if x >= self.d {
                    (self.a * x + self.b).max(0.0).powf(self.g) + self.e
                } else {
                    self.c * x + self.f
                }
            }
        }
    }

    /// Evaluate the curve in reverse (linear → encoded)
    ///
    /// Types 0 and 3 have closed-form inverses; the rest fall back to
    /// Newton-Raphson iteration on the forward curve.
    #[inline]
    pub fn eval_inverse(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, 1.0);

        match self.curve_type {
            ParametricCurveType::Gamma => {
                if self.g.abs() > 1e-10 {
                    y.powf(1.0 / self.g)
                } else {
                    y
                }
            }
            ParametricCurveType::Iec61966_2_1 => {
                let linear_threshold = self.c * self.d;
                if y < linear_threshold {
                    if self.c.abs() > 1e-10 {
                        y / self.c
                    } else {
                        0.0
                    }
                } else if self.a.abs() > 1e-10 && self.g.abs() > 1e-10 {
                    (y.powf(1.0 / self.g) - self.b) / self.a
                } else {
                    y
                }
            }
            _ => self.newton_inverse(y),
        }
    }

    fn newton_inverse(&self, y: f64) -> f64 {
        // Starting guess: y^(1/g) is usually close
        let mut x = if self.g.abs() > 1e-10 {
            y.powf(1.0 / self.g)
        } else {
            y
        };

        for _ in 0..8 {
            let fx = self.eval(x) - y;
            if fx.abs() < 1e-12 {
                break;
            }
            let h = 1e-8;
            let dfx = (self.eval(x + h) - self.eval(x - h)) / (2.0 * h);
            if dfx.abs() > 1e-10 {
                x = (x - fx / dfx).clamp(0.0, 1.0);
            }
        }
        x
    }

    fn threshold(&self) -> f64 {
        if self.a.abs() > 1e-10 {
            -self.b / self.a
        } else {
            0.0
        }
    }
}
