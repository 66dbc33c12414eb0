//! Chromatic Adaptation Transforms
//!
//! Chromatic adaptation transforms convert XYZ tristimuli observed under
//! one white point to those that would appear equivalent under another.
//! Each method is a named 3x3 cone-response matrix; the combined transform
//! is `M⁻¹ · diag(M·W₂ / M·W₁) · M`.
//!
//! References:
//! - ICC.1:2022 Annex E
//! - Lindbloom: http://www.brucelindbloom.com/index.html?Eqn_ChromAdapt.html

use crate::color::WhitePoint;
use crate::error::{Error, Result};
use crate::math::Matrix3x3;

/// A named chromatic adaptation method: a cone-response matrix and its inverse
///
/// The inverse is computed at construction so that forward and backward
/// adaptations cancel to machine precision.
#[derive(Debug, Clone, PartialEq)]
pub struct CatSpec {
    /// Method name used for registry lookup ("Bradford", "CAT02", …)
    pub name: &'static str,
    /// XYZ → cone response matrix
    pub to_cone: Matrix3x3,
    /// Cone response → XYZ matrix
    pub from_cone: Matrix3x3,
}

impl CatSpec {
    /// Create a method from its cone-response matrix, computing the inverse
    pub fn new(name: &'static str, to_cone: Matrix3x3) -> Result<Self> {
        let from_cone = to_cone
            .inverse()
            .ok_or_else(|| Error::setup(format!("adaptation matrix '{name}' is singular")))?;
        Ok(Self {
            name,
            to_cone,
            from_cone,
        })
    }

    fn from_invertible(name: &'static str, to_cone: Matrix3x3) -> Self {
        // Built-in cone matrices are all invertible; fall back to the
        // identity cone space rather than panic if one is ever edited into
        // degeneracy.
        let from_cone = to_cone.inverse().unwrap_or_else(Matrix3x3::identity);
        Self {
            name,
            to_cone,
            from_cone,
        }
    }

    /// Bradford adaptation (ICC default, recommended)
    pub fn bradford() -> Self {
        Self::from_invertible(
            "Bradford",
            Matrix3x3::new([
                [0.8951000, 0.2664000, -0.1614000],
                [-0.7502000, 1.7135000, 0.0367000],
                [0.0389000, -0.0685000, 1.0296000],
            ]),
        )
    }

    /// Von Kries adaptation
    pub fn von_kries() -> Self {
        Self::from_invertible(
            "VonKries",
            Matrix3x3::new([
                [0.4002400, 0.7076000, -0.0808100],
                [-0.2263000, 1.1653200, 0.0457000],
                [0.0000000, 0.0000000, 0.9182200],
            ]),
        )
    }

    /// XYZ scaling (identity cone space, simple but less accurate)
    pub fn xyz_scaling() -> Self {
        Self {
            name: "XyzScaling",
            to_cone: Matrix3x3::identity(),
            from_cone: Matrix3x3::identity(),
        }
    }

    /// CAT02 adaptation (CIECAM02 cone matrix)
    pub fn cat02() -> Self {
        Self::from_invertible(
            "CAT02",
            Matrix3x3::new([
                [0.7328, 0.4296, -0.1624],
                [-0.7036, 1.6975, 0.0061],
                [0.0030, 0.0136, 0.9834],
            ]),
        )
    }

    /// Sharp adaptation (sharpened cone responses)
    pub fn sharp() -> Self {
        Self::from_invertible(
            "Sharp",
            Matrix3x3::new([
                [1.2694, -0.0988, -0.1706],
                [-0.8364, 1.8006, 0.0357],
                [0.0297, -0.0315, 1.0018],
            ]),
        )
    }
}

/// Compute the combined adaptation matrix from one white point to another
///
/// The returned matrix M can be used as: XYZ_dest = M × XYZ_src. Zero cone
/// responses (degenerate white points) scale by 1 rather than dividing by
/// zero.
pub fn adaptation_matrix(
    spec: &CatSpec,
    src_white: &WhitePoint,
    dst_white: &WhitePoint,
) -> Matrix3x3 {
    let src_cone = spec.to_cone.multiply_vec(src_white.xyz.to_array());
    let dst_cone = spec.to_cone.multiply_vec(dst_white.xyz.to_array());

    let ratio = |d: f64, s: f64| if s.abs() > 1e-10 { d / s } else { 1.0 };
    let scale = Matrix3x3::diagonal(
        ratio(dst_cone[0], src_cone[0]),
        ratio(dst_cone[1], src_cone[1]),
        ratio(dst_cone[2], src_cone[2]),
    );

    spec.from_cone.multiply(&scale.multiply(&spec.to_cone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::white_point::{D50, D65};

    const EPSILON: f64 = 1e-6;

    /// Pre-computed D65 → D50 Bradford matrix (Lindbloom)
    const D65_TO_D50_BRADFORD: Matrix3x3 = Matrix3x3::new([
        [1.0478112, 0.0228866, -0.0501270],
        [0.0295424, 0.9904844, -0.0170491],
        [-0.0092345, 0.0150436, 0.7521316],
    ]);

    #[test]
    fn test_identity_adaptation() {
        let matrix = adaptation_matrix(&CatSpec::bradford(), &D65, &D65);
        assert!(matrix.is_identity(EPSILON));
    }

    #[test]
    fn test_d65_to_d50_matches_published() {
        let computed = adaptation_matrix(&CatSpec::bradford(), &D65, &D50);
        assert!(
            computed.approx_eq(&D65_TO_D50_BRADFORD, 1e-4),
            "D65→D50 matrix mismatch: computed={:?}",
            computed
        );
    }

    #[test]
    fn test_adaptation_roundtrip() {
        for spec in [
            CatSpec::bradford(),
            CatSpec::von_kries(),
            CatSpec::xyz_scaling(),
            CatSpec::cat02(),
            CatSpec::sharp(),
        ] {
            let m1 = adaptation_matrix(&spec, &D65, &D50);
            let m2 = adaptation_matrix(&spec, &D50, &D65);
            let roundtrip = m1.multiply(&m2);
            assert!(
                roundtrip.is_identity(1e-12),
                "{} roundtrip not identity",
                spec.name
            );
        }
    }

    #[test]
    fn test_white_point_maps_to_white_point() {
        let m = adaptation_matrix(&CatSpec::bradford(), &D65, &D50);
        let adapted = m.multiply_vec(D65.xyz.to_array());
        for (a, b) in adapted.iter().zip(D50.xyz.to_array()) {
            assert!((a - b).abs() < 1e-6, "D65 white → D50: {:?}", adapted);
        }
    }

    #[test]
    fn test_xyz_scaling_is_diagonal() {
        let m = adaptation_matrix(&CatSpec::xyz_scaling(), &D65, &D50);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert!(m.m[i][j].abs() < EPSILON);
                }
            }
        }
    }

    #[test]
    fn test_cat_spec_new_rejects_singular() {
        let singular = Matrix3x3::new([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
        assert!(CatSpec::new("broken", singular).is_err());
    }
}
