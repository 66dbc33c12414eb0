//! Interpolation functions for curve and LUT evaluation
//!
//! This module provides:
//! - Linear interpolation (1D curves)
//! - Trilinear interpolation (3D CLUT)
//! - Tetrahedral interpolation (3D CLUT, more accurate)
//! - N-linear interpolation (CLUTs of any dimensionality)
//!
//! CLUT samples are accessed through a flat-index closure so that grids
//! stored as f64 or as 16-bit unorm can share the same interpolation code.
//! Flat layout is row-major with the first input channel varying slowest:
//! `flat = ((i0·g1 + i1)·g2 + i2 …)·out_ch + c`.
//!
//! Edge policy: inputs are clamped to the grid bounds; out-of-grid inputs
//! return the clamped-face value.

/// Maximum supported channel count for any color or CLUT axis
pub const MAX_CHANNELS: usize = 16;

/// Linear interpolation between two values
///
/// Returns a + t * (b - a) for t in [0, 1]
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Lookup in a 1D table with linear interpolation
///
/// Input is clamped to [0, 1]; the table spans that domain uniformly.
pub fn lut1d_interp(lut: &[f64], input: f64) -> f64 {
    if lut.is_empty() {
        return input;
    }
    if lut.len() == 1 {
        return lut[0];
    }

    let max_idx = (lut.len() - 1) as f64;
    let pos = (input * max_idx).clamp(0.0, max_idx);

    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(lut.len() - 1);
    let t = pos - i0 as f64;

    lerp(lut[i0], lut[i1], t)
}

/// Grid cell coordinates for one input axis
#[inline]
fn grid_cell(x: f64, grid: usize) -> (usize, usize, f64) {
    let max_idx = (grid - 1) as f64;
    let pos = (x * max_idx).clamp(0.0, max_idx);
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(grid - 1);
    (i0, i1, pos - i0 as f64)
}

/// Trilinear interpolation for a 3D CLUT
///
/// `sample(flat)` returns the sample at flat index `flat`; `grid` is the
/// number of grid points per dimension; `out_ch` output channels are
/// written to `out`.
pub fn trilinear_clut<F: Fn(usize) -> f64>(
    sample: F,
    grid: usize,
    out_ch: usize,
    input: [f64; 3],
    out: &mut [f64],
) {
    let (x0, x1, fx) = grid_cell(input[0], grid);
    let (y0, y1, fy) = grid_cell(input[1], grid);
    let (z0, z1, fz) = grid_cell(input[2], grid);

    let idx = |x: usize, y: usize, z: usize, c: usize| ((x * grid + y) * grid + z) * out_ch + c;

    for (c, slot) in out.iter_mut().enumerate().take(out_ch) {
        let c00 = lerp(sample(idx(x0, y0, z0, c)), sample(idx(x1, y0, z0, c)), fx);
        let c10 = lerp(sample(idx(x0, y1, z0, c)), sample(idx(x1, y1, z0, c)), fx);
        let c01 = lerp(sample(idx(x0, y0, z1, c)), sample(idx(x1, y0, z1, c)), fx);
        let c11 = lerp(sample(idx(x0, y1, z1, c)), sample(idx(x1, y1, z1, c)), fx);

        let c0 = lerp(c00, c10, fy);
        let c1 = lerp(c01, c11, fy);
        *slot = lerp(c0, c1, fz);
    }
}

/// Tetrahedral interpolation for a 3D CLUT
///
/// Divides each grid cube into 6 tetrahedra and interpolates within the
/// one containing the input. More accurate than trilinear for color
/// transforms and the method used by most CMM implementations.
pub fn tetrahedral_clut<F: Fn(usize) -> f64>(
    sample: F,
    grid: usize,
    out_ch: usize,
    input: [f64; 3],
    out: &mut [f64],
) {
    let (x0, x1, fx) = grid_cell(input[0], grid);
    let (y0, y1, fy) = grid_cell(input[1], grid);
    let (z0, z1, fz) = grid_cell(input[2], grid);

    let idx = |x: usize, y: usize, z: usize, c: usize| ((x * grid + y) * grid + z) * out_ch + c;

    for (c, slot) in out.iter_mut().enumerate().take(out_ch) {
        let c000 = sample(idx(x0, y0, z0, c));
        let c100 = sample(idx(x1, y0, z0, c));
        let c010 = sample(idx(x0, y1, z0, c));
        let c110 = sample(idx(x1, y1, z0, c));
        let c001 = sample(idx(x0, y0, z1, c));
        let c101 = sample(idx(x1, y0, z1, c));
        let c011 = sample(idx(x0, y1, z1, c));
        let c111 = sample(idx(x1, y1, z1, c));

        // Six tetrahedra keyed by the ordering of the fractional parts
        *slot = if fx > fy {
            if fy > fz {
                c000 + fx * (c100 - c000) + fy * (c110 - c100) + fz * (c111 - c110)
            } else if fx > fz {
                c000 + fx * (c100 - c000) + fz * (c101 - c100) + fy * (c111 - c101)
            } else {
                c000 + fz * (c001 - c000) + fx * (c101 - c001) + fy * (c111 - c101)
            }
        } else if fy > fz {
            if fx > fz {
                c000 + fy * (c010 - c000) + fx * (c110 - c010) + fz * (c111 - c110)
            } else {
                c000 + fy * (c010 - c000) + fz * (c011 - c010) + fx * (c111 - c011)
            }
        } else {
            c000 + fz * (c001 - c000) + fy * (c011 - c001) + fx * (c111 - c011)
        };
    }
}

/// N-linear interpolation for a CLUT of arbitrary dimensionality
///
/// Interpolates over all 2^N corners of the containing grid cell. `grid`
/// gives the number of grid points per input dimension. Used for CLUTs
/// that are not 3-dimensional (CMYK and nChannel devices).
pub fn nlinear_clut<F: Fn(usize) -> f64>(
    sample: F,
    grid: &[usize],
    out_ch: usize,
    input: &[f64],
    out: &mut [f64],
) {
    let dims = grid.len().min(input.len()).min(MAX_CHANNELS);

    let mut lo = [0usize; MAX_CHANNELS];
    let mut hi = [0usize; MAX_CHANNELS];
    let mut frac = [0.0f64; MAX_CHANNELS];

    for d in 0..dims {
        let (i0, i1, f) = grid_cell(input[d], grid[d]);
        lo[d] = i0;
        hi[d] = i1;
        frac[d] = f;
    }

    for slot in out.iter_mut().take(out_ch) {
        *slot = 0.0;
    }

    // Accumulate all 2^N corner contributions
    for corner in 0..(1usize << dims) {
        let mut weight = 1.0;
        let mut flat = 0usize;
        for d in 0..dims {
            let take_hi = corner & (1 << d) != 0;
            weight *= if take_hi { frac[d] } else { 1.0 - frac[d] };
            flat = flat * grid[d] + if take_hi { hi[d] } else { lo[d] };
        }
        if weight == 0.0 {
            continue;
        }
        let base = flat * out_ch;
        for (c, slot) in out.iter_mut().enumerate().take(out_ch) {
            *slot += weight * sample(base + c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn identity_lut3(grid: usize) -> Vec<f64> {
        let mut lut = vec![0.0; grid * grid * grid * 3];
        for r in 0..grid {
            for g in 0..grid {
                for b in 0..grid {
                    let idx = ((r * grid + g) * grid + b) * 3;
                    lut[idx] = r as f64 / (grid - 1) as f64;
                    lut[idx + 1] = g as f64 / (grid - 1) as f64;
                    lut[idx + 2] = b as f64 / (grid - 1) as f64;
                }
            }
        }
        lut
    }

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 1.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((lerp(0.0, 1.0, 1.0) - 1.0).abs() < EPSILON);
        assert!((lerp(2.0, 4.0, 0.25) - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_lut1d() {
        let lut = vec![0.0, 0.5, 1.0];

        assert!((lut1d_interp(&lut, 0.0) - 0.0).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 0.5) - 0.5).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 1.0) - 1.0).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 0.25) - 0.25).abs() < EPSILON);
        // Clamped outside the domain
        assert!((lut1d_interp(&lut, 1.5) - 1.0).abs() < EPSILON);
        assert!((lut1d_interp(&lut, -0.5) - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_identity_lut_3d() {
        let grid = 3;
        let lut = identity_lut3(grid);

        let inputs = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.5, 0.5, 0.5],
            [0.25, 0.5, 0.75],
        ];

        for input in inputs {
            let mut tri = [0.0; 3];
            let mut tet = [0.0; 3];
            trilinear_clut(|i| lut[i], grid, 3, input, &mut tri);
            tetrahedral_clut(|i| lut[i], grid, 3, input, &mut tet);

            for c in 0..3 {
                assert!(
                    (tri[c] - input[c]).abs() < 1e-9,
                    "Trilinear identity failed: {:?} -> {:?}",
                    input,
                    tri
                );
                assert!(
                    (tet[c] - input[c]).abs() < 1e-9,
                    "Tetrahedral identity failed: {:?} -> {:?}",
                    input,
                    tet
                );
            }
        }
    }

    #[test]
    fn test_clamp_to_grid_face() {
        let grid = 3;
        let lut = identity_lut3(grid);

        let mut out = [0.0; 3];
        tetrahedral_clut(|i| lut[i], grid, 3, [1.5, -0.5, 0.5], &mut out);
        assert!((out[0] - 1.0).abs() < 1e-9);
        assert!((out[1] - 0.0).abs() < 1e-9);
        assert!((out[2] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_nlinear_matches_trilinear_for_3d() {
        let grid = 4;
        let mut lut = identity_lut3(grid);
        // Perturb so the grid is not a plane
        for (i, v) in lut.iter_mut().enumerate() {
            *v += (i % 7) as f64 * 0.01;
        }

        let input = [0.3, 0.6, 0.9];
        let mut tri = [0.0; 3];
        let mut nl = [0.0; 3];
        trilinear_clut(|i| lut[i], grid, 3, input, &mut tri);
        nlinear_clut(|i| lut[i], &[grid, grid, grid], 3, &input, &mut nl);

        for c in 0..3 {
            assert!(
                (tri[c] - nl[c]).abs() < 1e-9,
                "N-linear disagrees with trilinear: {:?} vs {:?}",
                nl,
                tri
            );
        }
    }

    #[test]
    fn test_nlinear_4d_identity_diagonal() {
        // 4D identity grid: output = input (4 in, 4 out)
        let grid = 3;
        let n = grid * grid * grid * grid;
        let mut lut = vec![0.0; n * 4];
        for i0 in 0..grid {
            for i1 in 0..grid {
                for i2 in 0..grid {
                    for i3 in 0..grid {
                        let flat = ((i0 * grid + i1) * grid + i2) * grid + i3;
                        let base = flat * 4;
                        lut[base] = i0 as f64 / (grid - 1) as f64;
                        lut[base + 1] = i1 as f64 / (grid - 1) as f64;
                        lut[base + 2] = i2 as f64 / (grid - 1) as f64;
                        lut[base + 3] = i3 as f64 / (grid - 1) as f64;
                    }
                }
            }
        }

        let input = [0.25, 0.5, 0.75, 1.0];
        let mut out = [0.0; 4];
        nlinear_clut(|i| lut[i], &[grid; 4], 4, &input, &mut out);
        for c in 0..4 {
            assert!(
                (out[c] - input[c]).abs() < 1e-9,
                "4D identity failed: {:?} -> {:?}",
                input,
                out
            );
        }
    }
}
