//! Isotropic Gaussian spatial smoothing.
//!
//! The 3-D Gaussian is separable, so each volume is convolved with a 1-D
//! kernel along each spatial axis in turn. Time points are independent:
//! the temporal axis is never mixed. The kernel FWHM is given in
//! millimetres and converted per axis using the voxel size from the affine.

use ndarray::{Array4, ArrayView1, Axis};

/// FWHM → standard deviation: FWHM = 2·sqrt(2·ln 2)·σ.
const FWHM_TO_SIGMA: f32 = 2.354_820_1;

/// Kernel support, in standard deviations, on each side of the centre.
const TRUNCATE: f32 = 4.0;

/// Smooth every volume of `data` ([X, Y, Z, T]) with an isotropic Gaussian
/// of `fwhm_mm`, given the voxel size along each spatial axis.
///
/// Output shape equals input shape. `fwhm_mm == 0` returns an unmodified
/// copy.
pub fn smooth_volumes(data: &Array4<f32>, fwhm_mm: f32, voxel_sizes_mm: [f32; 3]) -> Array4<f32> {
    let mut out = data.clone();
    for (axis, &vox) in voxel_sizes_mm.iter().enumerate() {
        let sigma_vox = if vox > 0.0 {
            fwhm_mm / FWHM_TO_SIGMA / vox
        } else {
            0.0
        };
        let kernel = gaussian_kernel(sigma_vox);
        if kernel.len() == 1 {
            continue;
        }
        // Lanes along a spatial axis hold every (other-spatial, t) index
        // fixed, so each time point is smoothed independently.
        for mut lane in out.lanes_mut(Axis(axis)) {
            let x = lane.to_vec();
            let y = convolve_reflect(&x, &kernel);
            lane.assign(&ArrayView1::from(&y));
        }
    }
    out
}

/// Normalised 1-D Gaussian kernel for `sigma` (in voxels), truncated at
/// [`TRUNCATE`] standard deviations. Returns `[1.0]` when sigma is too
/// small to spread beyond the centre voxel.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (TRUNCATE * sigma).ceil() as i64;
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }
    let denom = 2.0 * (sigma as f64) * (sigma as f64);
    let mut k: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i as f64) * (i as f64) / denom).exp())
        .collect();
    let sum: f64 = k.iter().sum();
    k.iter_mut().for_each(|v| *v /= sum);
    k.into_iter().map(|v| v as f32).collect()
}

/// Convolve `x` with an odd-length `kernel`, reflecting at the boundaries
/// (`x[-1] → x[0]`-mirrored, no edge repetition). Output length equals
/// input length.
pub fn convolve_reflect(x: &[f32], kernel: &[f32]) -> Vec<f32> {
    let n = x.len() as i64;
    if n == 0 {
        return vec![];
    }
    let radius = (kernel.len() / 2) as i64;
    (0..n)
        .map(|i| {
            let mut acc = 0.0_f64;
            for (j, &k) in kernel.iter().enumerate() {
                let idx = reflect_index(i + j as i64 - radius, n);
                acc += x[idx] as f64 * k as f64;
            }
            acc as f32
        })
        .collect()
}

/// Map an out-of-range index into [0, n) by mirror reflection.
fn reflect_index(mut i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    // Repeat until in range; a kernel wider than the signal may need
    // several bounces.
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - 1 - i;
        } else {
            return i as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(1.7);
        let s: f32 = k.iter().sum();
        approx::assert_abs_diff_eq!(s, 1.0, epsilon = 1e-5_f32);
        let n = k.len();
        assert_eq!(n % 2, 1);
        for i in 0..n / 2 {
            approx::assert_abs_diff_eq!(k[i], k[n - 1 - i], epsilon = 1e-7_f32);
        }
    }

    #[test]
    fn zero_sigma_is_identity_kernel() {
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
    }

    #[test]
    fn constant_volume_unchanged() {
        let data = Array4::from_elem((5, 5, 5, 3), 2.5_f32);
        let out = smooth_volumes(&data, 6.0, [3.0, 3.0, 3.0]);
        for &v in out.iter() {
            approx::assert_abs_diff_eq!(v, 2.5, epsilon = 1e-4_f32);
        }
    }

    #[test]
    fn impulse_spreads_but_mass_is_conserved() {
        let mut data = Array4::zeros((9, 9, 9, 1));
        data[[4, 4, 4, 0]] = 1.0_f32;
        let out = smooth_volumes(&data, 4.0, [2.0, 2.0, 2.0]);
        assert!(out[[4, 4, 4, 0]] < 1.0);
        assert!(out[[4, 4, 3, 0]] > 0.0);
        let total: f32 = out.iter().sum();
        approx::assert_abs_diff_eq!(total, 1.0, epsilon = 1e-3_f32);
    }

    #[test]
    fn time_points_do_not_mix() {
        // Volume 0 is an impulse, volume 1 is all zero: smoothing must not
        // leak signal across the temporal axis.
        let mut data = Array4::zeros((7, 7, 7, 2));
        data[[3, 3, 3, 0]] = 1.0_f32;
        let out = smooth_volumes(&data, 6.0, [3.0, 3.0, 3.0]);
        for &v in out.index_axis(ndarray::Axis(3), 1).iter() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn reflect_index_bounces() {
        assert_eq!(reflect_index(-1, 5), 0);
        assert_eq!(reflect_index(-2, 5), 1);
        assert_eq!(reflect_index(5, 5), 4);
        assert_eq!(reflect_index(6, 5), 3);
    }
}
