/// Shared builders for synthetic volumetric test data.
use cogneuro::VolumetricTimeSeries;
use ndarray::{Array2, Array4};

#[allow(unused)]
/// Deterministic non-trivial series: value varies with every index so
/// identity checks are meaningful.
pub fn make_series(shape: (usize, usize, usize, usize), tr: f32) -> VolumetricTimeSeries {
    let data = Array4::from_shape_fn(shape, |(x, y, z, t)| {
        ((x as f32 * 0.7 + y as f32 * 1.3 + z as f32 * 2.1) * 0.25 + t as f32 * 0.4).sin()
    });
    VolumetricTimeSeries::with_identity_affine(data, tr)
}

#[allow(unused)]
/// Series with 3 mm isotropic voxels (affine scaled by 3).
pub fn make_series_3mm(shape: (usize, usize, usize, usize), tr: f32) -> VolumetricTimeSeries {
    let data = Array4::from_shape_fn(shape, |(x, y, z, t)| {
        (x + 2 * y + 3 * z) as f32 * 0.1 + (t as f32 * 0.9).cos()
    });
    let mut affine = Array2::eye(4);
    for i in 0..3 {
        affine[[i, i]] = 3.0;
    }
    VolumetricTimeSeries::new(data, affine, tr).unwrap()
}

#[allow(unused)]
/// A series whose volumes alternate between a "face" pattern (signal in the
/// first octant) and a "house" pattern (signal in the last octant), with a
/// rest volume every few acquisitions.
pub fn make_labeled_series(
    n_pairs: usize,
    tr: f32,
) -> (VolumetricTimeSeries, Vec<String>) {
    let t = n_pairs * 2;
    let mut data = Array4::zeros((6, 6, 6, t));
    let mut labels = Vec::with_capacity(t);
    for ti in 0..t {
        let face = ti % 2 == 0;
        labels.push(if face { "face".to_string() } else { "house".to_string() });
        // Small deterministic jitter keeps the two classes separable but
        // not identical across repetitions.
        let jitter = 0.05 * (ti as f32 * 1.7).sin();
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    if face {
                        data[[i, j, k, ti]] = 1.0 + jitter;
                    } else {
                        data[[i + 3, j + 3, k + 3, ti]] = 1.0 + jitter;
                    }
                }
            }
        }
    }
    (
        VolumetricTimeSeries::with_identity_affine(data, tr),
        labels,
    )
}

#[allow(unused)]
/// Maximum absolute difference between two 4-D arrays.
pub fn max_abs_diff(a: &Array4<f32>, b: &Array4<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0_f32, f32::max)
}
