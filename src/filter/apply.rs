//! Overlap-add zero-phase FIR convolution along the temporal axis.
//!
//! Zero-phase comes from shifting the output left by `(N-1)/2` samples,
//! not from a forward-backward pass. The edge transient is suppressed by
//! reflect-limited padding of `N-1` samples on each side, which degrades to
//! zero padding when the time course is shorter than the kernel.

use crate::error::Result;
use ndarray::{Array4, ArrayView1, Axis};
use rustfft::{num_complex::Complex, FftPlanner};

/// Filter every voxel time course of `data` ([X, Y, Z, T]) in place with
/// the FIR kernel `h` (odd length, as produced by the design functions).
pub fn filter_time_axis(data: &mut Array4<f32>, h: &[f32]) -> Result<()> {
    for mut lane in data.lanes_mut(Axis(3)) {
        let x: Vec<f32> = lane.to_vec();
        let y = filter_1d(&x, h)?;
        lane.assign(&ArrayView1::from(&y));
    }
    Ok(())
}

/// Filter a single 1-D signal with the overlap-add algorithm.
///
/// Returns a vector of the same length as `x`.
pub fn filter_1d(x: &[f32], h: &[f32]) -> Result<Vec<f32>> {
    let n_x = x.len();
    let n_h = h.len();

    if n_x == 0 {
        return Ok(vec![]);
    }

    // Shift for zero-phase: (N-1)/2, N odd.
    let shift = (n_h - 1) / 2;
    // Edge padding (reflect-limited).
    let n_edge = n_h - 1;

    let x_ext = reflect_limited_pad(x, n_edge, n_edge);
    let n_ext = x_ext.len();

    let n_fft = choose_fft_len(n_h, n_ext);
    let h_fft = fft_of_h(h, n_fft);

    // Overlap-add.
    let n_seg = n_fft - n_h + 1;
    let n_segments = n_ext.div_ceil(n_seg);
    let mut x_filtered = vec![0.0_f32; n_ext];

    let mut planner: FftPlanner<f32> = FftPlanner::new();
    let fft_fwd = planner.plan_fft_forward(n_fft);
    let fft_inv = planner.plan_fft_inverse(n_fft);
    let inv_scale = 1.0 / n_fft as f32;

    for seg_idx in 0..n_segments {
        let start = seg_idx * n_seg;
        let stop = (start + n_seg).min(n_ext);

        // Zero-pad segment to n_fft.
        let mut buf: Vec<Complex<f32>> = x_ext[start..stop]
            .iter()
            .map(|&v| Complex { re: v, im: 0.0 })
            .chain(std::iter::repeat(Complex::default()))
            .take(n_fft)
            .collect();

        fft_fwd.process(&mut buf);

        for (b, &hf) in buf.iter_mut().zip(h_fft.iter()) {
            *b *= hf;
        }

        fft_inv.process(&mut buf);

        // Accumulate with overlap-add, accounting for the zero-phase shift.
        let out_start = start.saturating_sub(shift);
        let out_end = (out_start + n_fft).min(n_ext);
        let prod_start = if start < shift { shift - start } else { 0 };

        for (o, p) in (out_start..out_end).zip(prod_start..) {
            if p < buf.len() {
                x_filtered[o] += buf[p].re * inv_scale;
            }
        }
    }

    // Strip edge padding.
    Ok(x_filtered[n_edge..n_edge + n_x].to_vec())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Reflect-limited padding: odd reflection around the boundary samples,
/// zero-filled once the signal is exhausted.
///
/// Left:  `pad[i] = 2·x[0] − x[n_l−i]`   for i in 1..=n_l
/// Right: `pad[i] = 2·x[−1] − x[−(i+1)]` for i in 1..=n_r
fn reflect_limited_pad(x: &[f32], n_l: usize, n_r: usize) -> Vec<f32> {
    let n = x.len();
    let actual_l = n_l.min(n - 1);
    let actual_r = n_r.min(n - 1);

    let mut out = Vec::with_capacity(n_l + n + n_r);

    // Zeros beyond the reflectable range.
    out.resize(n_l - actual_l, 0.0);

    // Left padding (reversed, odd reflection around x[0]).
    for i in (1..=actual_l).rev() {
        out.push(2.0 * x[0] - x[i]);
    }

    out.extend_from_slice(x);

    // Right padding (odd reflection around x[n-1]).
    let last = x[n - 1];
    for i in 1..=actual_r {
        out.push(2.0 * last - x[n - 1 - i]);
    }
    for _ in actual_r..n_r {
        out.push(0.0);
    }

    out
}

/// Choose the FFT block size (power of 2 minimising the operation count).
///
/// Cost model: `ceil(n_x / (N − n_h + 1)) · N · (log2(N) + 1) + 4e-5 · N · n_x`.
fn choose_fft_len(n_h: usize, n_x: usize) -> usize {
    let min_fft = 2 * n_h - 1;

    let max_pow = (n_x as f64).log2().ceil() as u32 + 1;
    let min_pow = (min_fft as f64).log2().ceil() as u32;

    let mut best_n = 1_usize << max_pow;
    let mut best_cost = f64::INFINITY;

    for pow in min_pow..=max_pow {
        let n = 1_usize << pow;
        if n < min_fft {
            continue;
        }
        let n_seg = (n - n_h + 1) as f64;
        let cost = (n_x as f64 / n_seg).ceil() * n as f64 * (pow as f64 + 1.0)
            + 4e-5 * n as f64 * n_x as f64;
        if cost < best_cost {
            best_cost = cost;
            best_n = n;
        }
    }
    best_n
}

/// FFT of `h` zero-padded to `n_fft`.
fn fft_of_h(h: &[f32], n_fft: usize) -> Vec<Complex<f32>> {
    let mut buf: Vec<Complex<f32>> = h
        .iter()
        .map(|&v| Complex { re: v, im: 0.0 })
        .chain(std::iter::repeat(Complex::default()))
        .take(n_fft)
        .collect();
    let mut planner: FftPlanner<f32> = FftPlanner::new();
    planner.plan_fft_forward(n_fft).process(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::design::{design_highpass, design_lowpass};
    use ndarray::Array4;

    #[test]
    fn filter_preserves_length() {
        let x: Vec<f32> = (0..200).map(|i| (i as f32 * 0.3).sin()).collect();
        let h = design_highpass(0.01, 0.4);
        let y = filter_1d(&x, &h).unwrap();
        assert_eq!(y.len(), x.len());
    }

    #[test]
    fn highpass_removes_dc() {
        // A long constant signal goes to ≈ 0 away from the edges.
        let x = vec![1.0_f32; 2048];
        let h = design_highpass(0.01, 0.4);
        let y = filter_1d(&x, &h).unwrap();
        let n_h = h.len();
        let interior = &y[n_h..y.len() - n_h];
        let max_val = interior.iter().map(|v| v.abs()).fold(0.0_f32, f32::max);
        assert!(max_val < 1e-3, "DC not removed: max={max_val}");
    }

    #[test]
    fn lowpass_passes_dc() {
        let x = vec![3.0_f32; 2048];
        let h = design_lowpass(0.1, 0.4);
        let y = filter_1d(&x, &h).unwrap();
        let n_h = h.len();
        for &v in &y[n_h..y.len() - n_h] {
            approx::assert_abs_diff_eq!(v, 3.0, epsilon = 1e-3_f32);
        }
    }

    #[test]
    fn kernel_longer_than_signal_still_preserves_length() {
        // 10 volumes at TR 2.5 s against a 133-tap kernel.
        let x: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let h = design_highpass(0.01, 0.4);
        assert!(h.len() > x.len());
        let y = filter_1d(&x, &h).unwrap();
        assert_eq!(y.len(), 10);
    }

    #[test]
    fn reflect_limited_left_pad() {
        let x = [1.0_f32, 2.0, 3.0, 4.0, 5.0];
        let padded = reflect_limited_pad(&x, 3, 0);
        // 2·1 − x[3] = −2,  2·1 − x[2] = −1,  2·1 − x[1] = 0
        assert_eq!(&padded[..3], &[-2.0_f32, -1.0, 0.0]);
        assert_eq!(&padded[3..], &x[..]);
    }

    #[test]
    fn reflect_limited_pad_zero_fills_past_signal() {
        let x = [1.0_f32, 2.0];
        let padded = reflect_limited_pad(&x, 4, 4);
        assert_eq!(padded.len(), 4 + 2 + 4);
        assert_eq!(padded[0], 0.0);
        assert_eq!(padded[9], 0.0);
    }

    #[test]
    fn time_axis_filter_keeps_shape() {
        let mut data = Array4::from_shape_fn((3, 3, 3, 64), |(x, y, z, t)| {
            ((x + y + z) as f32 + t as f32 * 0.1).sin()
        });
        let h = design_highpass(0.01, 0.4);
        filter_time_axis(&mut data, &h).unwrap();
        assert_eq!(data.dim(), (3, 3, 3, 64));
    }
}
