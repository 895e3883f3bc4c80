//! Windowed-sinc FIR design for the temporal filtering step.
//!
//! For a cutoff at `f` Hz with sampling rate `sfreq` (= 1/TR):
//!   • transition bandwidth = min(max(0.25·f, 2.0), f)
//!   • filter length N      = ceil(3.3 / trans_bw · sfreq), rounded to odd
//!   • Hamming-windowed sinc; high-pass obtained by spectral inversion
//!
//! At fMRI sampling rates (fractions of a Hz) the cutoffs sit far below the
//! 2.0 Hz floor, so the transition bandwidth collapses to the cutoff itself
//! and kernels stay a few hundred taps at most.
use std::f64::consts::PI;

/// Transition bandwidth for a cutoff at `freq` Hz.
///
/// Rule: `min(max(0.25 · freq, 2.0), freq)`.
pub fn auto_trans_bandwidth(freq: f32) -> f32 {
    (0.25 * freq).max(2.0).min(freq)
}

/// Number of FIR taps for a given transition bandwidth, always odd
/// (required for a symmetric zero-phase kernel).
///
/// Formula: `ceil(3.3 / trans_bw · sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f32, sfreq: f32) -> usize {
    let n_raw = (3.3 / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 {
        n_raw + 1
    } else {
        n_raw
    }
}

/// Design a zero-phase high-pass FIR kernel: passes everything above
/// `cutoff_hz`, removing slow drifts.
///
/// Returns the impulse response as `Vec<f32>`, odd length.
pub fn design_highpass(cutoff_hz: f32, sfreq: f32) -> Vec<f32> {
    let trans_bw = auto_trans_bandwidth(cutoff_hz);
    let n = auto_filter_length(trans_bw, sfreq);
    let f_stop = cutoff_hz - trans_bw; // lower stop frequency (Hz)

    // Midpoint of the transition band is the -6 dB point of the sinc.
    let centre_hz = (f_stop + cutoff_hz) / 2.0;
    firwin(n, centre_hz, sfreq, false)
        .into_iter()
        .map(|v| v as f32)
        .collect()
}

/// Design a zero-phase low-pass FIR kernel: passes everything below
/// `cutoff_hz`.
///
/// The caller must keep `cutoff_hz` strictly below Nyquist (`sfreq / 2`).
pub fn design_lowpass(cutoff_hz: f32, sfreq: f32) -> Vec<f32> {
    let nyquist = sfreq / 2.0;
    // The upper transition band may not cross Nyquist, otherwise the sinc
    // centre aliases and the stop band folds back into the pass band.
    let trans_bw = auto_trans_bandwidth(cutoff_hz).min(nyquist - cutoff_hz);
    let n = auto_filter_length(trans_bw, sfreq);
    let f_stop = cutoff_hz + trans_bw; // upper stop frequency (Hz)

    let centre_hz = (cutoff_hz + f_stop) / 2.0;
    firwin(n, centre_hz, sfreq, true)
        .into_iter()
        .map(|v| v as f32)
        .collect()
}

/// Hamming-windowed sinc kernel of odd length `n` with its -6 dB point at
/// `cutoff_hz`.
///
/// `pass_zero = true` keeps the DC component (low-pass); `false` applies
/// spectral inversion to obtain the high-pass complement.
pub fn firwin(n: usize, cutoff_hz: f32, sfreq: f32, pass_zero: bool) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for a linear-phase kernel");
    let alpha = (n - 1) as f64 / 2.0;
    let nyq = sfreq as f64 / 2.0;
    let fc = cutoff_hz as f64 / nyq; // normalised [0, 1]

    let win = hamming(n);

    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            // sin(π·fc·x) / (π·x), with the x→0 limit fc.
            let sinc = if x == 0.0 {
                fc
            } else {
                (PI * fc * x).sin() / (PI * x)
            };
            sinc * win[i]
        })
        .collect();

    // Unit DC gain for the low-pass prototype.
    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);

    if !pass_zero {
        // Spectral inversion: highpass = delta[N/2] - lowpass.
        h.iter_mut().for_each(|v| *v = -*v);
        h[n / 2] += 1.0;
    }

    h
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_length_is_odd() {
        for freq in [0.01_f32, 0.05, 0.1] {
            let tb = auto_trans_bandwidth(freq);
            let n = auto_filter_length(tb, 0.4);
            assert!(n % 2 == 1, "N={n} is even for freq={freq}");
        }
    }

    #[test]
    fn highpass_sum_near_zero() {
        // A high-pass kernel sums to ≈ 0: no DC passes.
        let h = design_highpass(0.01, 0.4);
        let s: f32 = h.iter().sum();
        assert!(s.abs() < 1e-5, "highpass sum = {s}");
    }

    #[test]
    fn lowpass_dc_gain_unity() {
        let h = design_lowpass(0.1, 0.4);
        let dc: f32 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 1.0, epsilon = 1e-6_f32);
    }

    #[test]
    fn kernels_are_symmetric() {
        for h in [design_highpass(0.01, 0.4), design_lowpass(0.1, 0.4)] {
            let n = h.len();
            for i in 0..n / 2 {
                approx::assert_abs_diff_eq!(h[i], h[n - 1 - i], epsilon = 1e-7_f32);
            }
        }
    }

    #[test]
    fn near_nyquist_lowpass_rejects_at_nyquist() {
        // Cutoff at 3/4 of Nyquist: the default transition band would reach
        // 0.30 Hz, past Nyquist (0.2 Hz). The clamped design must still
        // attenuate at the band edge instead of aliasing.
        let h = design_lowpass(0.15, 0.4);
        let alpha = h.len() / 2;
        // Zero-phase response at Nyquist: H(f_nyq) = Σ h[k]·(-1)^k.
        let gain: f32 = h
            .iter()
            .enumerate()
            .map(|(k, &v)| if (k as isize - alpha as isize) % 2 == 0 { v } else { -v })
            .sum();
        assert!(gain.abs() < 0.05, "gain at Nyquist = {gain}");
    }

    #[test]
    fn fmri_rate_kernel_stays_small() {
        // 0.01 Hz cutoff at TR = 2.5 s: tb = 0.01 → N = ceil(3.3/0.01·0.4) = 132 → 133.
        let h = design_highpass(0.01, 0.4);
        assert_eq!(h.len(), 133);
    }
}
