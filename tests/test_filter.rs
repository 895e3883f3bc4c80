use cogneuro::filter::{design_highpass, design_lowpass, filter_1d};

// ── Spectral behaviour at fMRI sampling rates ─────────────────────────────────

#[test]
fn high_pass_attenuates_stop_band_keeps_pass_band() {
    // TR = 1 s → sfreq 1 Hz. Mix a 0.002 Hz drift (deep in the stop band)
    // with a 0.05 Hz oscillation (pass band) and high-pass at 0.01 Hz.
    let sfreq = 1.0_f32;
    let n = 2048;
    let x: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f32 / sfreq;
            (2.0 * std::f32::consts::PI * 0.002 * t).sin()
                + (2.0 * std::f32::consts::PI * 0.05 * t).sin()
        })
        .collect();

    let h = design_highpass(0.01, sfreq);
    let y = filter_1d(&x, &h).unwrap();
    assert_eq!(y.len(), x.len());

    // Skip the transient region on both sides.
    let guard = h.len();
    let interior = &y[guard..y.len() - guard];
    let rms = (interior.iter().map(|v| v * v).sum::<f32>() / interior.len() as f32).sqrt();

    // A clean 0.05 Hz sine has RMS 1/√2 ≈ 0.707; the drift should be gone.
    assert!(rms > 0.55, "pass band attenuated: rms = {rms:.3}");
    assert!(rms < 0.85, "stop band survived: rms = {rms:.3}");
}

#[test]
fn low_pass_attenuates_fast_oscillation() {
    let sfreq = 0.4_f32; // TR = 2.5 s
    let n = 4096;
    // 0.19 Hz sits just under Nyquist (0.2 Hz), well past the transition
    // band of a 0.1 Hz low-pass.
    let x: Vec<f32> = (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * 0.19 * (i as f32 / sfreq)).sin())
        .collect();

    let h = design_lowpass(0.1, sfreq);
    let y = filter_1d(&x, &h).unwrap();

    let guard = h.len();
    let interior = &y[guard..y.len() - guard];
    let rms = (interior.iter().map(|v| v * v).sum::<f32>() / interior.len() as f32).sqrt();
    assert!(rms < 0.2, "0.19 Hz not attenuated: rms = {rms:.3}");
}

#[test]
fn near_nyquist_low_pass_still_attenuates() {
    // A 0.15 Hz cutoff at sfreq 0.4 Hz leaves only 0.05 Hz of room before
    // Nyquist, narrower than the default transition band. The design must
    // squeeze the transition into that room rather than alias; a 0.19 Hz
    // tone (RMS ≈ 0.707) has to come out attenuated.
    let sfreq = 0.4_f32;
    let n = 4096;
    let x: Vec<f32> = (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * 0.19 * (i as f32 / sfreq)).sin())
        .collect();

    let h = design_lowpass(0.15, sfreq);
    let y = filter_1d(&x, &h).unwrap();

    let guard = h.len();
    let interior = &y[guard..y.len() - guard];
    let rms = (interior.iter().map(|v| v * v).sum::<f32>() / interior.len() as f32).sqrt();
    assert!(rms < 0.35, "0.19 Hz not attenuated: rms = {rms:.3}");
}

#[test]
fn band_pass_composition_preserves_length() {
    let sfreq = 0.4_f32;
    let x: Vec<f32> = (0..600).map(|i| (i as f32 * 0.37).sin()).collect();
    let hp = design_highpass(0.01, sfreq);
    let lp = design_lowpass(0.1, sfreq);
    let y = filter_1d(&filter_1d(&x, &hp).unwrap(), &lp).unwrap();
    assert_eq!(y.len(), x.len());
}

#[test]
fn empty_signal_stays_empty() {
    let h = design_highpass(0.01, 0.4);
    assert!(filter_1d(&[], &h).unwrap().is_empty());
}
