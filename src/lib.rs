//! # cogneuro — fMRI preprocessing and decoding in pure Rust
//!
//! `cogneuro` implements a cognitive-neuroscience analysis workflow over
//! 4-D functional-MRI time series: a standard preprocessing pipeline,
//! safetensors dataset I/O, BIDS project scaffolding, and a linear MVPA
//! decoder, plus a workflow orchestrator that ties the stages together.
//!
//! ## Pipeline overview
//!
//! ```text
//! dataset.safetensors
//!   │
//!   ├─ io::load_dataset()       [X, Y, Z, T] f32 + affine + TR + labels
//!   ├─ motion correction        realign volumes to volume 0 (pluggable)
//!   ├─ spatial smoothing        separable Gaussian, FWHM in mm
//!   ├─ temporal filtering       zero-phase FIR band-pass along T
//!   │
//!   └─→ PipelineResult { series, provenance }
//! ```
//!
//! The step order is fixed: motion artifacts are corrected before blurring,
//! and frequencies are only meaningful on motion-stabilised, spatially
//! regularised data. Disabled steps are identity transforms recorded as
//! skipped, never silently dropped from the provenance.
//!
//! ## Quick start
//!
//! ```
//! use cogneuro::{standard_pipeline, PipelineConfig, VolumetricTimeSeries};
//! use ndarray::Array4;
//!
//! // A 4×4×4 volume recorded 10 times at TR = 2.5 s.
//! let data = Array4::<f32>::zeros((4, 4, 4, 10));
//! let series = VolumetricTimeSeries::with_identity_affine(data, 2.5);
//!
//! let cfg = PipelineConfig {
//!     spatial_smoothing: true,
//!     fwhm: 6.0,
//!     ..PipelineConfig::default()
//! };
//! let result = standard_pipeline(&series, &cfg).unwrap();
//! assert_eq!(result.series.shape(), (4, 4, 4, 10));
//! assert_eq!(result.provenance.applied_steps(), vec!["spatial_smoothing"]);
//! ```
//!
//! ## Running individual steps
//!
//! Each preprocessing step is also exposed as a standalone function:
//!
//! ```
//! use cogneuro::filter::{design_highpass, filter_time_axis};
//! use cogneuro::smooth::smooth_volumes;
//! use ndarray::Array4;
//!
//! let data = Array4::<f32>::zeros((8, 8, 8, 40));
//!
//! // 6 mm Gaussian on 3 mm isotropic voxels
//! let data = smooth_volumes(&data, 6.0, [3.0, 3.0, 3.0]);
//!
//! // 0.01 Hz high-pass at TR = 2.5 s (sfreq = 0.4 Hz)
//! let h = design_highpass(0.01, 0.4);
//! let mut data = data;
//! filter_time_axis(&mut data, &h).unwrap();
//! ```

pub mod bids;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod motion;
pub mod mvpa;
pub mod neuron;
pub mod provenance;
pub mod series;
pub mod smooth;
pub mod viz;
pub mod workflow;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `cogneuro::Foo` without having to know the internal module layout.

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use io::{load_dataset, save_dataset};
pub use motion::{MotionCorrector, ReferenceAlign, REFERENCE_VOLUME};
pub use provenance::{Provenance, StepRecord};
pub use series::VolumetricTimeSeries;
pub use workflow::{Workflow, WorkflowReport};

/// Output of a successful pipeline run: the transformed series plus an
/// ordered record of every step. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub series: VolumetricTimeSeries,
    pub provenance: Provenance,
}

/// Run the **standard fMRI preprocessing pipeline** with the default
/// (pass-through) motion corrector.
///
/// See [`standard_pipeline_with`] for the full contract.
pub fn standard_pipeline(
    series: &VolumetricTimeSeries,
    cfg: &PipelineConfig,
) -> Result<PipelineResult> {
    standard_pipeline_with(series, cfg, &ReferenceAlign)
}

/// Run the standard preprocessing pipeline with an explicit
/// [`MotionCorrector`].
///
/// # Step order (fixed)
///
/// 1. Motion correction — realign volumes to [`REFERENCE_VOLUME`].
/// 2. Spatial smoothing — isotropic Gaussian of [`PipelineConfig::fwhm`] mm.
/// 3. Temporal filtering — zero-phase FIR band-pass along the time axis.
///
/// # Guarantees
///
/// * The output series has exactly the input's `[X, Y, Z, T]` shape.
/// * Disabled steps are identity transforms, recorded as skipped.
/// * Deterministic: identical input and config give identical output.
/// * Atomic: on error nothing is returned — validation of the series and
///   config happens before any array is allocated.
/// * No filesystem or network access.
///
/// # Errors
///
/// * [`PipelineError::InvalidInput`] — zero temporal volumes, non-positive
///   repetition time, or `low_pass <= high_pass`.
/// * [`PipelineError::UnsupportedParameter`] — negative `fwhm`, a
///   non-positive cutoff, or a cutoff at or above the Nyquist frequency
///   (`1 / (2·TR)`) while temporal filtering is enabled.
pub fn standard_pipeline_with(
    series: &VolumetricTimeSeries,
    cfg: &PipelineConfig,
    corrector: &dyn MotionCorrector,
) -> Result<PipelineResult> {
    cfg.validate()?;
    series.check_processable()?;

    // Filtering parameters are checked against the sampling rate up front
    // so a bad cutoff can never surface after partial work.
    if cfg.temporal_filtering {
        let nyquist = series.sampling_rate() / 2.0;
        for (name, cutoff) in [("high_pass", cfg.high_pass), ("low_pass", cfg.low_pass)] {
            if let Some(f) = cutoff {
                if f >= nyquist {
                    return Err(PipelineError::unsupported(
                        name,
                        f as f64,
                        format!("cutoff must lie below the Nyquist frequency ({nyquist} Hz)"),
                    ));
                }
            }
        }
    }

    let mut data = series.data().clone();
    let mut prov = Provenance::default();

    // 1. Motion correction.
    if cfg.motion_correction {
        log::debug!(
            "motion correction ({}) against volume {}",
            corrector.name(),
            REFERENCE_VOLUME
        );
        data = corrector.realign(&data, REFERENCE_VOLUME)?;
        prov.push(StepRecord::MotionCorrection {
            applied: true,
            reference: Some(REFERENCE_VOLUME),
        });
    } else {
        prov.push(StepRecord::MotionCorrection {
            applied: false,
            reference: None,
        });
    }

    // 2. Spatial smoothing.
    if cfg.spatial_smoothing {
        log::debug!("spatial smoothing, fwhm = {} mm", cfg.fwhm);
        data = smooth::smooth_volumes(&data, cfg.fwhm, series.voxel_sizes());
        prov.push(StepRecord::SpatialSmoothing {
            applied: true,
            fwhm: Some(cfg.fwhm),
        });
    } else {
        prov.push(StepRecord::SpatialSmoothing {
            applied: false,
            fwhm: None,
        });
    }

    // 3. Temporal filtering. With neither cutoff set there is no kernel to
    // apply, so the step is recorded as skipped.
    if cfg.temporal_filtering && (cfg.high_pass.is_some() || cfg.low_pass.is_some()) {
        let sfreq = series.sampling_rate();
        log::debug!(
            "temporal filtering, high_pass = {:?}, low_pass = {:?}, sfreq = {sfreq} Hz",
            cfg.high_pass,
            cfg.low_pass
        );
        if let Some(hp) = cfg.high_pass {
            let h = filter::design_highpass(hp, sfreq);
            filter::filter_time_axis(&mut data, &h)?;
        }
        if let Some(lp) = cfg.low_pass {
            let h = filter::design_lowpass(lp, sfreq);
            filter::filter_time_axis(&mut data, &h)?;
        }
        prov.push(StepRecord::TemporalFiltering {
            applied: true,
            high_pass: cfg.high_pass,
            low_pass: cfg.low_pass,
        });
    } else {
        prov.push(StepRecord::TemporalFiltering {
            applied: false,
            high_pass: None,
            low_pass: None,
        });
    }

    Ok(PipelineResult {
        series: series.with_data(data),
        provenance: prov,
    })
}
