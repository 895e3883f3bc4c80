//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter for the standard
//! preprocessing pipeline. Step flags are independent booleans; numeric
//! parameters are validated even when their step is disabled, so an invalid
//! value never lies dormant in a config that later gets a flag flipped on.

use crate::error::{PipelineError, Result};

/// Configuration for the standard fMRI preprocessing pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use cogneuro::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     spatial_smoothing: true,
///     fwhm: 8.0,              // heavier smoothing than the 6 mm default
///     ..PipelineConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Realign every volume to the reference (first) volume before any
    /// other step. See [`crate::motion::MotionCorrector`].
    ///
    /// Default: `false`.
    pub motion_correction: bool,

    /// Convolve each volume with an isotropic Gaussian of FWHM
    /// [`PipelineConfig::fwhm`] millimetres.
    ///
    /// Default: `false`.
    pub spatial_smoothing: bool,

    /// Band-pass filter each voxel's time course between
    /// [`PipelineConfig::high_pass`] and [`PipelineConfig::low_pass`].
    ///
    /// Default: `false`.
    pub temporal_filtering: bool,

    /// Full width at half maximum of the spatial smoothing kernel, in mm.
    /// Must be non-negative and finite; `0.0` makes the smoothing step an
    /// identity while still recording it as applied.
    ///
    /// Default: `6.0` mm.
    pub fwhm: f32,

    /// High-pass cutoff in Hz, removing slow scanner drifts below this
    /// frequency. `None` leaves the low end of the spectrum untouched.
    ///
    /// Default: `Some(0.01)` Hz.
    pub high_pass: Option<f32>,

    /// Low-pass cutoff in Hz, removing fluctuations above this frequency.
    /// `None` leaves the high end of the spectrum untouched. When both
    /// cutoffs are present, `low_pass` must strictly exceed `high_pass`.
    ///
    /// Default: `None`.
    pub low_pass: Option<f32>,
}

impl Default for PipelineConfig {
    /// Every step disabled; 6 mm FWHM and a 0.01 Hz high-pass ready to be
    /// switched on.
    fn default() -> Self {
        Self {
            motion_correction: false,
            spatial_smoothing: false,
            temporal_filtering: false,
            fwhm: 6.0,
            high_pass: Some(0.01),
            low_pass: None,
        }
    }
}

impl PipelineConfig {
    /// Validate every numeric parameter, independent of step flags.
    ///
    /// * `fwhm` out of range → [`PipelineError::UnsupportedParameter`]
    /// * a cutoff that is non-positive or non-finite →
    ///   [`PipelineError::UnsupportedParameter`]
    /// * `low_pass <= high_pass` (both present) →
    ///   [`PipelineError::InvalidInput`] — cutoffs are never swapped or
    ///   clamped on the caller's behalf
    pub fn validate(&self) -> Result<()> {
        if !self.fwhm.is_finite() || self.fwhm < 0.0 {
            return Err(PipelineError::unsupported(
                "fwhm",
                self.fwhm as f64,
                "must be non-negative and finite",
            ));
        }
        if let Some(hp) = self.high_pass {
            if !hp.is_finite() || hp <= 0.0 {
                return Err(PipelineError::unsupported(
                    "high_pass",
                    hp as f64,
                    "cutoff must be positive and finite",
                ));
            }
        }
        if let Some(lp) = self.low_pass {
            if !lp.is_finite() || lp <= 0.0 {
                return Err(PipelineError::unsupported(
                    "low_pass",
                    lp as f64,
                    "cutoff must be positive and finite",
                ));
            }
        }
        if let (Some(hp), Some(lp)) = (self.high_pass, self.low_pass) {
            if lp <= hp {
                return Err(PipelineError::invalid_input(format!(
                    "low_pass ({lp} Hz) must exceed high_pass ({hp} Hz)"
                )));
            }
        }
        Ok(())
    }
}
