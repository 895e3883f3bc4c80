//! Motion correction stage.
//!
//! Realignment registers every volume to a fixed reference volume (by
//! convention the first) to compensate for head movement. The stage is
//! pluggable: the pipeline accepts any [`MotionCorrector`], and the bundled
//! [`ReferenceAlign`] is a shape-preserving pass-through that keeps the
//! stage's position in the step order and its provenance entry. A rigid-body
//! registration can be dropped in without touching the pipeline.

use ndarray::Array4;

use crate::error::Result;

/// Index of the reference volume every other volume is aligned to.
pub const REFERENCE_VOLUME: usize = 0;

/// A realignment algorithm: consumes a 4-D series, returns one of identical
/// shape with every volume registered to `data[.., reference]`.
pub trait MotionCorrector {
    /// Human-readable name recorded in logs.
    fn name(&self) -> &'static str;

    /// Realign `data` to its `reference` volume. Must preserve shape.
    fn realign(&self, data: &Array4<f32>, reference: usize) -> Result<Array4<f32>>;
}

/// Default realignment stage.
///
/// Estimating and resampling rigid-body motion is left to a plugged-in
/// corrector; this default passes the data through unchanged so the step
/// order and provenance contract hold regardless of which corrector is
/// installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceAlign;

impl MotionCorrector for ReferenceAlign {
    fn name(&self) -> &'static str {
        "reference-align"
    }

    fn realign(&self, data: &Array4<f32>, _reference: usize) -> Result<Array4<f32>> {
        Ok(data.clone())
    }
}
