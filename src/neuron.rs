//! Biophysical neuron simulation interface.
//!
//! The workflow can render a textbook membrane-potential trace at the end
//! of a run, but solving the underlying differential equations is delegated
//! entirely to an external ODE facility. This module defines only the
//! collaborator surface; when no simulator is injected the stage is skipped
//! with [`crate::error::PipelineError::MissingOptionalDependency`].

use crate::error::Result;

/// A time-sampled membrane-potential trace.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronTrace {
    /// Sample times in milliseconds, strictly increasing.
    pub time_ms: Vec<f32>,
    /// Membrane potential in millivolts, one value per sample time.
    pub membrane_mv: Vec<f32>,
}

impl NeuronTrace {
    pub fn len(&self) -> usize {
        self.time_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_ms.is_empty()
    }
}

/// An external ODE-backed neuron model (e.g. Hodgkin–Huxley).
///
/// Implementations advance the biophysical state (membrane potential and
/// gating variables) for `duration_ms` and return the sampled trace.
pub trait NeuronSimulator {
    /// Human-readable model name recorded in logs.
    fn name(&self) -> &'static str;

    /// Run the model for `duration_ms` milliseconds.
    fn simulate(&self, duration_ms: f32) -> Result<NeuronTrace>;
}
