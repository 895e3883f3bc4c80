//! Visualization collaborator interface.
//!
//! Figure rendering is delegated to an injected backend; this crate only
//! defines the surface and the fixed artifact filenames the workflow uses.
//! Absent backend means the visualization stage is skipped, never faked.

use ndarray::ArrayView3;
use std::path::Path;

use crate::error::Result;
use crate::neuron::NeuronTrace;

/// Fixed figure filenames written into `results/figures/`.
pub const FIG_VOLUME: &str = "fmri_volume.png";
pub const FIG_WEIGHTS: &str = "svm_weights.png";
pub const FIG_GLASS_BRAIN: &str = "glass_brain.png";
pub const FIG_SURFACE: &str = "surface_proj.png";
pub const FIG_NEURON: &str = "hh_model.png";

/// Renders brain volumes, discrimination maps, and traces to image files.
///
/// Each method writes one artifact to `path` and returns only after the
/// file exists on disk.
pub trait VisualizationBackend {
    /// Human-readable backend name recorded in logs.
    fn name(&self) -> &'static str;

    /// Render a single 3-D volume (e.g. the first acquired volume).
    fn render_volume(&self, volume: ArrayView3<f32>, title: &str, path: &Path) -> Result<()>;

    /// Render a statistical map (decoder weights back-projected into
    /// volumetric space) as a slice mosaic.
    fn render_stat_map(&self, map: ArrayView3<f32>, title: &str, path: &Path) -> Result<()>;

    /// Render a glass-brain style maximum-intensity projection of a map.
    fn render_glass_brain(&self, map: ArrayView3<f32>, title: &str, path: &Path) -> Result<()>;

    /// Render a cortical-surface projection of a map.
    fn render_surface(&self, map: ArrayView3<f32>, title: &str, path: &Path) -> Result<()>;

    /// Render a membrane-potential trace.
    fn render_trace(&self, trace: &NeuronTrace, title: &str, path: &Path) -> Result<()>;
}
