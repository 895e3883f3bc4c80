//! 4-D volumetric time series: the unit of data every pipeline step
//! consumes and produces.
//!
//! Axes are `[X, Y, Z, T]` — three spatial, one temporal. The affine maps
//! voxel indices to scanner millimetres; the pipeline only needs it for the
//! per-axis voxel size. Instances are immutable: every transformation
//! produces a new series.

use ndarray::{Array2, Array4};

use crate::error::{PipelineError, Result};

/// A 4-D fMRI recording plus its spatial geometry and sampling interval.
#[derive(Debug, Clone)]
pub struct VolumetricTimeSeries {
    data: Array4<f32>,
    affine: Array2<f32>,
    tr: f32,
}

impl VolumetricTimeSeries {
    /// Build a series from raw data, a 4×4 voxel-to-mm affine, and the
    /// repetition time in seconds.
    ///
    /// Fails with [`PipelineError::InvalidInput`] when the affine is not
    /// 4×4. A zero-volume series or non-positive `tr` is representable
    /// (the loader may produce one from a truncated file); the pipeline
    /// rejects it at entry instead.
    pub fn new(data: Array4<f32>, affine: Array2<f32>, tr: f32) -> Result<Self> {
        if affine.dim() != (4, 4) {
            return Err(PipelineError::invalid_input(format!(
                "affine must be 4x4, got {:?}",
                affine.dim()
            )));
        }
        Ok(Self { data, affine, tr })
    }

    /// Convenience constructor with an identity affine (1 mm isotropic voxels).
    pub fn with_identity_affine(data: Array4<f32>, tr: f32) -> Self {
        Self {
            data,
            affine: Array2::eye(4),
            tr,
        }
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn affine(&self) -> &Array2<f32> {
        &self.affine
    }

    /// Repetition time (sampling interval) in seconds.
    pub fn tr(&self) -> f32 {
        self.tr
    }

    /// Sampling rate in Hz (`1 / tr`).
    pub fn sampling_rate(&self) -> f32 {
        1.0 / self.tr
    }

    /// Full `[X, Y, Z, T]` shape.
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        self.data.dim()
    }

    /// Number of acquired volumes (length of the temporal axis).
    pub fn n_volumes(&self) -> usize {
        self.data.dim().3
    }

    /// Number of voxels in a single volume.
    pub fn n_voxels(&self) -> usize {
        let (x, y, z, _) = self.data.dim();
        x * y * z
    }

    /// Voxel size in mm along each spatial axis: the Euclidean norm of the
    /// corresponding affine column.
    pub fn voxel_sizes(&self) -> [f32; 3] {
        let mut sizes = [0.0_f32; 3];
        for (axis, size) in sizes.iter_mut().enumerate() {
            let col = self.affine.column(axis);
            *size = (col[0] * col[0] + col[1] * col[1] + col[2] * col[2]).sqrt();
        }
        sizes
    }

    /// Replace the data array, keeping geometry and sampling interval.
    /// Used by pipeline steps, which are all shape-preserving.
    pub(crate) fn with_data(&self, data: Array4<f32>) -> Self {
        Self {
            data,
            affine: self.affine.clone(),
            tr: self.tr,
        }
    }

    /// Reject series the pipeline cannot process: zero volumes or a
    /// non-positive repetition time.
    pub(crate) fn check_processable(&self) -> Result<()> {
        if self.n_volumes() == 0 {
            return Err(PipelineError::invalid_input(
                "series has 0 temporal volumes",
            ));
        }
        if !(self.tr > 0.0) || !self.tr.is_finite() {
            return Err(PipelineError::invalid_input(format!(
                "repetition time must be positive and finite, got {}",
                self.tr
            )));
        }
        Ok(())
    }
}
