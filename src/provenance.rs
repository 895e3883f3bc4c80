//! Step provenance: an ordered record of what the pipeline did.
//!
//! Every run produces exactly one entry per pipeline step, in execution
//! order, whether the step ran or not. Disabled steps are recorded as
//! skipped rather than omitted, so downstream tooling can always rely on a
//! three-entry record.

use serde::Serialize;

/// One entry per pipeline step, tagged with the parameters actually used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepRecord {
    MotionCorrection {
        applied: bool,
        /// Index of the reference volume, present only when applied.
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<usize>,
    },
    SpatialSmoothing {
        applied: bool,
        /// Kernel FWHM in mm, present only when applied.
        #[serde(skip_serializing_if = "Option::is_none")]
        fwhm: Option<f32>,
    },
    TemporalFiltering {
        applied: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        high_pass: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        low_pass: Option<f32>,
    },
}

impl StepRecord {
    pub fn step_name(&self) -> &'static str {
        match self {
            StepRecord::MotionCorrection { .. } => "motion_correction",
            StepRecord::SpatialSmoothing { .. } => "spatial_smoothing",
            StepRecord::TemporalFiltering { .. } => "temporal_filtering",
        }
    }

    pub fn applied(&self) -> bool {
        match *self {
            StepRecord::MotionCorrection { applied, .. }
            | StepRecord::SpatialSmoothing { applied, .. }
            | StepRecord::TemporalFiltering { applied, .. } => applied,
        }
    }
}

/// Ordered log of every pipeline step for one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Provenance {
    steps: Vec<StepRecord>,
}

impl Provenance {
    pub(crate) fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Names of the steps that actually ran, in order.
    pub fn applied_steps(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|s| s.applied())
            .map(StepRecord::step_name)
            .collect()
    }

    /// Pretty-printed JSON, suitable for a sidecar file next to the output
    /// dataset.
    pub fn to_json(&self) -> String {
        // Serialization of these plain enums cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_steps_stay_in_the_record() {
        let mut prov = Provenance::default();
        prov.push(StepRecord::MotionCorrection {
            applied: false,
            reference: None,
        });
        prov.push(StepRecord::SpatialSmoothing {
            applied: true,
            fwhm: Some(6.0),
        });
        prov.push(StepRecord::TemporalFiltering {
            applied: false,
            high_pass: None,
            low_pass: None,
        });
        assert_eq!(prov.steps().len(), 3);
        assert_eq!(prov.applied_steps(), vec!["spatial_smoothing"]);
    }

    #[test]
    fn json_tags_each_step() {
        let mut prov = Provenance::default();
        prov.push(StepRecord::TemporalFiltering {
            applied: true,
            high_pass: Some(0.01),
            low_pass: Some(0.1),
        });
        let json = prov.to_json();
        assert!(json.contains("\"step\": \"temporal_filtering\""), "{json}");
        assert!(json.contains("0.01"), "{json}");
    }

    #[test]
    fn skipped_params_are_omitted_from_json() {
        let mut prov = Provenance::default();
        prov.push(StepRecord::SpatialSmoothing {
            applied: false,
            fwhm: None,
        });
        assert!(!prov.to_json().contains("fwhm"));
    }
}
