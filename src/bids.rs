//! BIDS project scaffolding and metadata documents.
//!
//! Only the directory layout and the two fixed-key metadata records are
//! produced here; validating a BIDS tree is the job of external tooling
//! (`bids-validator`), not this crate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// `dataset_description.json` — top-level dataset metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescription {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "BIDSVersion")]
    pub bids_version: String,
    #[serde(rename = "DatasetType")]
    pub dataset_type: String,
    #[serde(rename = "License")]
    pub license: String,
    #[serde(rename = "Authors")]
    pub authors: Vec<String>,
}

impl Default for DatasetDescription {
    fn default() -> Self {
        Self {
            name: "Haxby 2001 Dataset".into(),
            bids_version: "1.6.0".into(),
            dataset_type: "raw".into(),
            license: "CC0".into(),
            authors: vec![
                "Haxby, J.V.".into(),
                "Gobbini, M.I.".into(),
                "Furey, M.L.".into(),
            ],
        }
    }
}

/// Per-task acquisition parameters (`sub-XX_task-YY_bold.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskParameters {
    #[serde(rename = "TaskName")]
    pub task_name: String,
    #[serde(rename = "RepetitionTime")]
    pub repetition_time: f32,
    #[serde(rename = "EchoTime")]
    pub echo_time: f32,
    #[serde(rename = "FlipAngle")]
    pub flip_angle: f32,
    #[serde(rename = "TaskDescription")]
    pub description: String,
}

impl Default for TaskParameters {
    fn default() -> Self {
        Self {
            task_name: "object viewing".into(),
            repetition_time: 2.5,
            echo_time: 0.030,
            flip_angle: 90.0,
            description: "Subjects viewed images of different categories".into(),
        }
    }
}

/// The standard project directory layout rooted at `base`.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub base: PathBuf,
    pub raw_dir: PathBuf,
    pub bids_dir: PathBuf,
    pub derivatives_dir: PathBuf,
    pub code_dir: PathBuf,
    pub figures_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            raw_dir: base.join("data").join("raw"),
            bids_dir: base.join("data").join("bids"),
            derivatives_dir: base.join("data").join("derivatives"),
            code_dir: base.join("code"),
            figures_dir: base.join("results").join("figures"),
        }
    }
}

/// Create the project directory tree, returning the layout handle.
/// Existing directories are left untouched.
pub fn create_project_structure(base: &Path) -> Result<ProjectLayout> {
    let layout = ProjectLayout::new(base);
    for dir in [
        &layout.raw_dir,
        &layout.bids_dir,
        &layout.derivatives_dir,
        &layout.code_dir,
        &layout.figures_dir,
    ] {
        std::fs::create_dir_all(dir)?;
        log::debug!("created directory {}", dir.display());
    }
    Ok(layout)
}

/// Write `dataset_description.json` at the BIDS root and the task sidecar
/// under `sub-01/func/`. Returns the two file paths.
pub fn write_bids_metadata(
    bids_dir: &Path,
    description: &DatasetDescription,
    task: &TaskParameters,
) -> Result<(PathBuf, PathBuf)> {
    let func_dir = bids_dir.join("sub-01").join("func");
    std::fs::create_dir_all(&func_dir)?;
    std::fs::create_dir_all(bids_dir.join("sub-01").join("anat"))?;

    let description_path = bids_dir.join("dataset_description.json");
    write_pretty_json(&description_path, description)?;

    let task_path = func_dir.join("sub-01_task-objectviewing_bold.json");
    write_pretty_json(&task_path, task)?;

    Ok((description_path, task_path))
}

fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| crate::error::PipelineError::Format(e.to_string()))?;
    std::fs::write(path, json + "\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_description_uses_bids_key_spelling() {
        let json = serde_json::to_string(&DatasetDescription::default()).unwrap();
        for key in ["\"Name\"", "\"BIDSVersion\"", "\"DatasetType\"", "\"License\"", "\"Authors\""]
        {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn task_parameters_round_trip() {
        let task = TaskParameters::default();
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"RepetitionTime\":2.5"), "{json}");
        let back: TaskParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }
}
