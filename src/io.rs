//! Safetensors I/O for volumetric datasets.
//!
//! A dataset file carries three tensors — `bold` `[X, Y, Z, T]` f32,
//! `affine` `[4, 4]` f32, `tr` `[1]` f32 — plus the per-volume condition
//! labels as a JSON array inside the `__metadata__` header entry. The
//! header is parsed and written directly; only raw bytes → ndarray is
//! needed, so no tensor-library types are involved.

use ndarray::{Array2, Array4};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::series::VolumetricTimeSeries;

// ── Low-level safetensors parsing ─────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, Value>, usize)> {
    if bytes.len() < 8 {
        return Err(PipelineError::Format("file too small for a header".into()));
    }
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    if bytes.len() < 8 + n {
        return Err(PipelineError::Format("header length exceeds file".into()));
    }
    let header: HashMap<String, Value> = serde_json::from_slice(&bytes[8..8 + n])
        .map_err(|e| PipelineError::Format(format!("bad header JSON: {e}")))?;
    Ok((header, 8 + n))
}

fn tensor_bytes<'a>(bytes: &'a [u8], data_start: usize, entry: &Value) -> Result<&'a [u8]> {
    let offsets = entry["data_offsets"]
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| PipelineError::Format("missing data_offsets".into()))?;
    let s = offsets[0].as_u64().unwrap_or(0) as usize;
    let e = offsets[1].as_u64().unwrap_or(0) as usize;
    bytes
        .get(data_start + s..data_start + e)
        .ok_or_else(|| PipelineError::Format("tensor offsets out of range".into()))
}

fn read_f32_tensor(bytes: &[u8], data_start: usize, entry: &Value) -> Result<Vec<f32>> {
    let raw = tensor_bytes(bytes, data_start, entry)?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn shape_of(entry: &Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .map(|a| a.iter().map(|v| v.as_u64().unwrap_or(0) as usize).collect())
        .ok_or_else(|| PipelineError::Format("missing tensor shape".into()))
}

// ── Public interface ──────────────────────────────────────────────────────────

/// Load a volumetric dataset plus its per-volume condition labels.
///
/// # Errors
///
/// * [`PipelineError::DataNotFound`] — `path` does not exist.
/// * [`PipelineError::Format`] — the container is malformed, a required
///   tensor is missing, or the label count disagrees with the temporal
///   axis.
pub fn load_dataset(path: &Path) -> Result<(VolumetricTimeSeries, Vec<String>)> {
    if !path.exists() {
        return Err(PipelineError::DataNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let (header, data_start) = parse_header(&bytes)?;

    let bold_entry = header
        .get("bold")
        .ok_or_else(|| PipelineError::Format("missing `bold` tensor".into()))?;
    let shape = shape_of(bold_entry)?;
    if shape.len() != 4 {
        return Err(PipelineError::Format(format!(
            "`bold` must be 4-D, got shape {shape:?}"
        )));
    }
    let bold_vec = read_f32_tensor(&bytes, data_start, bold_entry)?;
    let data = Array4::from_shape_vec((shape[0], shape[1], shape[2], shape[3]), bold_vec)
        .map_err(|e| PipelineError::Format(format!("`bold` shape mismatch: {e}")))?;

    let affine_entry = header
        .get("affine")
        .ok_or_else(|| PipelineError::Format("missing `affine` tensor".into()))?;
    let affine_vec = read_f32_tensor(&bytes, data_start, affine_entry)?;
    let affine = Array2::from_shape_vec((4, 4), affine_vec)
        .map_err(|e| PipelineError::Format(format!("`affine` must be 4x4: {e}")))?;

    let tr_entry = header
        .get("tr")
        .ok_or_else(|| PipelineError::Format("missing `tr` tensor".into()))?;
    let tr = *read_f32_tensor(&bytes, data_start, tr_entry)?
        .first()
        .ok_or_else(|| PipelineError::Format("`tr` tensor is empty".into()))?;

    let labels = read_labels(&header)?;
    if !labels.is_empty() && labels.len() != shape[3] {
        return Err(PipelineError::Format(format!(
            "{} labels for {} volumes",
            labels.len(),
            shape[3]
        )));
    }

    let series = VolumetricTimeSeries::new(data, affine, tr)?;
    Ok((series, labels))
}

fn read_labels(header: &HashMap<String, Value>) -> Result<Vec<String>> {
    let Some(meta) = header.get("__metadata__") else {
        return Ok(vec![]);
    };
    let Some(raw) = meta.get("labels").and_then(Value::as_str) else {
        return Ok(vec![]);
    };
    serde_json::from_str(raw)
        .map_err(|e| PipelineError::Format(format!("bad `labels` metadata: {e}")))
}

/// Write a volumetric dataset (and optional per-volume labels) as a
/// safetensors container readable by [`load_dataset`].
pub fn save_dataset(series: &VolumetricTimeSeries, labels: &[String], path: &Path) -> Result<()> {
    let (x, y, z, t) = series.shape();
    if !labels.is_empty() && labels.len() != t {
        return Err(PipelineError::invalid_input(format!(
            "{} labels for {} volumes",
            labels.len(),
            t
        )));
    }

    // Tensors in write order: (name, le bytes, shape).
    let mut tensors: Vec<(&str, Vec<u8>, Vec<usize>)> = Vec::with_capacity(3);
    tensors.push((
        "bold",
        series.data().iter().flat_map(|v| v.to_le_bytes()).collect(),
        vec![x, y, z, t],
    ));
    tensors.push((
        "affine",
        series
            .affine()
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect(),
        vec![4, 4],
    ));
    tensors.push(("tr", series.tr().to_le_bytes().to_vec(), vec![1]));

    let mut header_map = serde_json::Map::new();
    if !labels.is_empty() {
        let labels_json = serde_json::to_string(labels)
            .map_err(|e| PipelineError::Format(format!("labels not serialisable: {e}")))?;
        header_map.insert(
            "__metadata__".into(),
            serde_json::json!({ "labels": labels_json }),
        );
    }

    let mut offset: usize = 0;
    for (name, data, shape) in &tensors {
        header_map.insert(
            (*name).into(),
            serde_json::json!({
                "dtype": "F32",
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }),
        );
        offset += data.len();
    }

    let hdr_bytes = serde_json::to_vec(&header_map)
        .map_err(|e| PipelineError::Format(format!("header not serialisable: {e}")))?;
    let pad = (8 - hdr_bytes.len() % 8) % 8;
    let padded: Vec<u8> = hdr_bytes
        .into_iter()
        .chain(std::iter::repeat(b' ').take(pad))
        .collect();

    let mut f = std::fs::File::create(path)?;
    f.write_all(&(padded.len() as u64).to_le_bytes())?;
    f.write_all(&padded)?;
    for (_, data, _) in &tensors {
        f.write_all(data)?;
    }
    Ok(())
}
