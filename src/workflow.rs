//! End-to-end workflow orchestration.
//!
//! Ties the stages together: project scaffolding, BIDS metadata,
//! preprocessing, MVPA decoding, then the optional visualization and
//! neuron-simulation stages. Optional collaborators are explicit values
//! injected at construction time — there is no process-wide "is backend X
//! available" flag. A missing collaborator produces
//! [`PipelineError::MissingOptionalDependency`], which the orchestrator
//! turns into a logged skip, never into fabricated data.

use std::path::{Path, PathBuf};

use ndarray::s;

use crate::bids::{
    create_project_structure, write_bids_metadata, DatasetDescription, ProjectLayout,
    TaskParameters,
};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::io::{load_dataset, save_dataset};
use crate::mvpa::{flatten_volumes, select_conditions, split_train_test, LinearDecoder};
use crate::neuron::NeuronSimulator;
use crate::provenance::Provenance;
use crate::viz::{
    VisualizationBackend, FIG_GLASS_BRAIN, FIG_NEURON, FIG_SURFACE, FIG_VOLUME, FIG_WEIGHTS,
};
use crate::{standard_pipeline, VolumetricTimeSeries};

/// Duration of the demonstration neuron simulation, in milliseconds.
const NEURON_SIM_MS: f32 = 100.0;

/// Fraction-controlling stride for the deterministic test split
/// (every 3rd selected volume is held out, ≈ 30 %).
const TEST_EVERY: usize = 3;

/// Orchestrates one complete analysis run rooted at a project directory.
pub struct Workflow {
    layout: ProjectLayout,
    conditions: (String, String),
    viz: Option<Box<dyn VisualizationBackend>>,
    neuron: Option<Box<dyn NeuronSimulator>>,
}

/// What one workflow run produced.
#[derive(Debug)]
pub struct WorkflowReport {
    /// Shape of the preprocessed series.
    pub shape: (usize, usize, usize, usize),
    /// Step record of the preprocessing run.
    pub provenance: Provenance,
    /// Path of the preprocessed dataset under `data/derivatives/`.
    pub preprocessed_path: PathBuf,
    /// Decoding accuracy on the held-out volumes, when decoding ran.
    pub accuracy: Option<f32>,
    /// Figure files actually written.
    pub figures: Vec<PathBuf>,
    /// Stages skipped because a collaborator or input was unavailable.
    pub skipped: Vec<&'static str>,
}

impl Workflow {
    /// Create the project structure under `base` and an orchestrator with
    /// no optional collaborators.
    pub fn new(base: &Path) -> Result<Self> {
        let layout = create_project_structure(base)?;
        Ok(Self {
            layout,
            conditions: ("face".into(), "house".into()),
            viz: None,
            neuron: None,
        })
    }

    /// Inject a figure-rendering backend.
    pub fn with_visualization(mut self, backend: Box<dyn VisualizationBackend>) -> Self {
        self.viz = Some(backend);
        self
    }

    /// Inject a neuron simulator.
    pub fn with_neuron_simulator(mut self, sim: Box<dyn NeuronSimulator>) -> Self {
        self.neuron = Some(sim);
        self
    }

    /// Decode a different pair of conditions than the default face/house.
    pub fn with_conditions(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.conditions = (a.into(), b.into());
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Run every stage against the dataset at `dataset_path`.
    ///
    /// Fails on unrecoverable conditions (missing dataset, malformed
    /// container, pipeline error); optional stages that cannot run are
    /// logged and listed in [`WorkflowReport::skipped`].
    pub fn run(&self, dataset_path: &Path, cfg: &PipelineConfig) -> Result<WorkflowReport> {
        let mut skipped = Vec::new();
        let mut figures = Vec::new();

        log::info!("loading dataset from {}", dataset_path.display());
        let (series, labels) = load_dataset(dataset_path)?;

        self.write_metadata(&series)?;

        log::info!(
            "preprocessing {:?} volumes (TR = {} s)",
            series.shape(),
            series.tr()
        );
        let result = standard_pipeline(&series, cfg)?;

        let preproc_dir = self.layout.derivatives_dir.join("preprocessed");
        std::fs::create_dir_all(&preproc_dir)?;
        let preprocessed_path = preproc_dir.join("bold_preprocessed.safetensors");
        save_dataset(&result.series, &labels, &preprocessed_path)?;
        std::fs::write(
            preproc_dir.join("bold_preprocessed.prov.json"),
            result.provenance.to_json(),
        )?;

        // Decoding needs volumes for both conditions; a dataset without them
        // (an unlabelled scan, say) skips the stage. Any failure past that
        // point is a real fault and propagates.
        let keep = [self.conditions.0.as_str(), self.conditions.1.as_str()];
        let decoder = if keep.iter().any(|c| !labels.iter().any(|l| l == c)) {
            log::warn!("skipping decoding stage: no volumes labelled for both of {keep:?}");
            skipped.push("mvpa");
            None
        } else {
            Some(self.decode(&result.series, &labels)?)
        };

        match self.render_figures(&result.series, decoder.as_ref().map(|(d, _)| d)) {
            Ok(mut paths) => figures.append(&mut paths),
            Err(PipelineError::MissingOptionalDependency(name)) => {
                log::warn!("skipping visualization stage: `{name}` unavailable");
                skipped.push("visualization");
            }
            Err(e) => return Err(e),
        }

        match self.simulate_neuron() {
            Ok(Some(path)) => figures.push(path),
            Ok(None) => {}
            Err(PipelineError::MissingOptionalDependency(name)) => {
                log::warn!("skipping neuron stage: `{name}` unavailable");
                skipped.push("neuron");
            }
            Err(e) => return Err(e),
        }

        Ok(WorkflowReport {
            shape: result.series.shape(),
            provenance: result.provenance,
            preprocessed_path,
            accuracy: decoder.map(|(_, a)| a),
            figures,
            skipped,
        })
    }

    fn write_metadata(&self, series: &VolumetricTimeSeries) -> Result<()> {
        let description = DatasetDescription::default();
        let task = TaskParameters {
            repetition_time: series.tr(),
            ..TaskParameters::default()
        };
        let (desc_path, task_path) =
            write_bids_metadata(&self.layout.bids_dir, &description, &task)?;
        log::info!(
            "wrote BIDS metadata: {}, {}",
            desc_path.display(),
            task_path.display()
        );
        Ok(())
    }

    /// Train and score the linear decoder on the two configured conditions.
    fn decode(
        &self,
        series: &VolumetricTimeSeries,
        labels: &[String],
    ) -> Result<(LinearDecoder, f32)> {
        let keep = [self.conditions.0.as_str(), self.conditions.1.as_str()];
        let selected = select_conditions(labels, &keep);
        if selected.is_empty() {
            return Err(PipelineError::invalid_input(format!(
                "no volumes labelled {:?} in the dataset",
                keep
            )));
        }

        let features = flatten_volumes(series);
        let sel_features = features.select(ndarray::Axis(0), &selected);
        let sel_labels: Vec<String> = selected.iter().map(|&i| labels[i].clone()).collect();

        let (train_idx, test_idx) = split_train_test(selected.len(), TEST_EVERY);
        let train_x = sel_features.select(ndarray::Axis(0), &train_idx);
        let train_y: Vec<String> = train_idx.iter().map(|&i| sel_labels[i].clone()).collect();
        let test_x = sel_features.select(ndarray::Axis(0), &test_idx);
        let test_y: Vec<String> = test_idx.iter().map(|&i| sel_labels[i].clone()).collect();

        let decoder = LinearDecoder::train(&train_x, &train_y)?;
        let accuracy = decoder.score(&test_x, &test_y)?;
        log::info!(
            "decoding {} vs {}: accuracy {:.2} on {} held-out volumes",
            keep[0],
            keep[1],
            accuracy,
            test_idx.len()
        );
        Ok((decoder, accuracy))
    }

    /// Render the fixed figure set, or fail with
    /// `MissingOptionalDependency` when no backend is injected.
    fn render_figures(
        &self,
        series: &VolumetricTimeSeries,
        decoder: Option<&LinearDecoder>,
    ) -> Result<Vec<PathBuf>> {
        let viz = self
            .viz
            .as_deref()
            .ok_or(PipelineError::MissingOptionalDependency(
                "visualization backend",
            ))?;
        log::info!("rendering figures with `{}` backend", viz.name());

        let fig_dir = &self.layout.figures_dir;
        let mut written = Vec::new();

        let first_vol = series.data().slice(s![.., .., .., 0]);
        let vol_path = fig_dir.join(FIG_VOLUME);
        viz.render_volume(first_vol, "First fMRI Volume", &vol_path)?;
        written.push(vol_path);

        if let Some(decoder) = decoder {
            let (x, y, z, _) = series.shape();
            let map = decoder.weight_map((x, y, z))?;
            let (neg, pos) = decoder.classes();
            let title = format!("Decoder Weights: {pos} vs {neg}");

            let weights_path = fig_dir.join(FIG_WEIGHTS);
            viz.render_stat_map(map.view(), &title, &weights_path)?;
            written.push(weights_path);

            let glass_path = fig_dir.join(FIG_GLASS_BRAIN);
            viz.render_glass_brain(map.view(), &title, &glass_path)?;
            written.push(glass_path);

            let surface_path = fig_dir.join(FIG_SURFACE);
            viz.render_surface(map.view(), &title, &surface_path)?;
            written.push(surface_path);
        }

        Ok(written)
    }

    /// Run the neuron model and render its trace when both collaborators
    /// are available.
    fn simulate_neuron(&self) -> Result<Option<PathBuf>> {
        let sim = self
            .neuron
            .as_deref()
            .ok_or(PipelineError::MissingOptionalDependency("neuron simulator"))?;
        log::info!("running `{}` for {NEURON_SIM_MS} ms", sim.name());
        let trace = sim.simulate(NEURON_SIM_MS)?;

        let Some(viz) = self.viz.as_deref() else {
            log::info!("neuron trace computed ({} samples), no backend to plot it", trace.len());
            return Ok(None);
        };
        let path = self.layout.figures_dir.join(FIG_NEURON);
        viz.render_trace(&trace, "Membrane Potential", &path)?;
        Ok(Some(path))
    }
}
