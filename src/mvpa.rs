//! Multivariate pattern analysis: linear decoding of two perceptual
//! conditions from per-volume activity patterns.
//!
//! Volumes are flattened to feature vectors, standardised per feature, and
//! separated with a class-centroid linear discriminant. Training is
//! deterministic — no random state anywhere — so a decoder trained twice on
//! the same data is identical.

use ndarray::{s, Array1, Array2, Array3, ArrayView1, Axis};

use crate::error::{PipelineError, Result};
use crate::series::VolumetricTimeSeries;

/// Flatten a series into `[T, voxels]` feature vectors, one row per volume.
pub fn flatten_volumes(series: &VolumetricTimeSeries) -> Array2<f32> {
    let (x, y, z, t) = series.shape();
    let n_vox = x * y * z;
    let mut out = Array2::zeros((t, n_vox));
    for ti in 0..t {
        let vol = series.data().slice(s![.., .., .., ti]);
        for (j, &v) in vol.iter().enumerate() {
            out[[ti, j]] = v;
        }
    }
    out
}

/// Indices of the volumes whose label is one of `keep`, in temporal order.
pub fn select_conditions(labels: &[String], keep: &[&str]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, l)| keep.contains(&l.as_str()))
        .map(|(i, _)| i)
        .collect()
}

/// Deterministic interleaved split: every `test_every`-th sample goes to
/// the test set, the rest to training.
pub fn split_train_test(n: usize, test_every: usize) -> (Vec<usize>, Vec<usize>) {
    let step = test_every.max(2);
    let (mut train, mut test) = (Vec::new(), Vec::new());
    for i in 0..n {
        if i % step == step - 1 {
            test.push(i);
        } else {
            train.push(i);
        }
    }
    (train, test)
}

/// A trained linear discriminant between two conditions.
///
/// The decision function is `w · z(x) + b`, where `z` standardises each
/// feature with the training-set mean and standard deviation. Positive
/// scores predict the second class (lexicographically larger label).
#[derive(Debug, Clone)]
pub struct LinearDecoder {
    classes: (String, String),
    weights: Array1<f32>,
    bias: f32,
    feat_mean: Array1<f32>,
    feat_std: Array1<f32>,
}

impl LinearDecoder {
    /// Train on `features` (`[n_samples, n_features]`) and one label per
    /// row.
    ///
    /// Fails with [`PipelineError::InvalidInput`] unless the labels hold
    /// exactly two distinct classes and match the feature rows one-to-one.
    pub fn train(features: &Array2<f32>, labels: &[String]) -> Result<Self> {
        let (n, d) = features.dim();
        if labels.len() != n {
            return Err(PipelineError::invalid_input(format!(
                "{} labels for {n} samples",
                labels.len()
            )));
        }
        if n == 0 {
            return Err(PipelineError::invalid_input("no training samples"));
        }

        let mut classes: Vec<&String> = labels.iter().collect();
        classes.sort();
        classes.dedup();
        if classes.len() != 2 {
            return Err(PipelineError::invalid_input(format!(
                "expected exactly 2 classes, got {}",
                classes.len()
            )));
        }
        let (neg, pos) = (classes[0].clone(), classes[1].clone());

        // Per-feature standardisation over the training set. A constant
        // feature gets unit scale so it simply drops out of the contrast.
        let feat_mean = features.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));
        let mut feat_std = features.std_axis(Axis(0), 0.0);
        feat_std.mapv_inplace(|v| if v > 0.0 { v } else { 1.0 });

        let mut centroid_neg = Array1::<f32>::zeros(d);
        let mut centroid_pos = Array1::<f32>::zeros(d);
        let (mut n_neg, mut n_pos) = (0.0_f32, 0.0_f32);
        for (row, label) in features.outer_iter().zip(labels) {
            let z = (&row.to_owned() - &feat_mean) / &feat_std;
            if *label == pos {
                centroid_pos += &z;
                n_pos += 1.0;
            } else {
                centroid_neg += &z;
                n_neg += 1.0;
            }
        }
        if n_neg == 0.0 || n_pos == 0.0 {
            return Err(PipelineError::invalid_input(
                "each class needs at least one sample",
            ));
        }
        centroid_neg /= n_neg;
        centroid_pos /= n_pos;

        let weights = &centroid_pos - &centroid_neg;
        let midpoint = (&centroid_pos + &centroid_neg) / 2.0;
        let bias = -weights.dot(&midpoint);

        Ok(Self {
            classes: (neg, pos),
            weights,
            bias,
            feat_mean,
            feat_std,
        })
    }

    /// Decision value for one feature vector (positive → second class).
    pub fn decision(&self, x: ArrayView1<f32>) -> f32 {
        let z = (&x.to_owned() - &self.feat_mean) / &self.feat_std;
        self.weights.dot(&z) + self.bias
    }

    /// Predicted label for one feature vector.
    pub fn predict(&self, x: ArrayView1<f32>) -> &str {
        if self.decision(x) > 0.0 {
            &self.classes.1
        } else {
            &self.classes.0
        }
    }

    /// Fraction of correctly predicted rows.
    pub fn score(&self, features: &Array2<f32>, labels: &[String]) -> Result<f32> {
        let n = features.nrows();
        if labels.len() != n {
            return Err(PipelineError::invalid_input(format!(
                "{} labels for {n} samples",
                labels.len()
            )));
        }
        if n == 0 {
            return Err(PipelineError::invalid_input("no samples to score"));
        }
        let correct = features
            .outer_iter()
            .zip(labels)
            .filter(|(row, label)| self.predict(row.view()) == label.as_str())
            .count();
        Ok(correct as f32 / n as f32)
    }

    /// The two class labels, in (negative, positive) decision order.
    pub fn classes(&self) -> (&str, &str) {
        (&self.classes.0, &self.classes.1)
    }

    /// Per-feature weight vector in standardised feature space.
    pub fn weights(&self) -> &Array1<f32> {
        &self.weights
    }

    /// Reshape the weight vector back into volumetric space for display as
    /// a discrimination map.
    pub fn weight_map(&self, shape: (usize, usize, usize)) -> Result<Array3<f32>> {
        let (x, y, z) = shape;
        if x * y * z != self.weights.len() {
            return Err(PipelineError::invalid_input(format!(
                "volume shape {shape:?} does not hold {} weights",
                self.weights.len()
            )));
        }
        Array3::from_shape_vec(shape, self.weights.to_vec())
            .map_err(|e| PipelineError::invalid_input(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy_problem() -> (Array2<f32>, Vec<String>) {
        // "face" rows live around (1, 0); "house" rows around (0, 1).
        let features = array![
            [1.0_f32, 0.1],
            [0.9, 0.0],
            [1.1, 0.2],
            [0.0, 1.0],
            [0.1, 0.9],
            [0.2, 1.1],
        ];
        let labels = ["face", "face", "face", "house", "house", "house"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        (features, labels)
    }

    #[test]
    fn separable_problem_scores_perfectly() {
        let (features, labels) = toy_problem();
        let clf = LinearDecoder::train(&features, &labels).unwrap();
        approx::assert_abs_diff_eq!(
            clf.score(&features, &labels).unwrap(),
            1.0,
            epsilon = 1e-6_f32
        );
    }

    #[test]
    fn predicts_both_classes() {
        let (features, labels) = toy_problem();
        let clf = LinearDecoder::train(&features, &labels).unwrap();
        assert_eq!(clf.predict(array![1.0_f32, 0.0].view()), "face");
        assert_eq!(clf.predict(array![0.0_f32, 1.0].view()), "house");
    }

    #[test]
    fn training_is_deterministic() {
        let (features, labels) = toy_problem();
        let a = LinearDecoder::train(&features, &labels).unwrap();
        let b = LinearDecoder::train(&features, &labels).unwrap();
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn single_class_is_rejected() {
        let features = array![[1.0_f32, 0.0], [0.9, 0.1]];
        let labels = vec!["face".to_string(), "face".to_string()];
        assert!(matches!(
            LinearDecoder::train(&features, &labels),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn weight_map_needs_matching_shape() {
        let (features, labels) = toy_problem();
        let clf = LinearDecoder::train(&features, &labels).unwrap();
        assert!(clf.weight_map((1, 1, 2)).is_ok());
        assert!(clf.weight_map((2, 2, 2)).is_err());
    }

    #[test]
    fn interleaved_split_is_disjoint_and_complete() {
        let (train, test) = split_train_test(10, 3);
        assert_eq!(test, vec![2, 5, 8]);
        assert_eq!(train.len() + test.len(), 10);
        assert!(train.iter().all(|i| !test.contains(i)));
    }

    #[test]
    fn condition_selection_keeps_order() {
        let labels: Vec<String> = ["rest", "face", "house", "face"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(select_conditions(&labels, &["face", "house"]), vec![1, 2, 3]);
    }
}
