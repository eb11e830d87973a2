//! Input preparation shared by the metrics.
//!
//! Metrics receive Burn tensors and score on the host: ground truth is
//! binarized at 0.5, predictions are read back as `f64`.

use burn::tensor::{backend::Backend, Tensor};
use moviad_util::tensor_to_vec;

use crate::{
    error::{MetricError, MetricResult},
    level::MetricLevel,
};

/// Ground truth values above this are positive.
pub const GROUND_TRUTH_THRESHOLD: f64 = 0.5;

/// Host-side ground truth labels and prediction scores, aligned element-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabels {
    pub labels: Vec<bool>,
    pub scores: Vec<f64>,
}

impl ScoredLabels {
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    pub fn negatives(&self) -> usize {
        self.labels.len() - self.positives()
    }

    /// Fail unless both classes are present.
    pub fn require_both_classes(&self) -> MetricResult<()> {
        let positives = self.positives();
        let negatives = self.labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(MetricError::SingleClass {
                positives,
                negatives,
            });
        }
        Ok(())
    }
}

/// Binarize ground truth values.
pub fn binarize(values: &[f64]) -> Vec<bool> {
    values.iter().map(|&v| v > GROUND_TRUTH_THRESHOLD).collect()
}

/// Bring a ground truth / prediction pair to the host for a given level.
///
/// Pixel-level tensors of any rank are flattened; image-level tensors must
/// already be one score per image.
pub fn prepare<B: Backend, const D: usize>(
    level: MetricLevel,
    ground_truth: Tensor<B, D>,
    prediction: Tensor<B, D>,
) -> MetricResult<ScoredLabels> {
    if !level.flattens() && D != 1 {
        return Err(MetricError::InvalidShape {
            expected: "[batch] for image-level metrics".to_owned(),
            actual: format!("{:?}", ground_truth.dims()),
        });
    }

    let gt = tensor_to_vec(ground_truth)?;
    let scores = tensor_to_vec(prediction)?;
    if gt.len() != scores.len() {
        return Err(MetricError::LengthMismatch {
            ground_truth: gt.len(),
            prediction: scores.len(),
        });
    }

    Ok(ScoredLabels {
        labels: binarize(&gt),
        scores,
    })
}
