//! Best achievable F1 score over all thresholds.

use burn::tensor::{backend::Backend, Tensor};

use crate::{
    curve::precision_recall_curve,
    error::MetricResult,
    input::prepare,
    level::MetricLevel,
    metric::Metric,
};

/// Maximum F1 score over every score threshold.
///
/// Thresholds where precision and recall are both zero contribute an F1 of
/// zero rather than NaN. The ground truth must contain both classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct F1 {
    level: MetricLevel,
}

impl F1 {
    pub const fn new(level: MetricLevel) -> Self {
        Self { level }
    }
}

impl Metric for F1 {
    type Output = f64;

    fn level(&self) -> MetricLevel {
        self.level
    }

    fn name(&self) -> String {
        self.level.metric_name("f1")
    }

    fn compute<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<f64> {
        let input = prepare(self.level, ground_truth, prediction)?;
        let curve = precision_recall_curve(&input)?;

        let best = curve
            .precision
            .iter()
            .zip(&curve.recall)
            .map(|(&p, &r)| {
                let b = p + r;
                if b == 0.0 {
                    0.0
                } else {
                    2.0 * p * r / b
                }
            })
            .fold(f64::NEG_INFINITY, f64::max);

        tracing::debug!(metric = %self.name(), samples = input.labels.len(), value = best, "computed");
        Ok(best)
    }
}
