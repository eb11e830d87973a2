//! Area under the precision-recall curve (average precision).

use burn::tensor::{backend::Backend, Tensor};

use crate::{
    curve::{average_precision, precision_recall_curve},
    error::MetricResult,
    input::prepare,
    level::MetricLevel,
    metric::Metric,
};

/// Average precision, the step-interpolated area under the PR curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrAuc {
    level: MetricLevel,
}

impl PrAuc {
    pub const fn new(level: MetricLevel) -> Self {
        Self { level }
    }
}

impl Metric for PrAuc {
    type Output = f64;

    fn level(&self) -> MetricLevel {
        self.level
    }

    fn name(&self) -> String {
        self.level.metric_name("pr_auc")
    }

    fn compute<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<f64> {
        let input = prepare(self.level, ground_truth, prediction)?;
        let value = average_precision(&precision_recall_curve(&input)?);

        tracing::debug!(metric = %self.name(), samples = input.labels.len(), value, "computed");
        Ok(value)
    }
}
