//! Run a set of metrics over one evaluation batch.
//!
//! Image-level metrics score the per-image pair, pixel-level metrics the
//! per-pixel pair. Results keep the order of the metric list.

use core::fmt;

use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use crate::{
    error::MetricResult,
    f1::F1,
    level::MetricLevel,
    metric::{EvalMetric, Metric, MetricValue},
    pr_auc::PrAuc,
    pro_auc::ProAuc,
    roc::RocAuc,
};

/// Named metric results, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    entries: Vec<(String, MetricValue)>,
}

impl EvaluationReport {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Look up a result by metric name.
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a scalar result by metric name.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(MetricValue::as_scalar)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

/// Evaluates an ordered list of metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    metrics: Vec<EvalMetric>,
}

impl Default for Evaluator {
    /// The metrics reported for every anomaly-detection run.
    fn default() -> Self {
        Self::new(vec![
            RocAuc::new(MetricLevel::Image).into(),
            RocAuc::new(MetricLevel::Pixel).into(),
            F1::new(MetricLevel::Image).into(),
            F1::new(MetricLevel::Pixel).into(),
            PrAuc::new(MetricLevel::Image).into(),
            PrAuc::new(MetricLevel::Pixel).into(),
            ProAuc::default().into(),
        ])
    }
}

impl Evaluator {
    pub const fn new(metrics: Vec<EvalMetric>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &[EvalMetric] {
        &self.metrics
    }

    /// Score one batch with every metric.
    ///
    /// * `image_gt`, `image_pred` - `[batch]` labels and anomaly scores.
    /// * `pixel_gt`, `pixel_pred` - `[batch, 1, height, width]` masks and anomaly maps.
    ///
    /// # Errors
    /// The first metric failure is returned; no partial report is produced.
    pub fn evaluate<B: Backend>(
        &self,
        image_gt: Tensor<B, 1>,
        image_pred: Tensor<B, 1>,
        pixel_gt: Tensor<B, 4>,
        pixel_pred: Tensor<B, 4>,
    ) -> MetricResult<EvaluationReport> {
        let mut report = EvaluationReport::new();

        for metric in &self.metrics {
            let value = match metric.level() {
                MetricLevel::Image => metric.compute(image_gt.clone(), image_pred.clone())?,
                MetricLevel::Pixel => metric.compute(pixel_gt.clone(), pixel_pred.clone())?,
            };
            report.push(metric.name(), value);
        }

        tracing::info!(metrics = report.len(), "evaluation completed");
        Ok(report)
    }
}
