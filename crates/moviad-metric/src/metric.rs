//! The metric abstraction shared by every anomaly-detection metric.

use core::fmt;

use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use crate::{
    curve::RocCurvePoints,
    error::MetricResult,
    f1::F1,
    level::MetricLevel,
    pr_auc::PrAuc,
    pro_auc::ProAuc,
    roc::{RocAuc, RocCurve},
};

/// Result of a metric computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    Scalar(f64),
    Curve(RocCurvePoints),
}

impl MetricValue {
    /// The scalar value, if this is one.
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Curve(_) => None,
        }
    }

    pub const fn as_curve(&self) -> Option<&RocCurvePoints> {
        match self {
            Self::Scalar(_) => None,
            Self::Curve(c) => Some(c),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<RocCurvePoints> for MetricValue {
    fn from(curve: RocCurvePoints) -> Self {
        Self::Curve(curve)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v:.5}"),
            Self::Curve(c) => write!(f, "<curve: {} points>", c.len()),
        }
    }
}

/// A named, level-aware scoring function over ground truth and predictions.
///
/// Metrics are stateless: `compute` never mutates the metric, so one
/// instance can score any number of batches.
pub trait Metric {
    /// What `compute` returns.
    type Output: Into<MetricValue>;

    /// Level the metric was constructed for.
    fn level(&self) -> MetricLevel;

    /// Level-prefixed identifier such as `img_roc_auc`.
    fn name(&self) -> String;

    /// Score `prediction` against `ground_truth`.
    ///
    /// Both tensors must hold the same number of elements. Image-level
    /// metrics expect `[batch]` tensors; pixel-level metrics accept maps
    /// shaped `[batch, 1, height, width]`.
    fn compute<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<Self::Output>;
}

/// Any of the available metrics, for callers that keep heterogeneous lists.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalMetric {
    F1(F1),
    RocAuc(RocAuc),
    RocCurve(RocCurve),
    PrAuc(PrAuc),
    ProAuc(ProAuc),
}

impl Metric for EvalMetric {
    type Output = MetricValue;

    fn level(&self) -> MetricLevel {
        match self {
            Self::F1(m) => m.level(),
            Self::RocAuc(m) => m.level(),
            Self::RocCurve(m) => m.level(),
            Self::PrAuc(m) => m.level(),
            Self::ProAuc(m) => m.level(),
        }
    }

    fn name(&self) -> String {
        match self {
            Self::F1(m) => m.name(),
            Self::RocAuc(m) => m.name(),
            Self::RocCurve(m) => m.name(),
            Self::PrAuc(m) => m.name(),
            Self::ProAuc(m) => m.name(),
        }
    }

    fn compute<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<MetricValue> {
        match self {
            Self::F1(m) => m.compute(ground_truth, prediction).map(Into::into),
            Self::RocAuc(m) => m.compute(ground_truth, prediction).map(Into::into),
            Self::RocCurve(m) => m.compute(ground_truth, prediction).map(Into::into),
            Self::PrAuc(m) => m.compute(ground_truth, prediction).map(Into::into),
            Self::ProAuc(m) => m.compute(ground_truth, prediction).map(Into::into),
        }
    }
}

impl From<F1> for EvalMetric {
    fn from(metric: F1) -> Self {
        Self::F1(metric)
    }
}

impl From<RocAuc> for EvalMetric {
    fn from(metric: RocAuc) -> Self {
        Self::RocAuc(metric)
    }
}

impl From<RocCurve> for EvalMetric {
    fn from(metric: RocCurve) -> Self {
        Self::RocCurve(metric)
    }
}

impl From<PrAuc> for EvalMetric {
    fn from(metric: PrAuc) -> Self {
        Self::PrAuc(metric)
    }
}

impl From<ProAuc> for EvalMetric {
    fn from(metric: ProAuc) -> Self {
        Self::ProAuc(metric)
    }
}
