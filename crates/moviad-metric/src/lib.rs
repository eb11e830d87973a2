//! # MoViAD Metrics
//!
//! Image- and pixel-level metrics for evaluating anomaly detectors.
//!
//! Every metric implements [`Metric`]: it is constructed for a
//! [`MetricLevel`] and scores a prediction tensor against a ground-truth
//! tensor. Image-level metrics take one score per image, pixel-level metrics
//! take full anomaly maps and flatten them before scoring.
//!
//! | Metric | Name | Levels |
//! |---|---|---|
//! | [`F1`] | `{level}_f1` | image, pixel |
//! | [`RocAuc`] | `{level}_roc_auc` | image, pixel |
//! | [`RocCurve`] | `{level}_fpr_tpr` | image, pixel |
//! | [`PrAuc`] | `{level}_pr_auc` | image, pixel |
//! | [`ProAuc`] | `pxl_au_pro` | pixel |
//!
//! [`Evaluator`] runs a list of metrics over one batch and collects an
//! [`EvaluationReport`].

pub mod curve;
pub mod error;
pub mod evaluator;
pub mod f1;
pub mod input;
pub mod level;
pub mod metric;
pub mod pr_auc;
pub mod pro_auc;
pub mod roc;

pub use curve::RocCurvePoints;
pub use error::{MetricError, MetricResult};
pub use evaluator::{EvaluationReport, Evaluator};
pub use f1::F1;
pub use level::MetricLevel;
pub use metric::{EvalMetric, Metric, MetricValue};
pub use pr_auc::PrAuc;
pub use pro_auc::{OverlapAveraging, ProAuc, ProAucConfig, ProCurve};
pub use roc::{RocAuc, RocCurve};
