//! ROC-based metrics: the area under the ROC curve and the curve itself.

use burn::tensor::{backend::Backend, Tensor};
use moviad_util::trapezoid_auc;

use crate::{
    curve::{roc_curve, RocCurvePoints},
    error::MetricResult,
    input::prepare,
    level::MetricLevel,
    metric::Metric,
};

/// Area under the ROC curve.
///
/// Ties between scores are counted half, which makes the value equal to the
/// probability that a random positive outranks a random negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RocAuc {
    level: MetricLevel,
}

impl RocAuc {
    pub const fn new(level: MetricLevel) -> Self {
        Self { level }
    }
}

impl Metric for RocAuc {
    type Output = f64;

    fn level(&self) -> MetricLevel {
        self.level
    }

    fn name(&self) -> String {
        self.level.metric_name("roc_auc")
    }

    fn compute<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<f64> {
        let input = prepare(self.level, ground_truth, prediction)?;
        let roc = roc_curve(&input)?;
        let value = trapezoid_auc(&roc.fpr, &roc.tpr)?;

        tracing::debug!(metric = %self.name(), samples = input.labels.len(), value, "computed");
        Ok(value)
    }
}

/// The ROC curve as false and true positive rate sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RocCurve {
    level: MetricLevel,
}

impl RocCurve {
    pub const fn new(level: MetricLevel) -> Self {
        Self { level }
    }
}

impl Metric for RocCurve {
    type Output = RocCurvePoints;

    fn level(&self) -> MetricLevel {
        self.level
    }

    fn name(&self) -> String {
        self.level.metric_name("fpr_tpr")
    }

    fn compute<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<RocCurvePoints> {
        let input = prepare(self.level, ground_truth, prediction)?;
        let roc = roc_curve(&input)?;

        tracing::debug!(metric = %self.name(), points = roc.len(), "computed");
        Ok(roc)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::tensor::TensorData;
    use rstest::*;

    use super::*;
    use crate::{tests::TestBackend, MetricError};

    fn image_tensors(gt: &[f32], pred: &[f32]) -> (Tensor<TestBackend, 1>, Tensor<TestBackend, 1>) {
        let device = Default::default();
        (
            Tensor::from_data(TensorData::new(gt.to_vec(), [gt.len()]), &device),
            Tensor::from_data(TensorData::new(pred.to_vec(), [pred.len()]), &device),
        )
    }

    #[rstest]
    #[case(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.2, 0.8, 0.9], 1.0)]
    #[case(&[0.0, 0.0, 1.0, 1.0], &[0.9, 0.8, 0.2, 0.1], 0.0)]
    #[case(&[0.0, 0.0, 1.0, 1.0], &[0.1, 0.4, 0.35, 0.8], 0.75)]
    #[case(&[0.0, 1.0, 0.0, 1.0], &[0.5, 0.5, 0.5, 0.5], 0.5)]
    #[case(&[0.0, 1.0, 0.0, 1.0], &[0.2, 0.2, 0.7, 0.7], 0.5)]
    fn roc_auc_reference_values(#[case] gt: &[f32], #[case] pred: &[f32], #[case] expected: f64) {
        let (gt, pred) = image_tensors(gt, pred);
        let auc = RocAuc::new(MetricLevel::Image).compute(gt, pred).unwrap();
        assert_relative_eq!(auc, expected, epsilon = 1e-12);
    }

    #[test]
    fn roc_auc_counts_ties_half() {
        // One positive tied with one of two negatives, above the other.
        let (gt, pred) = image_tensors(&[1.0, 0.0, 0.0], &[0.6, 0.6, 0.1]);
        let auc = RocAuc::new(MetricLevel::Image).compute(gt, pred).unwrap();
        assert_relative_eq!(auc, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn roc_auc_is_bounded() {
        let gt = [0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let pred = [0.33, 0.12, 0.91, 0.45, 0.67, 0.05, 0.72, 0.58, 0.21, 0.84];
        let (gt, pred) = image_tensors(&gt, &pred);
        let auc = RocAuc::new(MetricLevel::Image).compute(gt, pred).unwrap();
        assert!((0.0..=1.0).contains(&auc));
    }

    #[test]
    fn roc_auc_rejects_single_class() {
        let (gt, pred) = image_tensors(&[1.0, 1.0], &[0.3, 0.4]);
        let err = RocAuc::new(MetricLevel::Image).compute(gt, pred).unwrap_err();
        assert!(matches!(err, MetricError::SingleClass { negatives: 0, .. }));
    }

    #[test]
    fn roc_curve_runs_from_origin_to_one_monotonically() {
        let gt = [0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let pred = [0.3, 0.1, 0.9, 0.4, 0.6, 0.05, 0.7, 0.7];
        let (gt, pred) = image_tensors(&gt, &pred);

        let roc = RocCurve::new(MetricLevel::Image).compute(gt, pred).unwrap();

        assert_eq!(roc.fpr.len(), roc.tpr.len());
        assert_eq!((roc.fpr[0], roc.tpr[0]), (0.0, 0.0));
        assert_eq!((roc.fpr[roc.len() - 1], roc.tpr[roc.len() - 1]), (1.0, 1.0));
        assert!(roc.fpr.windows(2).all(|w| w[0] <= w[1]));
        assert!(roc.tpr.windows(2).all(|w| w[0] <= w[1]));
        assert!(roc.thresholds.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn roc_curve_on_pixel_maps() {
        let device = Default::default();
        let gt = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![0.0_f32, 1.0, 0.0, 1.0], [2, 1, 1, 2]),
            &device,
        );
        let pred = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![0.2_f32, 0.8, 0.3, 0.9], [2, 1, 1, 2]),
            &device,
        );

        let metric = RocCurve::new(MetricLevel::Pixel);
        let roc = metric.compute(gt, pred).unwrap();

        assert_eq!(metric.name(), "pxl_fpr_tpr");
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 1.0, 1.0]);
    }
}
