//! PRO-AUC: area under the per-region overlap curve.
//!
//! Unlike pixel ROC-AUC, every connected ground-truth region weighs the same
//! regardless of its size, so small defects are not drowned out by large
//! ones. The score is integrated only over the low false-positive-rate
//! regime (`fpr <= expect_fpr`), after both axes are min-max rescaled.
//!
//! Sweep outline:
//! 1. Binarize ground truth at 0.5 and label each mask with 8-connectivity.
//! 2. Step the threshold from the maximum score down in `max_step` equal
//!    steps; flag pixels scoring strictly above it.
//! 3. At every step record the mean region overlap and the batch-wide FPR.
//! 4. Keep steps within the FPR budget, rescale, integrate.

use burn::{
    prelude::*,
    tensor::{backend::Backend, Tensor},
};
use moviad_util::{
    label_regions, min_max_rescale, propagating_max, propagating_min, tensor_to_vec,
    trapezoid_auc, Connectivity, Region,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{MetricError, MetricResult},
    input::binarize,
    level::MetricLevel,
    metric::Metric,
};

/// How per-region overlaps are pooled into one value per threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapAveraging {
    /// Mean over the regions of each image, then mean over images with at
    /// least one region.
    PerImage,
    /// Mean over all regions of the batch.
    PerRegion,
}

/// Configuration for the PRO-AUC metric.
#[derive(Config, Debug)]
pub struct ProAucConfig {
    /// Number of thresholds in the sweep.
    #[config(default = 200)]
    pub max_step: usize,
    /// False-positive-rate budget; steps above it are discarded.
    #[config(default = 0.3)]
    pub expect_fpr: f64,
    /// Pooling of region overlaps at each threshold.
    #[config(default = "OverlapAveraging::PerImage")]
    pub overlap_averaging: OverlapAveraging,
}

impl ProAucConfig {
    /// Build the metric.
    ///
    /// # Errors
    /// * [`MetricError::InvalidLevel`] unless `level` is [`MetricLevel::Pixel`].
    /// * [`MetricError::InvalidConfiguration`] if `max_step` is zero.
    pub fn init(&self, level: MetricLevel) -> MetricResult<ProAuc> {
        if level != MetricLevel::Pixel {
            return Err(MetricError::InvalidLevel {
                metric: "ProAuc",
                level,
            });
        }
        if self.max_step == 0 {
            return Err(MetricError::InvalidConfiguration {
                reason: "max_step must be at least 1".to_owned(),
            });
        }

        Ok(ProAuc {
            level,
            max_step: self.max_step,
            expect_fpr: self.expect_fpr,
            overlap_averaging: self.overlap_averaging,
        })
    }
}

/// Per-region overlap AUC, pixel level only.
#[derive(Debug, Clone, PartialEq)]
pub struct ProAuc {
    level: MetricLevel,
    max_step: usize,
    expect_fpr: f64,
    overlap_averaging: OverlapAveraging,
}

impl Default for ProAuc {
    fn default() -> Self {
        Self {
            level: MetricLevel::Pixel,
            max_step: 200,
            expect_fpr: 0.3,
            overlap_averaging: OverlapAveraging::PerImage,
        }
    }
}

/// The full threshold sweep behind a PRO-AUC value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProCurve {
    /// Thresholds, decreasing.
    pub thresholds: Vec<f64>,
    /// Mean region overlap per threshold; NaN if no image has a region.
    pub overlaps: Vec<f64>,
    /// Batch-wide false positive rate per threshold.
    pub fprs: Vec<f64>,
}

impl ProCurve {
    /// Rescaled area under the overlap-vs-FPR curve within `expect_fpr`.
    ///
    /// # Errors
    /// [`MetricError::DegenerateCurve`] if fewer than two steps are within budget.
    pub fn area(&self, expect_fpr: f64) -> MetricResult<f64> {
        let (fprs, overlaps): (Vec<f64>, Vec<f64>) = self
            .fprs
            .iter()
            .zip(&self.overlaps)
            .filter(|&(&fpr, _)| fpr <= expect_fpr)
            .map(|(&fpr, &overlap)| (fpr, overlap))
            .unzip();

        tracing::debug!(
            selected = fprs.len(),
            total = self.fprs.len(),
            expect_fpr,
            "filtered PRO sweep"
        );

        let area = trapezoid_auc(&min_max_rescale(&fprs), &min_max_rescale(&overlaps))?;
        Ok(area)
    }
}

impl ProAuc {
    /// PRO-AUC with the default sweep.
    ///
    /// # Errors
    /// [`MetricError::InvalidLevel`] unless `level` is [`MetricLevel::Pixel`].
    pub fn new(level: MetricLevel) -> MetricResult<Self> {
        ProAucConfig::new().init(level)
    }

    pub const fn max_step(&self) -> usize {
        self.max_step
    }

    pub const fn expect_fpr(&self) -> f64 {
        self.expect_fpr
    }

    pub const fn overlap_averaging(&self) -> OverlapAveraging {
        self.overlap_averaging
    }

    /// Run the threshold sweep without reducing it to an area.
    ///
    /// `ground_truth` and `prediction` are `[batch, 1, height, width]` maps.
    ///
    /// # Errors
    /// * [`MetricError::InvalidShape`] for a non-4D input or a channel axis other than 1.
    /// * [`MetricError::LengthMismatch`] if the prediction holds a different number of pixels.
    pub fn curve<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<ProCurve> {
        let dims = ground_truth.dims();
        let (batch, height, width) = match *dims.as_slice() {
            [batch, 1, height, width] => (batch, height, width),
            _ => {
                return Err(MetricError::InvalidShape {
                    expected: "[batch, 1, height, width]".to_owned(),
                    actual: format!("{dims:?}"),
                })
            }
        };
        let pixels = height * width;

        let gt = binarize(&tensor_to_vec(ground_truth)?);
        let scores = tensor_to_vec(prediction)?;
        if gt.len() != scores.len() {
            return Err(MetricError::LengthMismatch {
                ground_truth: gt.len(),
                prediction: scores.len(),
            });
        }

        // Ground truth does not change across thresholds: label once.
        let regions: Vec<Vec<Region>> = gt
            .chunks(pixels.max(1))
            .map(|mask| label_regions(mask, height, width, Connectivity::Eight).regions())
            .collect();
        let negatives = gt.iter().filter(|&&g| !g).count();

        let max_th = propagating_max(&scores);
        let min_th = propagating_min(&scores);
        let delta = (max_th - min_th) / self.max_step as f64;

        tracing::debug!(
            batch,
            height,
            width,
            regions = regions.iter().map(Vec::len).sum::<usize>(),
            max_th,
            min_th,
            "starting PRO sweep"
        );

        let mut thresholds = Vec::with_capacity(self.max_step);
        let mut overlaps = Vec::with_capacity(self.max_step);
        let mut fprs = Vec::with_capacity(self.max_step);
        let mut flagged = vec![false; scores.len()];

        for step in 0..self.max_step {
            let threshold = max_th - step as f64 * delta;
            for (flag, &score) in flagged.iter_mut().zip(&scores) {
                *flag = score > threshold;
            }

            let false_positives = gt
                .iter()
                .zip(&flagged)
                .filter(|&(&g, &f)| !g && f)
                .count();

            thresholds.push(threshold);
            overlaps.push(self.mean_overlap(&regions, &flagged, pixels));
            fprs.push(false_positives as f64 / negatives as f64);
        }

        Ok(ProCurve {
            thresholds,
            overlaps,
            fprs,
        })
    }

    fn mean_overlap(&self, regions: &[Vec<Region>], flagged: &[bool], pixels: usize) -> f64 {
        let per_image = regions
            .iter()
            .enumerate()
            .filter(|(_, image_regions)| !image_regions.is_empty())
            .map(|(i, image_regions)| {
                let flags = &flagged[i * pixels..(i + 1) * pixels];
                let overlaps: Vec<f64> = image_regions.iter().map(|r| r.overlap(flags)).collect();
                overlaps
            });

        let (sum, count) = match self.overlap_averaging {
            OverlapAveraging::PerImage => per_image
                .map(|o| o.iter().sum::<f64>() / o.len() as f64)
                .fold((0.0, 0_usize), |(s, c), v| (s + v, c + 1)),
            OverlapAveraging::PerRegion => per_image
                .flatten()
                .fold((0.0, 0_usize), |(s, c), v| (s + v, c + 1)),
        };

        // No region anywhere: 0 / 0 is NaN.
        sum / count as f64
    }
}

impl Metric for ProAuc {
    type Output = f64;

    fn level(&self) -> MetricLevel {
        self.level
    }

    fn name(&self) -> String {
        "pxl_au_pro".to_owned()
    }

    fn compute<B: Backend, const D: usize>(
        &self,
        ground_truth: Tensor<B, D>,
        prediction: Tensor<B, D>,
    ) -> MetricResult<f64> {
        let value = self
            .curve(ground_truth, prediction)?
            .area(self.expect_fpr)?;

        tracing::debug!(metric = %self.name(), value, "computed");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::tensor::TensorData;
    use rstest::*;

    use super::*;
    use crate::tests::TestBackend;

    const SIZE: usize = 8;

    /// Two images: an all-background one and one with a 3x3 defect at (2..5, 2..5).
    fn defect_batch() -> Vec<f32> {
        let mut gt = vec![0.0_f32; 2 * SIZE * SIZE];
        for r in 2..5 {
            for c in 2..5 {
                gt[SIZE * SIZE + r * SIZE + c] = 1.0;
            }
        }
        gt
    }

    fn to_tensor(values: Vec<f32>, batch: usize) -> Tensor<TestBackend, 4> {
        Tensor::from_data(
            TensorData::new(values, [batch, 1, SIZE, SIZE]),
            &Default::default(),
        )
    }

    #[test]
    fn image_level_construction_fails() {
        let err = ProAuc::new(MetricLevel::Image).unwrap_err();
        assert_eq!(
            err,
            MetricError::InvalidLevel {
                metric: "ProAuc",
                level: MetricLevel::Image
            }
        );
    }

    #[test]
    fn pixel_level_construction_uses_fixed_name() {
        let metric = ProAuc::new(MetricLevel::Pixel).unwrap();
        assert_eq!(metric.name(), "pxl_au_pro");
        assert_eq!(metric.level(), MetricLevel::Pixel);
        assert_eq!(metric.max_step(), 200);
        assert_relative_eq!(metric.expect_fpr(), 0.3);
        assert_eq!(metric, ProAuc::default());
    }

    #[test]
    fn zero_steps_are_rejected() {
        let err = ProAucConfig::new()
            .with_max_step(0)
            .init(MetricLevel::Pixel)
            .unwrap_err();
        assert!(matches!(err, MetricError::InvalidConfiguration { .. }));
    }

    #[rstest]
    #[case(OverlapAveraging::PerImage)]
    #[case(OverlapAveraging::PerRegion)]
    fn matched_region_with_graded_background_scores_near_one(#[case] averaging: OverlapAveraging) {
        let gt = defect_batch();
        // Defect pixels score 1, background ramps over [0, 0.5).
        let background = gt.iter().filter(|&&g| g < 0.5).count();
        let mut rank = 0;
        let pred: Vec<f32> = gt
            .iter()
            .map(|&g| {
                if g > 0.5 {
                    1.0
                } else {
                    rank += 1;
                    0.5 * (rank - 1) as f32 / background as f32
                }
            })
            .collect();

        let metric = ProAucConfig::new()
            .with_overlap_averaging(averaging)
            .init(MetricLevel::Pixel)
            .unwrap();
        let value = metric.compute(to_tensor(gt, 2), to_tensor(pred, 2)).unwrap();

        assert!(value > 0.99, "expected near-perfect PRO-AUC, got {value}");
        assert!(value <= 1.0 + 1e-12);
    }

    #[test]
    fn matched_region_with_binary_scores_has_flat_fpr() {
        // Scores are exactly 1 on the defect and 0 elsewhere: no threshold in
        // the sweep flags a background pixel, so every selected FPR is 0 and
        // the unguarded rescale divides by zero.
        let gt = defect_batch();
        let pred = gt.clone();

        let metric = ProAuc::default();
        let curve = metric
            .curve(to_tensor(gt.clone(), 2), to_tensor(pred.clone(), 2))
            .unwrap();
        assert!(curve.fprs.iter().all(|&f| f == 0.0));
        assert_relative_eq!(curve.overlaps[0], 0.0);
        assert!(curve.overlaps[1..].iter().all(|&o| o == 1.0));

        let value = metric.compute(to_tensor(gt, 2), to_tensor(pred, 2)).unwrap();
        assert!(value.is_nan());
    }

    #[test]
    fn all_background_batch_is_nan() {
        let gt = vec![0.0_f32; 2 * SIZE * SIZE];
        let pred = gt.clone();

        let metric = ProAuc::default();
        let curve = metric
            .curve(to_tensor(gt.clone(), 2), to_tensor(pred.clone(), 2))
            .unwrap();
        assert!(curve.overlaps.iter().all(|o| o.is_nan()));

        let value = metric.compute(to_tensor(gt, 2), to_tensor(pred, 2)).unwrap();
        assert!(value.is_nan());
    }

    #[test]
    fn single_step_sweep_is_degenerate() {
        let gt = defect_batch();
        let pred = gt.clone();

        let metric = ProAucConfig::new()
            .with_max_step(1)
            .init(MetricLevel::Pixel)
            .unwrap();
        let err = metric
            .compute(to_tensor(gt, 2), to_tensor(pred, 2))
            .unwrap_err();

        assert_eq!(err, MetricError::DegenerateCurve { points: 1 });
    }

    #[test]
    fn sweep_records_fpr_and_overlap_per_step() {
        // One image, two regions of different size; prediction covers one of them.
        let mut gt = vec![0.0_f32; SIZE * SIZE];
        let mut pred = vec![0.0_f32; SIZE * SIZE];
        gt[0] = 1.0;
        for r in 4..6 {
            for c in 4..6 {
                gt[r * SIZE + c] = 1.0;
                pred[r * SIZE + c] = 1.0;
            }
        }
        pred[SIZE - 1] = 0.5;

        let metric = ProAucConfig::new()
            .with_max_step(4)
            .init(MetricLevel::Pixel)
            .unwrap();
        let curve = metric
            .curve(to_tensor(gt, 1), to_tensor(pred, 1))
            .unwrap();

        // Thresholds: 1.0, 0.75, 0.5, 0.25.
        assert_eq!(curve.thresholds, vec![1.0, 0.75, 0.5, 0.25]);
        assert_eq!(curve.overlaps, vec![0.0, 0.5, 0.5, 0.5]);
        let negatives = (SIZE * SIZE - 5) as f64;
        assert_eq!(curve.fprs, vec![0.0, 0.0, 0.0, 1.0 / negatives]);
    }

    #[test]
    fn per_image_and_per_region_averaging_differ() {
        // Image 0: one region fully detected. Image 1: two regions, one detected.
        let mut gt = vec![0.0_f32; 2 * SIZE * SIZE];
        let mut pred = vec![0.0_f32; 2 * SIZE * SIZE];
        gt[0] = 1.0;
        pred[0] = 1.0;
        let offset = SIZE * SIZE;
        gt[offset] = 1.0;
        pred[offset] = 1.0;
        gt[offset + 5 * SIZE + 5] = 1.0;

        let sweep = |averaging| {
            ProAucConfig::new()
                .with_max_step(2)
                .with_overlap_averaging(averaging)
                .init(MetricLevel::Pixel)
                .unwrap()
                .curve(to_tensor(gt.clone(), 2), to_tensor(pred.clone(), 2))
                .unwrap()
        };

        let per_image = sweep(OverlapAveraging::PerImage);
        let per_region = sweep(OverlapAveraging::PerRegion);

        // Second step (threshold 0.5): image means 1.0 and 0.5; region mean 2/3.
        assert_relative_eq!(per_image.overlaps[1], 0.75);
        assert_relative_eq!(per_region.overlaps[1], 2.0 / 3.0);
    }

    #[test]
    fn rejects_multi_channel_maps() {
        let device = Default::default();
        let gt = Tensor::<TestBackend, 4>::zeros([1, 3, 4, 4], &device);
        let pred = Tensor::<TestBackend, 4>::zeros([1, 3, 4, 4], &device);

        let err = ProAuc::default().compute(gt, pred).unwrap_err();
        assert!(matches!(err, MetricError::InvalidShape { .. }));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ProAucConfig::new().with_max_step(50).with_expect_fpr(0.1);
        let json = serde_json::to_string(&config).unwrap();
        let restored: ProAucConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.max_step, 50);
        assert_relative_eq!(restored.expect_fpr, 0.1);
        assert_eq!(restored.overlap_averaging, OverlapAveraging::PerImage);
    }
}
