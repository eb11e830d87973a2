//! Threshold-parameterized curves for binary scoring.
//!
//! All curves are built from one pass over the scores sorted in decreasing
//! order. Tied scores collapse into a single threshold, so a curve has at
//! most one point per distinct score.

use serde::{Deserialize, Serialize};

use crate::{error::MetricResult, input::ScoredLabels};

/// Cumulative true and false positive counts per distinct threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryClfCurve {
    pub false_positives: Vec<f64>,
    pub true_positives: Vec<f64>,
    /// Distinct scores in decreasing order.
    pub thresholds: Vec<f64>,
}

/// Count true and false positives for every distinct score threshold.
///
/// A sample counts as predicted positive at threshold `t` if its score is
/// `>= t`.
pub fn binary_clf_curve(labels: &[bool], scores: &[f64]) -> BinaryClfCurve {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut false_positives = Vec::new();
    let mut true_positives = Vec::new();
    let mut thresholds = Vec::new();

    let mut tp = 0.0;
    for (rank, &idx) in order.iter().enumerate() {
        if labels[idx] {
            tp += 1.0;
        }
        let last_of_tie = order
            .get(rank + 1)
            .map_or(true, |&next| scores[next] != scores[idx]);
        if last_of_tie {
            true_positives.push(tp);
            false_positives.push((rank + 1) as f64 - tp);
            thresholds.push(scores[idx]);
        }
    }

    BinaryClfCurve {
        false_positives,
        true_positives,
        thresholds,
    }
}

/// False and true positive rates over decreasing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurvePoints {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Threshold of every point; the first one is `+inf` so the curve starts at `(0, 0)`.
    pub thresholds: Vec<f64>,
}

impl RocCurvePoints {
    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }
}

/// ROC curve with collinear intermediate points dropped.
///
/// # Errors
/// [`crate::MetricError::SingleClass`] if the labels hold one class only.
pub fn roc_curve(input: &ScoredLabels) -> MetricResult<RocCurvePoints> {
    input.require_both_classes()?;
    let curve = binary_clf_curve(&input.labels, &input.scores);
    let n = curve.thresholds.len();

    // Keep the end points and every point where the slope changes.
    let keep: Vec<usize> = (0..n)
        .filter(|&i| {
            if i == 0 || i + 1 == n {
                return true;
            }
            let second_diff = |v: &[f64]| v[i + 1] - 2.0 * v[i] + v[i - 1];
            second_diff(&curve.false_positives) != 0.0 || second_diff(&curve.true_positives) != 0.0
        })
        .collect();

    let total_fp = curve.false_positives[n - 1];
    let total_tp = curve.true_positives[n - 1];

    let mut fpr = Vec::with_capacity(keep.len() + 1);
    let mut tpr = Vec::with_capacity(keep.len() + 1);
    let mut thresholds = Vec::with_capacity(keep.len() + 1);
    fpr.push(0.0);
    tpr.push(0.0);
    thresholds.push(f64::INFINITY);

    for i in keep {
        fpr.push(curve.false_positives[i] / total_fp);
        tpr.push(curve.true_positives[i] / total_tp);
        thresholds.push(curve.thresholds[i]);
    }

    Ok(RocCurvePoints {
        fpr,
        tpr,
        thresholds,
    })
}

/// Precision and recall for increasing thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionRecallCurve {
    /// Precision per point, ending with the conventional `1.0`.
    pub precision: Vec<f64>,
    /// Recall per point, ending with the conventional `0.0`.
    pub recall: Vec<f64>,
    /// Thresholds in increasing order; one shorter than `precision`.
    pub thresholds: Vec<f64>,
}

/// Precision-recall pairs for every distinct threshold.
///
/// # Errors
/// [`crate::MetricError::SingleClass`] if the labels hold one class only.
pub fn precision_recall_curve(input: &ScoredLabels) -> MetricResult<PrecisionRecallCurve> {
    input.require_both_classes()?;
    let curve = binary_clf_curve(&input.labels, &input.scores);
    let n = curve.thresholds.len();
    let total_tp = curve.true_positives[n - 1];

    let mut precision = Vec::with_capacity(n + 1);
    let mut recall = Vec::with_capacity(n + 1);
    let mut thresholds = Vec::with_capacity(n);

    for i in (0..n).rev() {
        let tp = curve.true_positives[i];
        let predicted = tp + curve.false_positives[i];
        precision.push(if predicted == 0.0 { 0.0 } else { tp / predicted });
        recall.push(tp / total_tp);
        thresholds.push(curve.thresholds[i]);
    }
    precision.push(1.0);
    recall.push(0.0);

    Ok(PrecisionRecallCurve {
        precision,
        recall,
        thresholds,
    })
}

/// Average precision: `Σ (R_n − R_{n−1}) · P_n` with thresholds decreasing.
pub fn average_precision(curve: &PrecisionRecallCurve) -> f64 {
    // Points are stored with recall decreasing, so walk the pairs backwards.
    curve
        .recall
        .windows(2)
        .zip(&curve.precision)
        .map(|(r, &p)| (r[0] - r[1]) * p)
        .sum()
}
