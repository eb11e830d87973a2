use moviad_util::ArrayError;
use thiserror::Error;

use crate::level::MetricLevel;

/// The error type for metric computations.
///
/// Every variant is raised at the point of misuse; no metric retries or
/// returns partial results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// A metric was constructed for a level it cannot be computed on.
    #[error("{metric} metric can only be computed on pixel level. Got {level} instead.")]
    InvalidLevel {
        /// Name of the metric type.
        metric: &'static str,
        /// The rejected level.
        level: MetricLevel,
    },

    /// A metric configuration is logically inconsistent.
    #[error("Invalid metric configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// The ground truth holds a single class, so ranking metrics are undefined.
    #[error("Ground truth must contain both classes, got {positives} positive and {negatives} negative samples")]
    SingleClass {
        /// Number of positive samples.
        positives: usize,
        /// Number of negative samples.
        negatives: usize,
    },

    /// Ground truth and prediction hold a different number of elements.
    #[error("Ground truth has {ground_truth} elements but prediction has {prediction}")]
    LengthMismatch {
        /// Element count of the ground truth.
        ground_truth: usize,
        /// Element count of the prediction.
        prediction: usize,
    },

    /// An input tensor has a shape the metric cannot consume.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },

    /// Too few curve points are left to integrate.
    #[error("At least 2 points are needed to compute area under curve, got {points}")]
    DegenerateCurve {
        /// Number of points that were available.
        points: usize,
    },

    /// The curve abscissa changes direction.
    #[error("Curve x coordinates are neither increasing nor decreasing")]
    NonMonotonic,

    /// Tensor data could not be read back to the host.
    #[error("Tensor conversion failed: {reason}")]
    TensorConversion {
        /// The underlying conversion failure.
        reason: String,
    },
}

impl From<ArrayError> for MetricError {
    fn from(err: ArrayError) -> Self {
        match err {
            ArrayError::TensorConversion { reason } => Self::TensorConversion { reason },
            ArrayError::TooFewPoints { points } => Self::DegenerateCurve { points },
            ArrayError::NonMonotonic => Self::NonMonotonic,
            ArrayError::LengthMismatch { x, y } => Self::LengthMismatch {
                ground_truth: x,
                prediction: y,
            },
        }
    }
}

/// A specialized `Result` type for metric computations.
pub type MetricResult<T> = Result<T, MetricError>;
