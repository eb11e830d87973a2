use thiserror::Error;

/// Errors raised by the host-side array helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    /// Tensor data could not be read back as the requested element type.
    #[error("Tensor conversion failed: {reason}")]
    TensorConversion {
        /// Debug rendering of the underlying burn data error.
        reason: String,
    },

    /// An area under curve needs at least two points.
    #[error("At least 2 points are needed to compute area under curve, got {points}")]
    TooFewPoints {
        /// Number of points supplied.
        points: usize,
    },

    /// The x coordinates of a curve are neither non-decreasing nor non-increasing.
    #[error("x coordinates are neither increasing nor decreasing")]
    NonMonotonic,

    /// The x and y coordinates of a curve have different lengths.
    #[error("Curve coordinates differ in length: x has {x}, y has {y}")]
    LengthMismatch {
        /// Length of the x coordinates.
        x: usize,
        /// Length of the y coordinates.
        y: usize,
    },
}

/// A specialized `Result` type for array helpers.
pub type ArrayResult<T> = Result<T, ArrayError>;
