use moviad_util::ArrayError;
use thiserror::Error;

/// The error type for quantizer training, encoding and compression analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantError {
    /// The quantizer configuration cannot be realized.
    #[error("Invalid quantizer configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// The coreset has fewer rows than centroids per subspace.
    #[error("Need at least {required} coreset rows to train {required} centroids, got {actual}")]
    InsufficientData {
        /// Minimum number of rows.
        required: usize,
        /// Rows supplied.
        actual: usize,
    },

    /// Codes or input data do not fit the quantizer.
    #[error("Codes do not match the quantizer: {reason}")]
    CodesMismatch {
        /// What did not match.
        reason: String,
    },

    /// Tensor data could not be read back to the host.
    #[error("Tensor conversion failed: {reason}")]
    TensorConversion {
        /// The underlying conversion failure.
        reason: String,
    },
}

impl From<ArrayError> for QuantError {
    fn from(err: ArrayError) -> Self {
        match err {
            ArrayError::TensorConversion { reason } => Self::TensorConversion { reason },
            other => Self::CodesMismatch {
                reason: other.to_string(),
            },
        }
    }
}

/// A specialized `Result` type for quantization.
pub type QuantResult<T> = Result<T, QuantError>;
