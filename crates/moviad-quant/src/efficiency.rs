//! Storage savings and reconstruction error of a quantized coreset.

use core::fmt;

use burn::tensor::{backend::Backend, ElementConversion, Tensor};
use serde::{Deserialize, Serialize};

use crate::{
    codes::PqCodes,
    error::{QuantError, QuantResult},
    quantizer::Quantizer,
};

/// Bytes needed to store a quantizer: its codebook as 32-bit floats plus
/// two 32-bit header fields.
pub fn compute_quantizer_config_size<B: Backend, Q: Quantizer<B>>(quantizer: &Q) -> usize {
    quantizer.centroids().shape().num_elements() * 4 + 4 + 4
}

/// Outcome of compressing a coreset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionReport {
    /// `1 - compressed_bits / original_bits`; negative when compression grows the data.
    pub efficiency: f64,
    /// Relative Frobenius error of the reconstruction.
    pub distortion: f64,
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "efficiency: {:.5}, distortion: {:.5}",
            self.efficiency, self.distortion
        )
    }
}

/// Compare a coreset with its quantized form.
///
/// The original size counts every coreset element at the backend's float
/// width. The compressed size counts the code bytes plus the quantizer
/// itself, see [`compute_quantizer_config_size`]. Distortion is
/// `|coreset - decode(compressed)|_F / |coreset|_F`; an all-zero coreset
/// yields NaN.
///
/// # Errors
/// * [`QuantError::CodesMismatch`] if the codes do not describe this coreset
///   or were produced by a different quantizer.
/// * [`QuantError::TensorConversion`] if a reduction cannot be read back.
pub fn compute_product_quantization_efficiency<B: Backend, Q: Quantizer<B>>(
    coreset: Tensor<B, 2>,
    compressed: &PqCodes,
    quantizer: &Q,
) -> QuantResult<CompressionReport> {
    let [rows, dim] = coreset.dims();
    if compressed.rows() != rows {
        return Err(QuantError::CodesMismatch {
            reason: format!(
                "coreset has {rows} rows but the codes describe {}",
                compressed.rows()
            ),
        });
    }

    let decoded = quantizer.decode(compressed)?;
    if decoded.dims() != [rows, dim] {
        return Err(QuantError::CodesMismatch {
            reason: format!(
                "decoded shape {:?} differs from coreset shape {:?}",
                decoded.dims(),
                [rows, dim]
            ),
        });
    }

    let original_bits = core::mem::size_of::<B::FloatElem>() * rows * dim * 8;
    let config_bytes = compute_quantizer_config_size(quantizer);
    let compressed_bits =
        (compressed.element_bytes() * compressed.num_elements() + config_bytes) * 8;
    let efficiency = 1.0 - compressed_bits as f64 / original_bits as f64;

    let error = (coreset.clone() - decoded)
        .powf_scalar(2.0)
        .sum()
        .into_scalar()
        .elem::<f64>()
        .sqrt();
    let norm = coreset.powf_scalar(2.0).sum().into_scalar().elem::<f64>().sqrt();
    let distortion = error / norm;

    tracing::debug!(
        original_bits,
        compressed_bits,
        efficiency,
        distortion,
        "product quantization report"
    );

    Ok(CompressionReport {
        efficiency,
        distortion,
    })
}
