use burn::tensor::{backend::Backend, Tensor};

use crate::{codes::PqCodes, error::QuantResult};

/// A codebook-based vector quantizer over coreset rows.
///
/// Rows of width `m * dsub` are split into `m` contiguous subspaces; each
/// subspace is replaced by the index of its nearest centroid among `k`.
pub trait Quantizer<B: Backend> {
    /// Centroids per subspace.
    fn k(&self) -> usize;

    /// Number of subspaces.
    fn m(&self) -> usize;

    /// The codebooks, shaped `[m, k, dsub]`.
    fn centroids(&self) -> Tensor<B, 3>;

    /// Quantize `[rows, m * dsub]` data.
    fn encode(&self, data: Tensor<B, 2>) -> QuantResult<PqCodes>;

    /// Reconstruct `[rows, m * dsub]` data from codes.
    fn decode(&self, codes: &PqCodes) -> QuantResult<Tensor<B, 2>>;
}
