//! # MoViAD Quantization
//!
//! Product quantization for memory-bank anomaly detectors.
//!
//! A coreset of patch features can be replaced by one small integer code per
//! subspace and a shared codebook. [`ProductQuantizerConfig::init`] trains
//! the codebooks, the [`Quantizer`] trait encodes and decodes, and
//! [`compute_product_quantization_efficiency`] reports how much space that
//! saves and how much accuracy it costs.

pub mod codes;
pub mod efficiency;
pub mod error;
pub mod product;
pub mod quantizer;

pub use codes::PqCodes;
pub use efficiency::{
    compute_product_quantization_efficiency, compute_quantizer_config_size, CompressionReport,
};
pub use error::{QuantError, QuantResult};
pub use product::{ProductQuantizer, ProductQuantizerConfig};
pub use quantizer::Quantizer;
