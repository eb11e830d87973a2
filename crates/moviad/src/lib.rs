//! `MoViAD`: evaluation and compression analysis for visual anomaly detection.
//!
//! This crate ties the workspace together: metrics from [`metric`],
//! product quantization from [`quant`], host-side helpers from [`util`],
//! plus feature-selected backend types and seeded synthetic data for
//! benchmarks and tests.

pub mod backend;
pub mod synthetic;

#[doc(inline)]
pub use moviad_metric as metric;
#[doc(inline)]
pub use moviad_quant as quant;
#[doc(inline)]
pub use moviad_util as util;
