//! Host-side helpers for the MoViAD evaluation crates.
//!
//! Burn covers the dense tensor math; what it lacks for anomaly-detection
//! evaluation lives here: pulling tensors back to the host, min-max
//! rescaling, the trapezoidal area under a curve, and connected-component
//! labeling of binary masks.

pub mod array_ops;
pub mod error;
pub mod labeling;

pub use array_ops::{min_max_rescale, propagating_max, propagating_min, tensor_to_vec, trapezoid_auc};
pub use error::{ArrayError, ArrayResult};
pub use labeling::{label_regions, Connectivity, LabelMap, Region};
