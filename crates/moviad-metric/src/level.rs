//! Image vs pixel evaluation level.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The level a metric is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricLevel {
    /// One score and one label per image.
    Image,
    /// One score and one label per pixel, across the whole batch.
    Pixel,
}

impl MetricLevel {
    /// Short tag used as metric name prefix.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Pixel => "pxl",
        }
    }

    /// Whether inputs are flattened to a single axis before scoring.
    pub const fn flattens(self) -> bool {
        matches!(self, Self::Pixel)
    }

    /// Level-prefixed metric name, e.g. `pxl_roc_auc`.
    pub fn metric_name(self, suffix: &str) -> String {
        format!("{}_{suffix}", self.tag())
    }
}

impl fmt::Display for MetricLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("MetricLevel::Image"),
            Self::Pixel => f.write_str("MetricLevel::Pixel"),
        }
    }
}
