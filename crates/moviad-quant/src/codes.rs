//! Compact storage for product-quantization codes.

use serde::{Deserialize, Serialize};

use crate::error::{QuantError, QuantResult};

/// Largest codebook addressable with two-byte codes.
pub const MAX_CENTROIDS: usize = 1 << 16;

/// A quantized coreset: one centroid index per row and subspace.
///
/// Indices are stored row-major in a byte buffer, one byte each when the
/// codebook has at most 256 entries and two little-endian bytes otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PqCodes {
    bytes: Vec<u8>,
    rows: usize,
    subspaces: usize,
    centroids: usize,
}

impl PqCodes {
    /// Pack centroid indices laid out as `[rows, subspaces]`.
    ///
    /// # Errors
    /// * [`QuantError::InvalidConfiguration`] if `centroids` is 0 or above [`MAX_CENTROIDS`].
    /// * [`QuantError::CodesMismatch`] if the index count is not `rows * subspaces`
    ///   or an index is out of range.
    pub fn from_indices(
        indices: &[usize],
        rows: usize,
        subspaces: usize,
        centroids: usize,
    ) -> QuantResult<Self> {
        if centroids == 0 || centroids > MAX_CENTROIDS {
            return Err(QuantError::InvalidConfiguration {
                reason: format!("centroid count must be in 1..={MAX_CENTROIDS}, got {centroids}"),
            });
        }
        if indices.len() != rows * subspaces {
            return Err(QuantError::CodesMismatch {
                reason: format!(
                    "expected {} indices for {rows} rows of {subspaces} subspaces, got {}",
                    rows * subspaces,
                    indices.len()
                ),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= centroids) {
            return Err(QuantError::CodesMismatch {
                reason: format!("index {bad} out of range for {centroids} centroids"),
            });
        }

        let width = Self::code_width(centroids);
        let mut bytes = Vec::with_capacity(indices.len() * width);
        for &index in indices {
            if width == 1 {
                bytes.push(index as u8);
            } else {
                bytes.extend_from_slice(&(index as u16).to_le_bytes());
            }
        }

        Ok(Self {
            bytes,
            rows,
            subspaces,
            centroids,
        })
    }

    /// Bytes used by one index for a codebook of `centroids` entries.
    pub const fn code_width(centroids: usize) -> usize {
        if centroids <= 256 {
            1
        } else {
            2
        }
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn subspaces(&self) -> usize {
        self.subspaces
    }

    /// Codebook size the indices refer to.
    pub const fn centroids(&self) -> usize {
        self.centroids
    }

    /// Number of stored bytes.
    pub fn num_elements(&self) -> usize {
        self.bytes.len()
    }

    /// Size of one stored element in bytes.
    pub const fn element_bytes(&self) -> usize {
        1
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Centroid index of `row` in `subspace`.
    ///
    /// # Panics
    /// If `row` or `subspace` is out of range.
    pub fn get(&self, row: usize, subspace: usize) -> usize {
        assert!(row < self.rows && subspace < self.subspaces, "code index out of range");
        let width = Self::code_width(self.centroids);
        let at = (row * self.subspaces + subspace) * width;
        if width == 1 {
            usize::from(self.bytes[at])
        } else {
            usize::from(u16::from_le_bytes([self.bytes[at], self.bytes[at + 1]]))
        }
    }

    /// All indices of one subspace, in row order.
    pub fn column(&self, subspace: usize) -> Vec<usize> {
        (0..self.rows).map(|row| self.get(row, subspace)).collect()
    }
}
