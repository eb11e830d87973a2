//! Product quantizer trained with per-subspace k-means.
//!
//! Training runs on the host: the coreset is copied back once, every
//! subspace gets a deterministic farthest-point seeding followed by Lloyd
//! iterations. Encoding and decoding stay on the backend.

use burn::{
    prelude::*,
    tensor::{backend::Backend, Int, Tensor, TensorData},
};
use moviad_util::tensor_to_vec;

use crate::{
    codes::{PqCodes, MAX_CENTROIDS},
    error::{QuantError, QuantResult},
    quantizer::Quantizer,
};

/// Configuration for training a [`ProductQuantizer`].
#[derive(Config, Debug)]
pub struct ProductQuantizerConfig {
    /// Number of subspaces; must divide the coreset width.
    pub subspaces: usize,
    /// Centroids per subspace.
    pub centroids: usize,
    /// Upper bound on Lloyd iterations per subspace.
    #[config(default = 25)]
    pub max_iterations: usize,
}

impl ProductQuantizerConfig {
    /// Train a quantizer on a `[rows, dim]` coreset.
    ///
    /// # Errors
    /// * [`QuantError::InvalidConfiguration`] if `subspaces` is zero or does not
    ///   divide `dim`, or `centroids` is outside `1..=65536`.
    /// * [`QuantError::InsufficientData`] if the coreset has fewer rows than `centroids`.
    pub fn init<B: Backend>(&self, coreset: Tensor<B, 2>) -> QuantResult<ProductQuantizer<B>> {
        let [rows, dim] = coreset.dims();
        let (m, k) = (self.subspaces, self.centroids);

        if m == 0 || dim == 0 || dim % m != 0 {
            return Err(QuantError::InvalidConfiguration {
                reason: format!("{m} subspaces cannot split vectors of dimension {dim}"),
            });
        }
        if k == 0 || k > MAX_CENTROIDS {
            return Err(QuantError::InvalidConfiguration {
                reason: format!("centroid count must be in 1..={MAX_CENTROIDS}, got {k}"),
            });
        }
        if rows < k {
            return Err(QuantError::InsufficientData {
                required: k,
                actual: rows,
            });
        }

        let dsub = dim / m;
        let device = coreset.device();
        let data = tensor_to_vec(coreset)?;

        let mut codebooks = Vec::with_capacity(m * k * dsub);
        for subspace in 0..m {
            let points: Vec<f64> = (0..rows)
                .flat_map(|row| {
                    let start = row * dim + subspace * dsub;
                    data[start..start + dsub].iter().copied()
                })
                .collect();

            let (centroids, iterations) = kmeans(&points, dsub, k, self.max_iterations);
            tracing::debug!(subspace, iterations, rows, k, "trained subspace codebook");
            codebooks.extend(centroids);
        }

        let centroids = Tensor::from_data(
            TensorData::new(codebooks, [m, k, dsub]).convert::<B::FloatElem>(),
            &device,
        );

        Ok(ProductQuantizer { centroids, m, k, dsub })
    }
}

/// Product quantizer holding one codebook per subspace.
#[derive(Debug, Clone)]
pub struct ProductQuantizer<B: Backend> {
    centroids: Tensor<B, 3>,
    m: usize,
    k: usize,
    dsub: usize,
}

impl<B: Backend> ProductQuantizer<B> {
    /// Use an existing `[m, k, dsub]` codebook tensor.
    ///
    /// # Errors
    /// [`QuantError::InvalidConfiguration`] if any axis is empty or `k` exceeds 65536.
    pub fn from_centroids(centroids: Tensor<B, 3>) -> QuantResult<Self> {
        let [m, k, dsub] = centroids.dims();
        if m == 0 || k == 0 || dsub == 0 || k > MAX_CENTROIDS {
            return Err(QuantError::InvalidConfiguration {
                reason: format!("unusable codebook shape [{m}, {k}, {dsub}]"),
            });
        }
        Ok(Self { centroids, m, k, dsub })
    }

    /// Width of one subspace.
    pub const fn dsub(&self) -> usize {
        self.dsub
    }

    /// Width of the vectors this quantizer accepts.
    pub const fn dim(&self) -> usize {
        self.m * self.dsub
    }

    fn codebook(&self, subspace: usize) -> Tensor<B, 2> {
        self.centroids
            .clone()
            .narrow(0, subspace, 1)
            .reshape([self.k, self.dsub])
    }
}

impl<B: Backend> Quantizer<B> for ProductQuantizer<B> {
    fn k(&self) -> usize {
        self.k
    }

    fn m(&self) -> usize {
        self.m
    }

    fn centroids(&self) -> Tensor<B, 3> {
        self.centroids.clone()
    }

    fn encode(&self, data: Tensor<B, 2>) -> QuantResult<PqCodes> {
        let [rows, dim] = data.dims();
        if dim != self.dim() {
            return Err(QuantError::CodesMismatch {
                reason: format!("expected vectors of dimension {}, got {dim}", self.dim()),
            });
        }

        let mut indices = vec![0; rows * self.m];
        for subspace in 0..self.m {
            let x = data.clone().narrow(1, subspace * self.dsub, self.dsub);
            let c = self.codebook(subspace);

            // |x - c|^2 = |x|^2 - 2 x.c + |c|^2
            let x_sq = x.clone().powf_scalar(2.0).sum_dim(1);
            let c_sq = c.clone().powf_scalar(2.0).sum_dim(1).reshape([1, self.k]);
            let distances = x.matmul(c.transpose()).mul_scalar(-2.0) + x_sq + c_sq;

            let nearest = distances
                .argmin(1)
                .into_data()
                .convert::<i64>()
                .to_vec::<i64>()
                .map_err(|e| QuantError::TensorConversion {
                    reason: format!("{e:?}"),
                })?;

            for (row, index) in nearest.into_iter().enumerate() {
                indices[row * self.m + subspace] = index as usize;
            }
        }

        PqCodes::from_indices(&indices, rows, self.m, self.k)
    }

    fn decode(&self, codes: &PqCodes) -> QuantResult<Tensor<B, 2>> {
        if codes.subspaces() != self.m || codes.centroids() != self.k {
            return Err(QuantError::CodesMismatch {
                reason: format!(
                    "codes use {} subspaces of {} centroids, quantizer has {} of {}",
                    codes.subspaces(),
                    codes.centroids(),
                    self.m,
                    self.k
                ),
            });
        }

        let device = self.centroids.device();
        let parts: Vec<Tensor<B, 2>> = (0..self.m)
            .map(|subspace| {
                let column: Vec<i64> = codes.column(subspace).into_iter().map(|i| i as i64).collect();
                let index = Tensor::<B, 1, Int>::from_data(
                    TensorData::new(column, [codes.rows()]).convert::<B::IntElem>(),
                    &device,
                );
                self.codebook(subspace).select(0, index)
            })
            .collect();

        Ok(Tensor::cat(parts, 1))
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest_centroid(point: &[f64], centroids: &[f64], dsub: usize) -> usize {
    let mut best = (0, f64::INFINITY);
    for (index, centroid) in centroids.chunks_exact(dsub).enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best.0
}

/// Seed `k` centroids by repeatedly taking the point farthest from the
/// current set, starting from the first point. Ties go to the lower index.
fn farthest_point_init(points: &[f64], dsub: usize, k: usize) -> Vec<f64> {
    let mut centroids = Vec::with_capacity(k * dsub);
    centroids.extend_from_slice(&points[..dsub]);

    let mut nearest: Vec<f64> = points
        .chunks_exact(dsub)
        .map(|p| squared_distance(p, &points[..dsub]))
        .collect();

    for _ in 1..k {
        let mut next = 0;
        for (index, &distance) in nearest.iter().enumerate() {
            if distance > nearest[next] {
                next = index;
            }
        }

        let chosen = &points[next * dsub..(next + 1) * dsub];
        centroids.extend_from_slice(chosen);
        for (slot, point) in nearest.iter_mut().zip(points.chunks_exact(dsub)) {
            *slot = slot.min(squared_distance(point, chosen));
        }
    }

    centroids
}

/// Lloyd's k-means on row-major `points`. Returns the centroids and the
/// number of assignment passes run.
fn kmeans(points: &[f64], dsub: usize, k: usize, max_iterations: usize) -> (Vec<f64>, usize) {
    let mut centroids = farthest_point_init(points, dsub, k);
    let rows = points.len() / dsub;
    let mut assignment = vec![usize::MAX; rows];
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let mut changed = false;
        for (slot, point) in assignment.iter_mut().zip(points.chunks_exact(dsub)) {
            let cluster = nearest_centroid(point, &centroids, dsub);
            if *slot != cluster {
                *slot = cluster;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![0.0; k * dsub];
        let mut counts = vec![0_usize; k];
        for (&cluster, point) in assignment.iter().zip(points.chunks_exact(dsub)) {
            counts[cluster] += 1;
            for (sum, &v) in sums[cluster * dsub..(cluster + 1) * dsub].iter_mut().zip(point) {
                *sum += v;
            }
        }

        // Empty clusters keep their previous centroid.
        for (cluster, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let range = cluster * dsub..(cluster + 1) * dsub;
            for (c, &sum) in centroids[range.clone()].iter_mut().zip(&sums[range]) {
                *c = sum / count as f64;
            }
        }
    }

    (centroids, iterations)
}
