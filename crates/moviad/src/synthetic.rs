//! Seeded synthetic evaluation data.
//!
//! Every odd image carries one square defect. Anomaly maps are low noise
//! with a raised plateau over the defect, so a reasonable detector scores
//! well but not perfectly.

use burn::tensor::{backend::Backend, Tensor, TensorData};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One batch of ground truth and predictions at both levels.
#[derive(Debug, Clone)]
pub struct SyntheticBatch<B: Backend> {
    /// `[batch]` image labels.
    pub image_gt: Tensor<B, 1>,
    /// `[batch]` image scores, the maximum of each anomaly map.
    pub image_pred: Tensor<B, 1>,
    /// `[batch, 1, size, size]` defect masks.
    pub pixel_gt: Tensor<B, 4>,
    /// `[batch, 1, size, size]` anomaly maps.
    pub pixel_pred: Tensor<B, 4>,
}

impl<B: Backend> SyntheticBatch<B> {
    /// Generate `batch` images of `size x size` pixels.
    ///
    /// # Panics
    /// If `size` is smaller than 4.
    pub fn generate(batch: usize, size: usize, seed: u64, device: &B::Device) -> Self {
        assert!(size >= 4, "synthetic images need at least 4x4 pixels");

        let mut rng = StdRng::seed_from_u64(seed);
        let pixels = size * size;
        let mut masks = vec![0.0_f32; batch * pixels];
        let mut maps = vec![0.0_f32; batch * pixels];
        let mut labels = vec![0.0_f32; batch];
        let mut scores = vec![0.0_f32; batch];

        for image in 0..batch {
            let map = &mut maps[image * pixels..(image + 1) * pixels];
            for v in map.iter_mut() {
                *v = rng.gen_range(0.0..0.6);
            }

            if image % 2 == 1 {
                let side = (size / 4).max(2);
                let top = rng.gen_range(0..=size - side);
                let left = rng.gen_range(0..=size - side);
                for r in top..top + side {
                    for c in left..left + side {
                        masks[image * pixels + r * size + c] = 1.0;
                        map[r * size + c] = rng.gen_range(0.4..1.0);
                    }
                }
                labels[image] = 1.0;
            }

            scores[image] = map.iter().copied().fold(f32::MIN, f32::max);
        }

        Self {
            image_gt: Tensor::from_data(TensorData::new(labels, [batch]), device),
            image_pred: Tensor::from_data(TensorData::new(scores, [batch]), device),
            pixel_gt: Tensor::from_data(TensorData::new(masks, [batch, 1, size, size]), device),
            pixel_pred: Tensor::from_data(TensorData::new(maps, [batch, 1, size, size]), device),
        }
    }
}

/// Uniform `[rows, dim]` features in `[0, 1)`, standing in for a coreset.
pub fn random_coreset<B: Backend>(rows: usize, dim: usize, seed: u64, device: &B::Device) -> Tensor<B, 2> {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f32> = (0..rows * dim).map(|_| rng.gen_range(0.0..1.0)).collect();
    Tensor::from_data(TensorData::new(values, [rows, dim]), device)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use moviad_util::tensor_to_vec;

    use super::*;

    #[test]
    fn odd_images_carry_a_defect() {
        let batch = SyntheticBatch::<NdArray>::generate(4, 8, 0, &Default::default());

        assert_eq!(batch.pixel_gt.dims(), [4, 1, 8, 8]);
        assert_eq!(tensor_to_vec(batch.image_gt).unwrap(), vec![0.0, 1.0, 0.0, 1.0]);

        let masks = tensor_to_vec(batch.pixel_gt).unwrap();
        let defect_pixels: Vec<usize> = masks
            .chunks_exact(64)
            .map(|m| m.iter().filter(|&&v| v > 0.5).count())
            .collect();
        assert_eq!(defect_pixels, vec![0, 4, 0, 4]);
    }

    #[test]
    fn same_seed_same_data() {
        let device = Default::default();
        let a = random_coreset::<NdArray>(16, 4, 9, &device);
        let b = random_coreset::<NdArray>(16, 4, 9, &device);

        assert_eq!(tensor_to_vec(a).unwrap(), tensor_to_vec(b).unwrap());
    }
}
