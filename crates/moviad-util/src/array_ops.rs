//! Basic array operations for metrics implementation
//!
//! These helpers mirror the handful of NumPy reductions the evaluation code
//! relies on. NaN handling follows NumPy: a NaN anywhere in the input poisons
//! `min`/`max` and everything computed from them.

use burn::tensor::{backend::Backend, Tensor};

use crate::error::{ArrayError, ArrayResult};

/// Flatten a tensor of any rank and copy its values to the host as `f64`.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> ArrayResult<Vec<f64>> {
    tensor
        .into_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .map_err(|e| ArrayError::TensorConversion {
            reason: format!("{e:?}"),
        })
}

/// Minimum of a slice, NaN if any element is NaN, `+inf` if the slice is empty.
pub fn propagating_min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, |acc, v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            acc.min(v)
        }
    })
}

/// Maximum of a slice, NaN if any element is NaN, `-inf` if the slice is empty.
pub fn propagating_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, |acc, v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            acc.max(v)
        }
    })
}

/// Rescale values to `[0, 1]` using their own minimum and maximum.
///
/// The range is not guarded: a constant input divides by zero and yields NaN
/// (or `±inf`), which callers are expected to surface.
pub fn min_max_rescale(values: &[f64]) -> Vec<f64> {
    let min = propagating_min(values);
    let range = propagating_max(values) - min;
    values.iter().map(|&v| (v - min) / range).collect()
}

/// Area under a curve using the trapezoidal rule.
///
/// `x` must be monotonic, either non-decreasing or non-increasing; a
/// non-increasing curve is integrated with its sign flipped so the area is
/// positive for positive `y`.
///
/// # Errors
/// * [`ArrayError::LengthMismatch`] if `x` and `y` differ in length.
/// * [`ArrayError::TooFewPoints`] if fewer than two points are given.
/// * [`ArrayError::NonMonotonic`] if `x` changes direction.
pub fn trapezoid_auc(x: &[f64], y: &[f64]) -> ArrayResult<f64> {
    if x.len() != y.len() {
        return Err(ArrayError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(ArrayError::TooFewPoints { points: x.len() });
    }

    let mut direction = 1.0;
    if x.windows(2).any(|w| w[1] - w[0] < 0.0) {
        if x.windows(2).all(|w| w[1] - w[0] <= 0.0) {
            direction = -1.0;
        } else {
            return Err(ArrayError::NonMonotonic);
        }
    }

    let area: f64 = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum();

    Ok(direction * area)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::tensor::TensorData;
    use rstest::*;

    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn tensor_to_vec_flattens_in_row_major_order() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0], [1, 2, 3]),
            &device,
        );

        let values = tensor_to_vec(tensor).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn min_and_max_propagate_nan() {
        assert!(propagating_min(&[1.0, f64::NAN, 0.0]).is_nan());
        assert!(propagating_max(&[f64::NAN, 1.0]).is_nan());
        assert_eq!(propagating_min(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(propagating_max(&[3.0, -1.0, 2.0]), 3.0);
    }

    #[test]
    fn rescale_maps_to_unit_interval() {
        let rescaled = min_max_rescale(&[2.0, 4.0, 3.0]);
        assert_relative_eq!(rescaled[0], 0.0);
        assert_relative_eq!(rescaled[1], 1.0);
        assert_relative_eq!(rescaled[2], 0.5);
    }

    #[test]
    fn rescale_of_constant_input_is_nan() {
        let rescaled = min_max_rescale(&[0.25, 0.25]);
        assert!(rescaled.iter().all(|v| v.is_nan()));
    }

    #[rstest]
    #[case(&[0.0, 1.0], &[0.0, 1.0], 0.5)]
    #[case(&[0.0, 0.5, 1.0], &[1.0, 1.0, 1.0], 1.0)]
    #[case(&[1.0, 0.5, 0.0], &[1.0, 1.0, 1.0], 1.0)]
    #[case(&[0.0, 0.0, 1.0], &[0.0, 1.0, 1.0], 1.0)]
    fn trapezoid_matches_known_areas(
        #[case] x: &[f64],
        #[case] y: &[f64],
        #[case] expected: f64,
    ) {
        assert_relative_eq!(trapezoid_auc(x, y).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn trapezoid_rejects_degenerate_curves() {
        assert_eq!(
            trapezoid_auc(&[0.5], &[1.0]),
            Err(ArrayError::TooFewPoints { points: 1 })
        );
        assert_eq!(
            trapezoid_auc(&[0.0, 1.0, 0.5], &[0.0, 1.0, 1.0]),
            Err(ArrayError::NonMonotonic)
        );
        assert_eq!(
            trapezoid_auc(&[0.0, 1.0], &[0.0]),
            Err(ArrayError::LengthMismatch { x: 2, y: 1 })
        );
    }

    #[test]
    fn trapezoid_propagates_nan() {
        let area = trapezoid_auc(&[f64::NAN, f64::NAN], &[0.0, 1.0]).unwrap();
        assert!(area.is_nan());
    }
}
