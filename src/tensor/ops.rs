//! # Tensor Operations
//!
//! In-place element-wise kernels for the moment updates. Every kernel checks
//! that its operands have identical shapes; none of them broadcasts.

use super::{TensorData, TensorError};
use ndarray::{ArrayD, Zip};

fn check_same_shape(target: &[usize], other: &[usize]) -> Result<(), TensorError> {
    if target != other {
        return Err(TensorError::ShapeMismatch {
            expected: target.to_vec(),
            got: other.to_vec(),
        });
    }
    Ok(())
}

/// Exponential moving average: `avg = beta * avg + (1 - beta) * sample`.
pub fn ema_(
    avg: &mut ArrayD<TensorData>,
    sample: &ArrayD<TensorData>,
    beta: TensorData,
) -> Result<(), TensorError> {
    check_same_shape(avg.shape(), sample.shape())?;
    let weight = 1.0 - beta;
    Zip::from(avg)
        .and(sample)
        .for_each(|a, &g| *a = *a * beta + weight * g);
    Ok(())
}

/// Exponential moving average of squares: `avg = beta * avg + (1 - beta) * sample^2`.
pub fn ema_sq_(
    avg: &mut ArrayD<TensorData>,
    sample: &ArrayD<TensorData>,
    beta: TensorData,
) -> Result<(), TensorError> {
    check_same_shape(avg.shape(), sample.shape())?;
    let weight = 1.0 - beta;
    Zip::from(avg)
        .and(sample)
        .for_each(|a, &g| *a = *a * beta + weight * (g * g));
    Ok(())
}

/// Element-wise running maximum: `acc = max(acc, other)`.
/// NaN in `other` propagates into `acc`.
pub fn maximum_(
    acc: &mut ArrayD<TensorData>,
    other: &ArrayD<TensorData>,
) -> Result<(), TensorError> {
    check_same_shape(acc.shape(), other.shape())?;
    Zip::from(acc).and(other).for_each(|m, &v| {
        if v > *m || v.is_nan() {
            *m = v;
        }
    });
    Ok(())
}

/// `target = target + value * numer / (sqrt(denom_sq) + eps)`.
pub fn addcdiv_sqrt_(
    target: &mut ArrayD<TensorData>,
    numer: &ArrayD<TensorData>,
    denom_sq: &ArrayD<TensorData>,
    eps: TensorData,
    value: TensorData,
) -> Result<(), TensorError> {
    check_same_shape(target.shape(), numer.shape())?;
    check_same_shape(target.shape(), denom_sq.shape())?;
    Zip::from(target)
        .and(numer)
        .and(denom_sq)
        .for_each(|p, &m, &v| *p += value * m / (v.sqrt() + eps));
    Ok(())
}
