//! # Gradient Estimators
//!
//! The contract between a zeroth-order optimizer and whatever approximates
//! the gradient for it.

use crate::tensor::TensorData;
use ndarray::ArrayD;

/// Produces one gradient estimate per parameter of a group.
///
/// The optimizer calls [`estimate`](GradientEstimator::estimate) exactly once
/// per parameter group and step, passing the group's flattened dimensionality
/// and its perturbation scale `mu`. The returned vector must follow the
/// group's parameter order, and each array must have the matching
/// parameter's shape. How the estimate is computed is up to the implementor.
pub trait GradientEstimator {
    fn estimate(
        &mut self,
        total_parameter_count: usize,
        perturbation_scale: TensorData,
    ) -> Vec<ArrayD<TensorData>>;
}

impl<F> GradientEstimator for F
where
    F: FnMut(usize, TensorData) -> Vec<ArrayD<TensorData>>,
{
    fn estimate(
        &mut self,
        total_parameter_count: usize,
        perturbation_scale: TensorData,
    ) -> Vec<ArrayD<TensorData>> {
        self(total_parameter_count, perturbation_scale)
    }
}
