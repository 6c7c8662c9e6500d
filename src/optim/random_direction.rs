//! # Random-Direction Gradient Estimator
//!
//! Two-point estimator over directions drawn uniformly from the unit sphere:
//!
//! ```text
//! g = d / (q * mu) * sum_i (f(x + mu * u_i) - f(x)) * u_i
//! ```
//!
//! where `d` is the flattened dimensionality and `q` the number of directions.
//! Perturbed objectives are evaluated in parallel.

use super::GradientEstimator;
use crate::tensor::{Tensor, TensorData};
use crate::utils::parallel::{self, Candidate};
use log::warn;
use ndarray::{ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Estimates gradients of `objective` at the current values of `params`.
///
/// The estimator holds handles to the same tensors the optimizer updates, so
/// it always perturbs the latest values. It serves one parameter group.
pub struct RandomDirectionEstimator<F> {
    params: Vec<Tensor>,
    objective: F,
    num_directions: usize,
    rng: StdRng,
}

impl<F> RandomDirectionEstimator<F>
where
    F: Fn(&[ArrayD<TensorData>]) -> TensorData + Sync,
{
    /// Creates an estimator using one direction per call and an entropy-seeded RNG.
    pub fn new<I>(params: I, objective: F) -> Self
    where
        I: IntoIterator<Item = Tensor>,
    {
        RandomDirectionEstimator {
            params: params.into_iter().collect(),
            objective,
            num_directions: 1,
            rng: StdRng::from_entropy(),
        }
    }

    /// Number of directions averaged per estimate (at least one).
    pub fn num_directions(mut self, q: usize) -> Self {
        self.num_directions = q.max(1);
        self
    }

    /// Makes the sampled directions reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn dimension(&self) -> usize {
        self.params.iter().map(Tensor::numel).sum()
    }

    /// Unit vector in `d` dimensions, uniform on the sphere.
    fn sample_direction(&mut self, d: usize) -> Vec<TensorData> {
        loop {
            let u: Vec<f64> = (0..d)
                .map(|_| self.rng.sample::<f64, _>(StandardNormal))
                .collect();
            let norm = u.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                return u.iter().map(|x| (x / norm) as TensorData).collect();
            }
        }
    }

    fn zero_estimates(&self) -> Vec<ArrayD<TensorData>> {
        self.params
            .iter()
            .map(|p| ArrayD::zeros(IxDyn(p.shape())))
            .collect()
    }
}

/// Copies `base` and adds `scale * flat` to it, walking elements in
/// row-major order across the tensors.
fn offset(base: &[ArrayD<TensorData>], flat: &[TensorData], scale: TensorData) -> Candidate {
    let mut values = flat.iter();
    base.iter()
        .map(|array| {
            let mut shifted = array.clone();
            for (x, &u) in shifted.iter_mut().zip(values.by_ref()) {
                *x += scale * u;
            }
            shifted
        })
        .collect()
}

impl<F> GradientEstimator for RandomDirectionEstimator<F>
where
    F: Fn(&[ArrayD<TensorData>]) -> TensorData + Sync,
{
    fn estimate(
        &mut self,
        total_parameter_count: usize,
        perturbation_scale: TensorData,
    ) -> Vec<ArrayD<TensorData>> {
        let d = self.dimension();
        if total_parameter_count != d {
            warn!(
                "asked for a {}-dimensional estimate but tracking {} elements; using {}",
                total_parameter_count, d, d
            );
        }
        let mu = perturbation_scale;
        if d == 0 || mu == 0.0 {
            return self.zero_estimates();
        }

        let base: Vec<ArrayD<TensorData>> = self.params.iter().map(Tensor::data_clone).collect();
        let q = self.num_directions;
        let directions: Vec<Vec<TensorData>> = (0..q).map(|_| self.sample_direction(d)).collect();
        let candidates: Vec<Candidate> = directions.iter().map(|u| offset(&base, u, mu)).collect();

        let f0 = (self.objective)(&base);
        let losses = parallel::evaluate_all(&self.objective, &candidates);

        let scale = d as TensorData / (q as TensorData * mu);
        let mut flat = vec![0.0 as TensorData; d];
        for (u, f) in directions.iter().zip(losses) {
            let weight = scale * (f - f0);
            for (g, &ui) in flat.iter_mut().zip(u) {
                *g += weight * ui;
            }
        }

        let zeros = self.zero_estimates();
        offset(&zeros, &flat, 1.0)
    }
}
