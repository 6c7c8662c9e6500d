//! # ZO-AdaMM Optimizer
//!
//! Zeroth-order adaptive momentum method: Adam-style first and second moment
//! averages over *estimated* gradients, with an AMSGrad running maximum of
//! the second moment.
//!
//! Reference: ZO-AdaMM: Zeroth-Order Adaptive Momentum Method for Black-Box
//! Optimization - https://arxiv.org/abs/1910.06513
//!
//! No bias correction is applied to either moment, and the update divides by
//! `sqrt(exp_avg_sq)`, not `sqrt(max_exp_avg_sq)`; the running maximum is
//! tracked for introspection only.

use super::{
    GradientEstimator, Hyperparameters, MismatchKind, OptimError, ParamGroup,
    ZerothOrderOptimizer,
};
use crate::tensor::{ops, Tensor, TensorData};
use log::{debug, info, trace};
use ndarray::{ArrayD, IxDyn};
use std::collections::{HashMap, HashSet};

/// Moment buffers of one parameter, created lazily on its first step.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamState {
    exp_avg: ArrayD<TensorData>,
    exp_avg_sq: ArrayD<TensorData>,
    max_exp_avg_sq: ArrayD<TensorData>,
}

impl ParamState {
    fn zeros(shape: &[usize]) -> Self {
        ParamState {
            exp_avg: ArrayD::zeros(IxDyn(shape)),
            exp_avg_sq: ArrayD::zeros(IxDyn(shape)),
            max_exp_avg_sq: ArrayD::zeros(IxDyn(shape)),
        }
    }

    /// Exponential moving average of the gradient estimates.
    pub fn exp_avg(&self) -> &ArrayD<TensorData> {
        &self.exp_avg
    }

    /// Exponential moving average of the squared gradient estimates.
    pub fn exp_avg_sq(&self) -> &ArrayD<TensorData> {
        &self.exp_avg_sq
    }

    /// Element-wise maximum of every `exp_avg_sq` seen so far.
    pub fn max_exp_avg_sq(&self) -> &ArrayD<TensorData> {
        &self.max_exp_avg_sq
    }
}

/// A parameter group after its overrides have been merged and validated.
#[derive(Clone, Debug)]
pub struct OptimizationGroup {
    params: Vec<Tensor>,
    hyperparameters: Hyperparameters,
}

impl OptimizationGroup {
    pub fn params(&self) -> &[Tensor] {
        &self.params
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    /// Sum of the flattened sizes of every parameter in the group.
    pub fn total_parameter_count(&self) -> usize {
        self.params.iter().map(Tensor::numel).sum()
    }
}

/// Implements the ZO-AdaMM algorithm.
pub struct ZoAdaMM {
    groups: Vec<OptimizationGroup>,
    defaults: Hyperparameters,

    // State stored per parameter, keyed by buffer identity (`Tensor::id`)
    state: HashMap<usize, ParamState>,
    // Completed calls to step(); informational only
    steps: usize,
}

impl ZoAdaMM {
    /// Creates a ZO-AdaMM optimizer over a single group of parameters.
    ///
    /// # Arguments
    /// * `params`: The parameters to optimize.
    /// * `lr`: Learning rate (default: 1e-3).
    /// * `betas`: Decay rates of the moment averages (default: (0.9, 0.999)).
    /// * `mu`: Perturbation scale passed to the estimator (default: 1e-5).
    /// * `eps`: Term added to the denominator (default: 1e-12).
    pub fn new<I>(
        params: I,
        lr: Option<TensorData>,
        betas: Option<(TensorData, TensorData)>,
        mu: Option<TensorData>,
        eps: Option<TensorData>,
    ) -> Result<Self, OptimError>
    where
        I: IntoIterator<Item = Tensor>,
    {
        let base = Hyperparameters::default();
        let defaults = Hyperparameters {
            lr: lr.unwrap_or(base.lr),
            betas: betas.unwrap_or(base.betas),
            mu: mu.unwrap_or(base.mu),
            eps: eps.unwrap_or(base.eps),
        };
        Self::with_groups(vec![ParamGroup::new(params)], defaults)
    }

    /// Creates an optimizer from explicit parameter groups. Settings a group
    /// does not override are taken from `defaults`.
    pub fn with_groups<I>(groups: I, defaults: Hyperparameters) -> Result<Self, OptimError>
    where
        I: IntoIterator<Item = ParamGroup>,
    {
        defaults.validate()?;

        let mut optimizer = ZoAdaMM {
            groups: Vec::new(),
            defaults,
            state: HashMap::new(),
            steps: 0,
        };
        for group in groups {
            optimizer.add_param_group(group)?;
        }
        if optimizer.groups.is_empty() {
            return Err(OptimError::EmptyParameterList { group: 0 });
        }

        info!(
            "ZO-AdaMM over {} group(s), {} parameter tensor(s)",
            optimizer.groups.len(),
            optimizer.groups.iter().map(|g| g.params.len()).sum::<usize>()
        );
        Ok(optimizer)
    }

    /// Appends a parameter group. Its parameters must not already be tracked
    /// by another group.
    pub fn add_param_group(&mut self, group: ParamGroup) -> Result<(), OptimError> {
        let index = self.groups.len();
        let hyperparameters = group.resolve(&self.defaults);
        hyperparameters.validate()?;

        let params = group.into_params();
        if params.is_empty() {
            return Err(OptimError::EmptyParameterList { group: index });
        }

        let mut seen: HashSet<usize> = self
            .groups
            .iter()
            .flat_map(|g| g.params.iter().map(Tensor::id))
            .collect();
        for (i, param) in params.iter().enumerate() {
            if !seen.insert(param.id()) {
                return Err(OptimError::DuplicateParameter { group: index, index: i });
            }
        }

        self.groups.push(OptimizationGroup {
            params,
            hyperparameters,
        });
        Ok(())
    }

    pub fn param_groups(&self) -> &[OptimizationGroup] {
        &self.groups
    }

    pub fn defaults(&self) -> &Hyperparameters {
        &self.defaults
    }

    /// Moment buffers of `param`, or `None` before its first step.
    pub fn state(&self, param: &Tensor) -> Option<&ParamState> {
        self.state.get(&param.id())
    }

    /// Number of parameters that have moment buffers.
    pub fn state_len(&self) -> usize {
        self.state.len()
    }

    /// Number of successfully completed steps.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl ZerothOrderOptimizer for ZoAdaMM {
    fn step(&mut self, estimator: &mut dyn GradientEstimator) -> Result<(), OptimError> {
        for (group_index, group) in self.groups.iter().enumerate() {
            let hp = group.hyperparameters;
            let (beta1, beta2) = hp.betas;

            let size_params = group.total_parameter_count();
            debug!(
                "step {}: group {} estimating d={} with mu={}",
                self.steps, group_index, size_params, hp.mu
            );
            let grad_est = estimator.estimate(size_params, hp.mu);

            if grad_est.len() != group.params.len() {
                return Err(OptimError::ShapeMismatch {
                    group: group_index,
                    kind: MismatchKind::Count {
                        expected: group.params.len(),
                        got: grad_est.len(),
                    },
                });
            }

            for (i, (param, grad)) in group.params.iter().zip(&grad_est).enumerate() {
                let mismatch = || OptimError::ShapeMismatch {
                    group: group_index,
                    kind: MismatchKind::Shape {
                        index: i,
                        expected: param.shape().to_vec(),
                        got: grad.shape().to_vec(),
                    },
                };
                if grad.shape() != param.shape() {
                    return Err(mismatch());
                }

                // Lazy state initialization
                let state = self.state.entry(param.id()).or_insert_with(|| {
                    trace!("initializing moments for parameter {} of group {}", i, group_index);
                    ParamState::zeros(param.shape())
                });

                ops::ema_(&mut state.exp_avg, grad, beta1).map_err(|_| mismatch())?;
                ops::ema_sq_(&mut state.exp_avg_sq, grad, beta2).map_err(|_| mismatch())?;
                ops::maximum_(&mut state.max_exp_avg_sq, &state.exp_avg_sq)
                    .map_err(|_| mismatch())?;

                // Denominator is the current second moment, not the running max.
                let mut param_data = param.data_mut();
                ops::addcdiv_sqrt_(
                    &mut param_data,
                    &state.exp_avg,
                    &state.exp_avg_sq,
                    hp.eps,
                    -hp.lr,
                )
                .map_err(|_| mismatch())?;
            }
        }

        self.steps += 1;
        Ok(())
    }

    fn num_groups(&self) -> usize {
        self.groups.len()
    }
}
