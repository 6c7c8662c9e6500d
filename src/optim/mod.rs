//! # Optimization Algorithms (`optim`)
//!
//! Zeroth-order optimizers: parameter updates driven by *estimated*
//! gradients supplied by a [`GradientEstimator`], never by autograd.

use crate::tensor::{Tensor, TensorData};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Submodules ---
pub mod estimator;
pub mod random_direction;
pub mod zo_adamm;

// Re-exports
pub use estimator::GradientEstimator;
pub use random_direction::RandomDirectionEstimator;
pub use zo_adamm::{OptimizationGroup, ParamState, ZoAdaMM};

// --- Errors ---

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OptimError {
    #[error("Invalid {name}: {value} - should be {bound}")]
    InvalidHyperparameter {
        name: &'static str,
        value: TensorData,
        bound: &'static str,
    },
    #[error("Shape mismatch in parameter group {group}: {kind}")]
    ShapeMismatch { group: usize, kind: MismatchKind },
    #[error("Parameter group {group} has an empty parameter list")]
    EmptyParameterList { group: usize },
    #[error("Parameter {index} of group {group} already appears in another parameter group")]
    DuplicateParameter { group: usize, index: usize },
}

/// What disagreed between a gradient estimate and its parameter group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    /// The estimator returned a different number of tensors than there are parameters.
    Count { expected: usize, got: usize },
    /// The estimate at `index` does not have the parameter's shape.
    Shape {
        index: usize,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::Count { expected, got } => {
                write!(f, "expected {} gradient estimates, got {}", expected, got)
            }
            MismatchKind::Shape { index, expected, got } => write!(
                f,
                "estimate {} has shape {:?}, parameter has shape {:?}",
                index, got, expected
            ),
        }
    }
}

// --- Hyperparameters ---

/// Hyperparameters shared by every parameter of one optimization group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Learning rate.
    pub lr: TensorData,
    /// Decay rates of the first and second moment averages.
    pub betas: (TensorData, TensorData),
    /// Perturbation scale handed to the gradient estimator.
    pub mu: TensorData,
    /// Added to the denominator for numerical stability.
    pub eps: TensorData,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            lr: 1e-3,
            betas: (0.9, 0.999),
            mu: 1e-5,
            eps: 1e-12,
        }
    }
}

impl Hyperparameters {
    /// Checks `lr >= 0`, `0 <= beta1, beta2 < 1`, `0 <= mu < 1`, finite `eps`.
    pub fn validate(&self) -> Result<(), OptimError> {
        // Written as negated ranges so NaN is rejected too.
        if !(self.lr >= 0.0) {
            return Err(invalid("learning rate", self.lr, ">= 0.0"));
        }
        if !(0.0 <= self.betas.0 && self.betas.0 < 1.0) {
            return Err(invalid("beta1", self.betas.0, "in [0.0, 1.0)"));
        }
        if !(0.0 <= self.betas.1 && self.betas.1 < 1.0) {
            return Err(invalid("beta2", self.betas.1, "in [0.0, 1.0)"));
        }
        if !(0.0 <= self.mu && self.mu < 1.0) {
            return Err(invalid("mu", self.mu, "in [0.0, 1.0)"));
        }
        if !self.eps.is_finite() {
            return Err(invalid("epsilon", self.eps, "finite"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: TensorData, bound: &'static str) -> OptimError {
    OptimError::InvalidHyperparameter { name, value, bound }
}

// --- Parameter Groups ---

/// A set of parameters sharing one hyperparameter configuration.
///
/// Fields left unset fall back to the optimizer-wide defaults when the group
/// is handed to an optimizer.
#[derive(Debug, Clone)]
pub struct ParamGroup {
    params: Vec<Tensor>,
    lr: Option<TensorData>,
    betas: Option<(TensorData, TensorData)>,
    mu: Option<TensorData>,
    eps: Option<TensorData>,
}

impl ParamGroup {
    pub fn new<I>(params: I) -> Self
    where
        I: IntoIterator<Item = Tensor>,
    {
        ParamGroup {
            params: params.into_iter().collect(),
            lr: None,
            betas: None,
            mu: None,
            eps: None,
        }
    }

    pub fn lr(mut self, lr: TensorData) -> Self {
        self.lr = Some(lr);
        self
    }

    pub fn betas(mut self, betas: (TensorData, TensorData)) -> Self {
        self.betas = Some(betas);
        self
    }

    pub fn mu(mut self, mu: TensorData) -> Self {
        self.mu = Some(mu);
        self
    }

    pub fn eps(mut self, eps: TensorData) -> Self {
        self.eps = Some(eps);
        self
    }

    /// Merges the overrides onto `defaults`.
    pub(crate) fn resolve(&self, defaults: &Hyperparameters) -> Hyperparameters {
        Hyperparameters {
            lr: self.lr.unwrap_or(defaults.lr),
            betas: self.betas.unwrap_or(defaults.betas),
            mu: self.mu.unwrap_or(defaults.mu),
            eps: self.eps.unwrap_or(defaults.eps),
        }
    }

    pub(crate) fn into_params(self) -> Vec<Tensor> {
        self.params
    }
}

// --- Optimizer Trait ---

/// Base trait for optimizers that consume estimated gradients.
pub trait ZerothOrderOptimizer {
    /// Performs a single optimization step: asks `estimator` for one gradient
    /// estimate per parameter group, then updates moments and parameters.
    fn step(&mut self, estimator: &mut dyn GradientEstimator) -> Result<(), OptimError>;

    /// Number of parameter groups managed by the optimizer.
    fn num_groups(&self) -> usize;
}
