//! # ZO-AdaMM Core Library
//!
//! This crate provides a zeroth-order adaptive momentum optimizer: it updates
//! `ndarray`-backed parameter tensors using gradient *estimates* supplied by
//! an external estimator, tracking Adam-style moments plus an AMSGrad
//! running maximum.
//!
//! ```
//! use zo_adamm::prelude::*;
//! use ndarray::{ArrayD, IxDyn};
//!
//! let w = zo_adamm::tensor::full(&[3], 1.0);
//! let mut optimizer = ZoAdaMM::new(vec![w.clone()], Some(1e-2), None, None, None).unwrap();
//!
//! // Any `FnMut(usize, f32) -> Vec<ArrayD<f32>>` can act as the estimator.
//! let mut estimator = |_d: usize, _mu: f32| vec![ArrayD::from_elem(IxDyn(&[3]), 0.5)];
//! optimizer.step(&mut estimator).unwrap();
//! assert!(w.data().iter().all(|&x| x < 1.0));
//! ```

pub mod optim;
pub mod tensor;
pub mod utils;

pub mod prelude {
    pub use crate::optim::{
        GradientEstimator, Hyperparameters, OptimError, ParamGroup, RandomDirectionEstimator,
        ZerothOrderOptimizer, ZoAdaMM,
    };
    pub use crate::tensor::{Tensor, TensorData};
}
