//! Minimises a shifted quadratic using only function evaluations.
//!
//! Run with `RUST_LOG=info cargo run --example quadratic`.

use log::info;
use ndarray::{ArrayD, IxDyn};
use zo_adamm::prelude::*;
use zo_adamm::tensor::zeros;

fn main() -> Result<(), OptimError> {
    env_logger::init();

    let target = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, -2.0, 0.5, 3.0, 0.0, -1.0])
        .expect("target shape");
    let loss = move |xs: &[ArrayD<TensorData>]| (&xs[0] - &target).mapv(|e| e * e).sum();

    let weights = zeros(&[2, 3]);
    let hyperparameters = Hyperparameters {
        lr: 5e-2,
        mu: 1e-3,
        ..Default::default()
    };
    let mut optimizer =
        ZoAdaMM::with_groups(vec![ParamGroup::new(vec![weights.clone()])], hyperparameters)?;
    let mut estimator = RandomDirectionEstimator::new(vec![weights.clone()], loss.clone())
        .num_directions(16)
        .seed(23);

    for epoch in 0..=500 {
        if epoch % 50 == 0 {
            info!("epoch {:>3} | loss {:.6}", epoch, loss(&[weights.data_clone()]));
        }
        optimizer.step(&mut estimator)?;
    }
    println!("final weights:\n{}", weights.data());
    Ok(())
}
