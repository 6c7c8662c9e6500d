use approx::assert_abs_diff_eq;
use ndarray::{ArrayD, IxDyn};
use zo_adamm::optim::MismatchKind;
use zo_adamm::prelude::*;
use zo_adamm::tensor::{full, zeros};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn target() -> Vec<ArrayD<TensorData>> {
    vec![
        ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, -1.0, 0.5, 2.0]).unwrap(),
        ArrayD::from_shape_vec(IxDyn(&[3]), vec![-0.5, 0.0, 1.5]).unwrap(),
    ]
}

fn squared_distance(target: Vec<ArrayD<TensorData>>) -> impl Fn(&[ArrayD<TensorData>]) -> TensorData + Sync {
    move |xs: &[ArrayD<TensorData>]| {
        xs.iter()
            .zip(&target)
            .map(|(x, t)| (x - t).mapv(|e| e * e).sum())
            .sum()
    }
}

#[test]
fn minimizes_a_quadratic_from_estimates_alone() {
    init_logger();
    let w = zeros(&[2, 2]);
    let b = Tensor::from_vec(&[3], vec![0.5, 0.5, 0.5]).unwrap();
    let loss = squared_distance(target());
    let initial = loss(&[w.data_clone(), b.data_clone()]);

    let mut optimizer = ZoAdaMM::new(
        vec![w.clone(), b.clone()],
        Some(2e-2),
        Some((0.9, 0.999)),
        Some(1e-3),
        None,
    )
    .unwrap();
    let mut estimator = RandomDirectionEstimator::new(vec![w.clone(), b.clone()], loss)
        .num_directions(20)
        .seed(23);

    for _ in 0..600 {
        optimizer.step(&mut estimator).unwrap();
    }

    let last = squared_distance(target())(&[w.data_clone(), b.data_clone()]);
    assert!(
        last < 0.05 * initial,
        "loss went from {} to {}",
        initial,
        last
    );
    assert_eq!(optimizer.steps(), 600);
}

#[test]
fn groups_share_one_estimator_call_each() {
    init_logger();
    let fast = full(&[2], 1.0);
    let slow = full(&[2], 1.0);
    let defaults = Hyperparameters::default();
    let mut optimizer = ZoAdaMM::with_groups(
        vec![
            ParamGroup::new(vec![fast.clone()]).lr(1e-1),
            ParamGroup::new(vec![slow.clone()]).lr(1e-3),
        ],
        defaults,
    )
    .unwrap();

    let mut calls = 0;
    let mut estimator = |d: usize, mu: TensorData| {
        calls += 1;
        assert_eq!(d, 2);
        assert_eq!(mu, defaults.mu);
        vec![ArrayD::from_elem(IxDyn(&[2]), 1.0)]
    };
    optimizer.step(&mut estimator).unwrap();
    assert_eq!(calls, 2);

    // Identical moments, so the step sizes differ exactly by the lr ratio.
    let fast_delta = 1.0 - fast.data()[[0]];
    let slow_delta = 1.0 - slow.data()[[0]];
    assert_abs_diff_eq!(fast_delta, 100.0 * slow_delta, epsilon = 1e-4);
    assert_eq!(
        optimizer.state(&fast).unwrap().exp_avg(),
        optimizer.state(&slow).unwrap().exp_avg()
    );
}

#[test]
fn shape_errors_surface_through_the_public_api() {
    let p = zeros(&[3]);
    let mut optimizer = ZoAdaMM::new(vec![p.clone()], None, None, None, None).unwrap();
    let mut estimator = |_: usize, _: TensorData| vec![ArrayD::zeros(IxDyn(&[1, 3]))];
    let err = optimizer.step(&mut estimator).unwrap_err();
    match &err {
        OptimError::ShapeMismatch {
            group: 0,
            kind: MismatchKind::Shape { index: 0, expected, got },
        } => {
            assert_eq!(expected, &vec![3]);
            assert_eq!(got, &vec![1, 3]);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("parameter group 0"));
}
