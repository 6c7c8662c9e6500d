//! # Parallelism Utilities (CPU Threading)
//!
//! Evaluates an objective on many candidate parameter sets at once using
//! `rayon`. Gradient estimators use this to score their perturbations; the
//! optimizer itself stays single-threaded.

use crate::tensor::TensorData;
use ndarray::ArrayD;
use rayon::prelude::*;

/// One full set of parameter values, in parameter-group order.
pub type Candidate = Vec<ArrayD<TensorData>>;

/// Scores every candidate with `objective`, in parallel.
///
/// The result has one loss per candidate, in the same order as `candidates`.
pub fn evaluate_all<F>(objective: &F, candidates: &[Candidate]) -> Vec<TensorData>
where
    F: Fn(&[ArrayD<TensorData>]) -> TensorData + Sync,
{
    candidates
        .par_iter()
        .map(|candidate| objective(candidate.as_slice()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn keeps_candidate_order() {
        let candidates: Vec<Candidate> = (0..64)
            .map(|i| vec![ArrayD::from_elem(IxDyn(&[2]), i as TensorData)])
            .collect();
        let sum = |xs: &[ArrayD<TensorData>]| xs.iter().map(|x| x.sum()).sum::<TensorData>();

        let losses = evaluate_all(&sum, &candidates);
        let expected: Vec<TensorData> = (0..64).map(|i| 2.0 * i as TensorData).collect();
        assert_eq!(losses, expected);
    }

    #[test]
    fn empty_input_gives_no_losses() {
        let zero = |_: &[ArrayD<TensorData>]| 0.0;
        assert!(evaluate_all(&zero, &[]).is_empty());
    }
}
