//! # Utility Functions (`utils`)
//!
//! Helpers shared by gradient estimators.

pub mod parallel;

pub use parallel::evaluate_all;
