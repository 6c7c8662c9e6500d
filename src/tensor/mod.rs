//! # Tensor Module
//!
//! This module defines the `Tensor` handle the optimizer works on, plus the
//! in-place element-wise kernels of the update rule (`ops`).

use ndarray::{ArrayD, IxDyn};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// --- Submodules ---
pub mod ops;

// --- Error Handling ---
#[derive(thiserror::Error, Debug)]
pub enum TensorError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("ndarray error: {0}")]
    NdarrayError(#[from] ndarray::ShapeError),
}

// Define a type alias for the underlying data type
pub type TensorData = f32;

/// # Tensor
///
/// A shared handle to an owned dense `ndarray::ArrayD` buffer.
///
/// Cloning a `Tensor` clones the handle, not the data: every clone reads and
/// writes the same buffer. This is how a training loop keeps access to the
/// parameters it hands to an optimizer.
#[derive(Clone, Debug)]
pub struct Tensor {
    data: Arc<RwLock<ArrayD<TensorData>>>,
    // Fixed at creation.
    shape: Vec<usize>,
}

impl Tensor {
    /// Creates a new Tensor owning `data`.
    pub fn new(data: ArrayD<TensorData>) -> Self {
        let shape = data.shape().to_vec();
        Tensor {
            data: Arc::new(RwLock::new(data)),
            shape,
        }
    }

    /// Creates a Tensor from a flat row-major vector.
    pub fn from_vec(shape: &[usize], values: Vec<TensorData>) -> Result<Self, TensorError> {
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Ok(Self::new(data))
    }

    /// Identity of the underlying buffer. Two handles share an id iff they
    /// share storage; equal values in distinct buffers get distinct ids.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the total number of elements (the flattened length).
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Provides read-only access to the underlying data.
    /// Note: This locks the RwLock for reading.
    pub fn data(&self) -> RwLockReadGuard<'_, ArrayD<TensorData>> {
        self.data.read().expect("Tensor data RwLock poisoned")
    }

    /// Provides mutable access to the underlying data.
    /// Note: This locks the RwLock for writing.
    pub fn data_mut(&self) -> RwLockWriteGuard<'_, ArrayD<TensorData>> {
        self.data.write().expect("Tensor data RwLock poisoned")
    }

    /// Clones the underlying data into a new ArrayD.
    pub fn data_clone(&self) -> ArrayD<TensorData> {
        self.data().clone()
    }
}

// --- Helper functions ---

/// Helper to create a tensor filled with zeros.
pub fn zeros(shape: &[usize]) -> Tensor {
    Tensor::new(ArrayD::zeros(IxDyn(shape)))
}

/// Helper to create a tensor filled with `value`.
pub fn full(shape: &[usize], value: TensorData) -> Tensor {
    Tensor::new(ArrayD::from_elem(IxDyn(shape), value))
}
