//! Core traits for SVM training

use crate::core::Prediction;
use ndarray::{Array2, ArrayView1, Axis};

/// Row-addressable dense feature matrix
///
/// Rows are 0-based and contiguous. The trainer only ever reads rows, so
/// implementations can hand out borrowed views into their own storage.
pub trait Dataset {
    /// Number of rows (training examples)
    fn n_samples(&self) -> usize;

    /// Number of columns (features per example)
    fn n_features(&self) -> usize;

    /// Borrow row `i`
    ///
    /// # Panics
    /// Panics if `i >= n_samples()`
    fn row(&self, i: usize) -> ArrayView1<'_, f64>;

    /// Check if the dataset has no rows
    fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }
}

impl Dataset for Array2<f64> {
    fn n_samples(&self) -> usize {
        self.nrows()
    }

    fn n_features(&self) -> usize {
        self.ncols()
    }

    fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.index_axis(Axis(0), i)
    }
}

/// Trained binary classifier
pub trait SVMModel {
    /// Predict a single feature vector
    fn predict(&self, x: ArrayView1<f64>) -> Prediction;

    /// Predict every row of a dataset
    fn predict_batch<D: Dataset + ?Sized>(&self, data: &D) -> Vec<Prediction>
    where
        Self: Sized,
    {
        (0..data.n_samples())
            .map(|i| self.predict(data.row(i)))
            .collect()
    }

    /// Number of examples with a non-zero multiplier
    fn n_support_vectors(&self) -> usize;

    /// Bias term B of the decision function `W·x - B`
    fn bias(&self) -> f64;
}
