//! Kernel trait definition

use ndarray::ArrayView1;

/// Kernel function trait
///
/// A kernel function K(x, y) must be symmetric, `K(x, y) == K(y, x)`, for the
/// kernel cache to be correct: the cache stores each unordered pair once.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64;
}

/// Plain functions and closures are kernels
impl<F> Kernel for F
where
    F: Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 + Send + Sync,
{
    fn compute(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        self(x, y)
    }
}
