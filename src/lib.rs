//! Binary Support Vector Machine trained with Sequential Minimal Optimization
//!
//! Based on "Sequential Minimal Optimization: A Fast Algorithm for Training
//! Support Vector Machines" by John C. Platt.
//!
//! Kernel values are memoized in a [`KernelCache`] that can be sliced into
//! index-remapped views sharing one store, so models trained on subsets of a
//! dataset reuse each other's kernel evaluations.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod solver;
pub mod trainer;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::DenseDataset;
pub use crate::kernel::{Kernel, LinearKernel};
pub use crate::solver::{SMOSolver, SolverState, SweepOutcome};
pub use crate::trainer::BinarySVM;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
