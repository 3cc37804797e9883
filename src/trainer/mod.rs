//! Binary SVM trainer
//!
//! `BinarySVM` owns the training parameters, the kernel, the kernel cache and
//! the random source used for partner sweeps. `train` validates its inputs,
//! drives the SMO solver and keeps the resulting multipliers, weight vector,
//! bias and error cache for inspection and prediction.

use crate::cache::KernelCache;
use crate::core::{
    Dataset, Prediction, Result, SVMError, SVMModel, TrainerConfig, TrainingSummary,
};
use crate::kernel::{Kernel, LinearKernel};
use crate::solver::{SMOSolver, SolverState};
use log::{info, warn};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// State kept after a training run
#[derive(Debug, Clone)]
struct TrainedState {
    solver: SolverState,
    labels: Vec<f64>,
    summary: TrainingSummary,
}

/// Binary SVM classifier trained with SMO
pub struct BinarySVM<K: Kernel = LinearKernel> {
    config: TrainerConfig,
    kernel: K,
    cache: KernelCache,
    rng: StdRng,
    trained: Option<TrainedState>,
}

impl<K: Kernel> BinarySVM<K> {
    /// Create a trainer
    ///
    /// Without an external cache a fresh one is created. Passing a cache (or
    /// a view of one) lets several trainers share kernel values.
    pub fn new(
        c: f64,
        tolerance: f64,
        max_iterations: usize,
        kernel: K,
        cache: Option<KernelCache>,
    ) -> Self {
        Self::with_config(TrainerConfig::new(c, tolerance, max_iterations), kernel, cache)
    }

    /// Create a trainer from a full configuration
    pub fn with_config(config: TrainerConfig, kernel: K, cache: Option<KernelCache>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            kernel,
            cache: cache.unwrap_or_default(),
            rng,
            trained: None,
        }
    }

    /// Seed the random partner sweeps for reproducible training
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Use the given random source for the partner sweeps
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Train on `data` with one label in {-1, +1} per row
    ///
    /// Replaces the state of any previous run. Reaching the iteration cap is
    /// not an error; check `TrainingSummary::converged`.
    pub fn train<D: Dataset + ?Sized>(
        &mut self,
        data: &D,
        labels: &[f64],
    ) -> Result<TrainingSummary> {
        self.config.validate()?;
        if data.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        if labels.len() != data.n_samples() {
            return Err(SVMError::DimensionMismatch {
                expected: data.n_samples(),
                actual: labels.len(),
            });
        }
        if let Some(&label) = labels.iter().find(|&&y| y != 1.0 && y != -1.0) {
            return Err(SVMError::InvalidLabel(label));
        }

        info!(
            "Training on {} examples with {} features (C={}, tolerance={}, max_iterations={})",
            data.n_samples(),
            data.n_features(),
            self.config.c,
            self.config.tolerance,
            self.config.max_iterations
        );

        let mut solver = SMOSolver::new(
            &self.kernel,
            &self.cache,
            data,
            labels,
            &self.config,
            &mut self.rng,
        )?;
        let outcome = solver.run(self.config.max_iterations);
        let state = solver.into_state();

        let summary = TrainingSummary {
            iterations: outcome.iterations,
            successful_steps: outcome.successful_steps,
            converged: outcome.converged,
            n_support_vectors: state.alpha.iter().filter(|&&a| a > 0.0).count(),
            bias: state.bias,
        };

        if !summary.converged {
            warn!(
                "Stopped after {} sweeps without a quiet examine-all sweep",
                summary.iterations
            );
        }
        info!(
            "Training finished: {} sweeps, {} pair updates, {} support vectors, cache hit rate {:.2}",
            summary.iterations,
            summary.successful_steps,
            summary.n_support_vectors,
            self.cache.hit_rate()
        );

        self.trained = Some(TrainedState {
            solver: state,
            labels: labels.to_vec(),
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Decision function `W·x - B`; identically zero before training
    ///
    /// # Panics
    /// Panics if a trained model is given a vector of the wrong length.
    pub fn decision_score(&self, x: ArrayView1<f64>) -> f64 {
        match &self.trained {
            Some(trained) => trained.solver.decision_score(x),
            None => 0.0,
        }
    }

    /// Decision function with the model state and vector length checked
    pub fn try_decision_score(&self, x: ArrayView1<f64>) -> Result<f64> {
        let trained = self.trained.as_ref().ok_or(SVMError::ModelNotTrained)?;
        let expected = trained.solver.weights.len();
        if x.len() != expected {
            return Err(SVMError::DimensionMismatch {
                expected,
                actual: x.len(),
            });
        }
        Ok(trained.solver.decision_score(x))
    }

    /// Whether `train` has completed at least once
    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    /// Lagrange multipliers of the last run (empty before training)
    pub fn alpha(&self) -> &[f64] {
        self.trained
            .as_ref()
            .map(|trained| trained.solver.alpha.as_slice())
            .unwrap_or_default()
    }

    /// Weight vector of the last run
    pub fn weights(&self) -> Option<ArrayView1<'_, f64>> {
        self.trained
            .as_ref()
            .map(|trained| trained.solver.weights.view())
    }

    /// Error cache `u(x_i) - y_i` of the last run (empty before training)
    pub fn errors(&self) -> &[f64] {
        self.trained
            .as_ref()
            .map(|trained| trained.solver.errors.as_slice())
            .unwrap_or_default()
    }

    /// Summary of the last run
    pub fn summary(&self) -> Option<&TrainingSummary> {
        self.trained.as_ref().map(|trained| &trained.summary)
    }

    /// Indices of training examples with a non-zero multiplier
    pub fn support_vector_indices(&self) -> Vec<usize> {
        self.alpha()
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a > 0.0 { Some(i) } else { None })
            .collect()
    }

    /// Indices whose multiplier still violates the margin KKT conditions
    ///
    /// Uses `y_i * E_i`, i.e. `y_i * u(x_i) - 1`, against the tolerance. An
    /// empty result after a capped run means the model is optimal anyway.
    pub fn kkt_violations(&self) -> Vec<usize> {
        let Some(trained) = &self.trained else {
            return Vec::new();
        };
        let (c, tol) = (self.config.c, self.config.tolerance);
        trained
            .labels
            .iter()
            .zip(&trained.solver.alpha)
            .zip(&trained.solver.errors)
            .enumerate()
            .filter_map(|(i, ((&y, &a), &e))| {
                let r = y * e;
                if (r < -tol && a < c) || (r > tol && a > 0.0) {
                    Some(i)
                } else {
                    None
                }
            })
            .collect()
    }

    /// The kernel cache (or view) used for training
    pub fn cache(&self) -> &KernelCache {
        &self.cache
    }

    /// Get the trainer configuration
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Get the kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Kernel> SVMModel for BinarySVM<K> {
    fn predict(&self, x: ArrayView1<f64>) -> Prediction {
        Prediction::from_decision_value(self.decision_score(x))
    }

    fn n_support_vectors(&self) -> usize {
        self.alpha().iter().filter(|&&a| a > 0.0).count()
    }

    fn bias(&self) -> f64 {
        self.trained
            .as_ref()
            .map_or(0.0, |trained| trained.solver.bias)
    }
}
