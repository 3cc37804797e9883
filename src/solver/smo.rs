//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! Platt's SMO for binary classification: the dual problem is solved by
//! repeatedly optimizing a pair of Lagrange multipliers analytically while the
//! rest stay fixed. The decision function is `u(x) = W·x - B`, with the weight
//! vector `W` maintained incrementally, so the error cache `E_i = u(x_i) - y_i`
//! is exact only for the linear kernel.

use crate::cache::KernelCache;
use crate::core::{Dataset, Result, TrainerConfig};
use crate::kernel::Kernel;
use log::debug;
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Minimum progress a pair update must make, relative to the multiplier size
const STEP_EPSILON: f64 = 1e-3;

/// Mutable training state shared by the pair selection and pair update steps
#[derive(Debug, Clone, PartialEq)]
pub struct SolverState {
    /// Lagrange multipliers, one per example, always within [0, C]
    pub alpha: Vec<f64>,
    /// Weight vector `sum_i alpha_i * y_i * x_i`
    pub weights: Array1<f64>,
    /// Bias term B
    pub bias: f64,
    /// Error cache `u(x_i) - y_i`
    pub errors: Vec<f64>,
}

impl SolverState {
    /// Initial state: all multipliers zero, so the decision function is zero
    /// and every error is `-y_i`
    pub fn new(n_features: usize, labels: &[f64]) -> Self {
        Self {
            alpha: vec![0.0; labels.len()],
            weights: Array1::zeros(n_features),
            bias: 0.0,
            errors: labels.iter().map(|&y| -y).collect(),
        }
    }

    /// Decision function `W·x - B`
    pub fn decision_score(&self, x: ArrayView1<f64>) -> f64 {
        self.weights.dot(&x) - self.bias
    }
}

/// Result of the outer sweep loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Outer sweeps performed
    pub iterations: usize,
    /// Committed pair updates over all sweeps
    pub successful_steps: usize,
    /// True when the loop ended on an examine-all sweep without changes
    pub converged: bool,
}

/// SMO solver for one training run
///
/// Borrows the dataset, kernel, cache and random source for the duration of
/// the run and owns the training state. Labels are expected to be validated
/// by the caller: one label in {-1, +1} per row.
pub struct SMOSolver<'a, K: Kernel + ?Sized, D: Dataset + ?Sized> {
    kernel: &'a K,
    cache: &'a KernelCache,
    data: &'a D,
    labels: &'a [f64],
    c: f64,
    tolerance: f64,
    rng: &'a mut StdRng,
    state: SolverState,
}

impl<'a, K: Kernel + ?Sized, D: Dataset + ?Sized> SMOSolver<'a, K, D> {
    /// Create a solver with the initial all-zero state
    ///
    /// Fails if `config` has a non-positive C or a negative tolerance.
    pub fn new(
        kernel: &'a K,
        cache: &'a KernelCache,
        data: &'a D,
        labels: &'a [f64],
        config: &TrainerConfig,
        rng: &'a mut StdRng,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            kernel,
            cache,
            data,
            labels,
            c: config.c,
            tolerance: config.tolerance,
            rng,
            state: SolverState::new(data.n_features(), labels),
        })
    }

    /// Current training state
    pub fn state(&self) -> &SolverState {
        &self.state
    }

    /// Finish the run and hand the state to the caller
    pub fn into_state(self) -> SolverState {
        self.state
    }

    fn n_samples(&self) -> usize {
        self.labels.len()
    }

    fn is_non_bound(&self, i: usize) -> bool {
        let a = self.state.alpha[i];
        a > 0.0 && a < self.c
    }

    /// Kernel value for rows (i1, i2), computed once and then served from the cache
    pub fn get_kernel(&self, i1: usize, i2: usize) -> f64 {
        if let Some(value) = self.cache.get(i1, i2) {
            return value;
        }
        let value = self
            .kernel
            .compute(self.data.row(i1), self.data.row(i2));
        self.cache.add(i1, i2, value);
        value
    }

    /// Recompute every entry of the error cache from the current decision function
    fn refresh_errors(&mut self) {
        for i in 0..self.n_samples() {
            self.state.errors[i] = self.state.decision_score(self.data.row(i)) - self.labels[i];
        }
    }

    /// Jointly optimize the multipliers of examples `i1` and `i2`
    ///
    /// Returns `false` without touching the state when no worthwhile update
    /// exists: `i1 == i2`, an empty feasible segment, or a negligible change.
    pub fn take_step(&mut self, i1: usize, i2: usize) -> bool {
        if i1 == i2 {
            return false;
        }

        let c = self.c;
        let a1 = self.state.alpha[i1];
        let a2 = self.state.alpha[i2];
        let y1 = self.labels[i1];
        let y2 = self.labels[i2];
        let e1 = self.state.errors[i1];
        let e2 = self.state.errors[i2];
        let b = self.state.bias;
        let s = y1 * y2;

        // Feasible segment for a2 on the line y1*a1 + y2*a2 = const inside [0, C]^2
        let (low, high) = if y1 != y2 {
            ((a2 - a1).max(0.0), c.min(c + a2 - a1))
        } else {
            ((a1 + a2 - c).max(0.0), c.min(a1 + a2))
        };
        if low >= high {
            return false;
        }

        let k11 = self.get_kernel(i1, i1);
        let k12 = self.get_kernel(i1, i2);
        let k22 = self.get_kernel(i2, i2);
        let eta = k11 + k22 - 2.0 * k12;

        let a2_new = if eta > 0.0 {
            (a2 + y2 * (e1 - e2) / eta).clamp(low, high)
        } else {
            // Objective is linear (or concave) along the segment: compare its ends
            let f1 = y1 * (e1 + b) - a1 * k11 - s * a2 * k12;
            let f2 = y2 * (e2 + b) - s * a1 * k12 - a2 * k22;
            let l1 = a1 + s * (a2 - low);
            let h1 = a1 + s * (a2 - high);
            let low_obj = l1 * f1
                + low * f2
                + 0.5 * l1 * l1 * k11
                + 0.5 * low * low * k22
                + s * low * l1 * k12;
            let high_obj = h1 * f1
                + high * f2
                + 0.5 * h1 * h1 * k11
                + 0.5 * high * high * k22
                + s * high * h1 * k12;

            if low_obj < high_obj - STEP_EPSILON {
                low
            } else if low_obj > high_obj + STEP_EPSILON {
                high
            } else {
                a2
            }
        };

        if (a2_new - a2).abs() < STEP_EPSILON * (a2_new + a2 + STEP_EPSILON) {
            return false;
        }

        // Rounding can push a1 a hair outside the box
        let a1_new = (a1 + s * (a2 - a2_new)).clamp(0.0, c);
        let delta1 = y1 * (a1_new - a1);
        let delta2 = y2 * (a2_new - a2);

        let b1 = e1 + delta1 * k11 + delta2 * k12 + b;
        let b2 = e2 + delta1 * k12 + delta2 * k22 + b;
        let b_new = if a1_new > 0.0 && a1_new < c {
            b1
        } else if a2_new > 0.0 && a2_new < c {
            b2
        } else {
            (b1 + b2) / 2.0
        };

        self.state.alpha[i1] = a1_new;
        self.state.alpha[i2] = a2_new;
        self.state.bias = b_new;
        self.state.weights.scaled_add(delta1, &self.data.row(i1));
        self.state.weights.scaled_add(delta2, &self.data.row(i2));
        self.refresh_errors();

        debug!(
            "step ({i1}, {i2}): alpha {a1:.6}->{a1_new:.6}, {a2:.6}->{a2_new:.6}, bias {b_new:.6}"
        );
        true
    }

    /// Try to find a partner for example `i2` and update the pair
    ///
    /// Only examples failing the KKT test are paired. Partners are tried in
    /// order: the example with the extreme error (if any multiplier is
    /// non-bound), then non-bound examples in random order, then the remaining
    /// examples in random order.
    pub fn examine_example(&mut self, i2: usize) -> bool {
        let y2 = self.labels[i2];
        let a2 = self.state.alpha[i2];
        let e2 = self.state.errors[i2];
        let r2 = y2 * a2;

        let violating = (r2 < self.tolerance && a2 < self.c) || (r2 > self.tolerance && a2 > 0.0);
        if !violating {
            return false;
        }

        let mut non_bound = Vec::new();
        let mut bound = Vec::new();
        let (mut max_index, mut max_error) = (0, f64::NEG_INFINITY);
        let (mut min_index, mut min_error) = (0, f64::INFINITY);
        for (i, &error) in self.state.errors.iter().enumerate() {
            if self.is_non_bound(i) {
                non_bound.push(i);
            } else {
                bound.push(i);
            }
            if error > max_error {
                max_error = error;
                max_index = i;
            }
            if error < min_error {
                min_error = error;
                min_index = i;
            }
        }

        if !non_bound.is_empty() {
            let i1 = if e2 > 0.0 { min_index } else { max_index };
            if self.take_step(i1, i2) {
                return true;
            }
        }

        non_bound.shuffle(&mut *self.rng);
        for i1 in non_bound {
            if self.take_step(i1, i2) {
                return true;
            }
        }

        bound.shuffle(&mut *self.rng);
        for i1 in bound {
            if self.take_step(i1, i2) {
                return true;
            }
        }

        false
    }

    /// Run the outer loop, alternating examine-all and examine-non-bound sweeps
    pub fn run(&mut self, max_iterations: usize) -> SweepOutcome {
        let n = self.n_samples();
        let mut num_changed = 0;
        let mut examine_all = true;
        let mut iterations = 0;
        let mut successful_steps = 0;

        while (num_changed > 0 || examine_all) && iterations < max_iterations {
            num_changed = 0;

            if examine_all {
                for i in 0..n {
                    if self.examine_example(i) {
                        num_changed += 1;
                    }
                }
            } else {
                for i in 0..n {
                    if self.is_non_bound(i) && self.examine_example(i) {
                        num_changed += 1;
                    }
                }
            }

            debug!(
                "sweep {iterations} ({}): {num_changed} pair updates, bias {:.6}",
                if examine_all { "all" } else { "non-bound" },
                self.state.bias
            );
            successful_steps += num_changed;

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }

            iterations += 1;
        }

        SweepOutcome {
            iterations,
            successful_steps,
            converged: num_changed == 0 && !examine_all,
        }
    }
}
