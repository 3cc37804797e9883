//! High-level API for binary SVM training
//!
//! This module provides a builder over [`BinarySVM`] plus evaluation helpers
//! for common workflows.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use binsvm::api::SVM;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model on data
//! let svm = SVM::new()
//!     .with_c(10.0)
//!     .with_tolerance(0.001)
//!     .with_seed(42)
//!     .train_from_csv("train.csv")?;
//!
//! println!("Accuracy: {:.2}%", svm.evaluate_from_csv("test.csv")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::cache::KernelCache;
use crate::core::{
    Dataset, Prediction, Result, SVMError, SVMModel, TrainerConfig, TrainingSummary,
};
use crate::data::DenseDataset;
use crate::kernel::{Kernel, LinearKernel};
use crate::trainer::BinarySVM;
use ndarray::ArrayView1;
use std::path::Path;

/// High-level SVM interface with builder pattern
pub struct SVM<K: Kernel = LinearKernel> {
    kernel: K,
    config: TrainerConfig,
    cache: Option<KernelCache>,
}

impl SVM<LinearKernel> {
    /// Create a new SVM with linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(LinearKernel::new())
    }
}

impl Default for SVM<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> SVM<K> {
    /// Create SVM with custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: TrainerConfig::default(),
            cache: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: TrainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set KKT tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set maximum number of outer sweeps
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Seed the randomized partner sweeps
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Train with an existing kernel cache or cache view
    pub fn with_cache(mut self, cache: KernelCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train on a dataset
    pub fn train(self, dataset: &DenseDataset) -> Result<TrainedModel<K>> {
        let mut model = BinarySVM::with_config(self.config, self.kernel, self.cache);
        let summary = model.train(dataset, dataset.labels())?;
        Ok(TrainedModel { model, summary })
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = DenseDataset::from_csv_file(path)?;
        self.train(&dataset)
    }
}

/// Trained SVM model with high-level prediction interface
pub struct TrainedModel<K: Kernel> {
    model: BinarySVM<K>,
    summary: TrainingSummary,
}

impl<K: Kernel> TrainedModel<K> {
    /// Predict a single feature vector
    pub fn predict(&self, x: ArrayView1<f64>) -> Prediction {
        self.model.predict(x)
    }

    /// Predict every row of a dataset
    pub fn predict_dataset<D: Dataset + ?Sized>(&self, dataset: &D) -> Vec<Prediction> {
        self.model.predict_batch(dataset)
    }

    /// Predict from CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = DenseDataset::from_csv_file(path)?;
        Ok(self.predict_dataset(&dataset))
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate(&self, dataset: &DenseDataset) -> f64 {
        self.evaluate_detailed(dataset).accuracy()
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = DenseDataset::from_csv_file(path)?;
        Ok(self.evaluate(&dataset))
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed(&self, dataset: &DenseDataset) -> EvaluationMetrics {
        let predictions = self.predict_dataset(dataset);

        let mut metrics = EvaluationMetrics::new(0, 0, 0, 0);
        for (pred, &actual) in predictions.iter().zip(dataset.labels()) {
            let slot = match (pred.label > 0.0, actual > 0.0) {
                (true, true) => &mut metrics.true_positives,
                (false, false) => &mut metrics.true_negatives,
                (true, false) => &mut metrics.false_positives,
                (false, true) => &mut metrics.false_negatives,
            };
            *slot += 1;
        }
        metrics
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            n_support_vectors: self.model.n_support_vectors(),
            bias: self.model.bias(),
            weights: self
                .model
                .weights()
                .map(|w| w.to_vec())
                .unwrap_or_default(),
            support_vector_indices: self.model.support_vector_indices(),
            iterations: self.summary.iterations,
            converged: self.summary.converged,
        }
    }

    /// Summary of the training run
    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Get the underlying trained model
    pub fn inner(&self) -> &BinarySVM<K> {
        &self.model
    }
}

/// Detailed evaluation metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f64 {
        ratio(
            self.true_positives + self.true_negatives,
            self.total(),
        )
    }

    /// TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// TP / (TP + FN), also known as sensitivity
    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Harmonic mean of precision and recall
    pub fn f1_score(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
        )
    }

    /// Number of evaluated examples
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }
}

/// `num / den`, or zero for an empty denominator
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub n_support_vectors: usize,
    pub bias: f64,
    pub weights: Vec<f64>,
    pub support_vector_indices: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a linear SVM on CSV data with default parameters
    pub fn train_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel<LinearKernel>> {
        SVM::new().train_from_csv(path)
    }

    /// Quick evaluation: train on training file, test on test file
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
    ) -> Result<f64> {
        let model = train_csv(train_path)?;
        model.evaluate_from_csv(test_path)
    }

    /// Hold-out validation on a sequential split
    pub fn simple_validation(dataset: &DenseDataset, train_ratio: f64, c: f64) -> Result<f64> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let train_size = (dataset.len() as f64 * train_ratio) as usize;
        let (train, test) = dataset.split_at(train_size);
        if test.is_empty() {
            return Err(SVMError::InvalidDataset(
                "Hold-out split left no test examples".to_string(),
            ));
        }

        let model = SVM::new().with_c(c).train(&train)?;
        Ok(model.evaluate(&test))
    }
}
