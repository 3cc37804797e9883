//! Core type definitions for SVM training

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Build a prediction from a decision value; zero maps to +1
    pub fn from_decision_value(decision_value: f64) -> Self {
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Self::new(label, decision_value)
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Trainer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance of the per-example KKT test
    pub tolerance: f64,
    /// Maximum number of outer sweeps
    pub max_iterations: usize,
    /// Seed for the randomized partner sweeps; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 0.001,
            max_iterations: 10000,
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Create a configuration with the three SMO parameters
    pub fn new(c: f64, tolerance: f64, max_iterations: usize) -> Self {
        Self {
            c,
            tolerance,
            max_iterations,
            seed: None,
        }
    }

    /// Reject parameter combinations SMO cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0) || !self.c.is_finite() {
            return Err(SVMError::InvalidParameter(format!(
                "C must be a positive finite number, got: {}",
                self.c
            )));
        }
        if !(self.tolerance >= 0.0) || !self.tolerance.is_finite() {
            return Err(SVMError::InvalidParameter(format!(
                "Tolerance must be a non-negative finite number, got: {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SVMError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Outcome of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Number of outer sweeps performed
    pub iterations: usize,
    /// Number of committed pair updates
    pub successful_steps: usize,
    /// False when the sweep cap was reached before a quiet examine-all sweep
    pub converged: bool,
    /// Number of examples with a non-zero multiplier
    pub n_support_vectors: usize,
    /// Final bias term
    pub bias: f64,
}
