//! In-memory dense dataset

use crate::core::{Dataset, Result, SVMError};
use ndarray::{Array2, ArrayView1, Axis};

/// Feature matrix with one {-1, +1} label per row
#[derive(Debug, Clone, PartialEq)]
pub struct DenseDataset {
    features: Array2<f64>,
    labels: Vec<f64>,
}

impl DenseDataset {
    /// Pair a feature matrix with its labels
    pub fn new(features: Array2<f64>, labels: Vec<f64>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(SVMError::DimensionMismatch {
                expected: features.nrows(),
                actual: labels.len(),
            });
        }
        if let Some(&label) = labels.iter().find(|&&y| y != 1.0 && y != -1.0) {
            return Err(SVMError::InvalidLabel(label));
        }
        Ok(Self { features, labels })
    }

    /// Build a dataset from equally long rows
    pub fn from_rows(rows: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        let n_features = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * n_features);
        for row in &rows {
            if row.len() != n_features {
                return Err(SVMError::DimensionMismatch {
                    expected: n_features,
                    actual: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        let features = Array2::from_shape_vec((rows.len(), n_features), values)
            .map_err(|e| SVMError::InvalidDataset(e.to_string()))?;
        Self::new(features, labels)
    }

    /// Feature matrix
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Labels, one per row
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Copy the given rows into a new dataset, in the given order
    pub fn select(&self, indices: &[usize]) -> DenseDataset {
        DenseDataset {
            features: self.features.select(Axis(0), indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Split into the first `n` rows and the rest
    pub fn split_at(&self, n: usize) -> (DenseDataset, DenseDataset) {
        let n = n.min(self.len());
        let head: Vec<usize> = (0..n).collect();
        let tail: Vec<usize> = (n..self.len()).collect();
        (self.select(&head), self.select(&tail))
    }
}

impl Dataset for DenseDataset {
    fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    fn n_features(&self) -> usize {
        self.features.ncols()
    }

    fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.features.row(i)
    }
}
