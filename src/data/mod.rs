//! Data loading and dataset implementations
//!
//! `DenseDataset` is the in-memory feature matrix + labels pair the trainer
//! consumes; `csv` adds loaders for comma separated files.

pub mod csv;
pub mod dense;

pub use self::dense::*;
