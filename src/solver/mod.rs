//! SVM solver implementations
//!
//! This module implements Platt's Sequential Minimal Optimization (SMO)
//! algorithm for the binary SVM dual problem.

pub mod smo;

pub use self::smo::*;
