//! Integration tests for the binsvm library
//!
//! These tests verify end-to-end functionality across modules: data loading,
//! training, cache sharing between models and evaluation.

use approx::assert_abs_diff_eq;
use binsvm::api::{quick, SVM};
use binsvm::{
    BinarySVM, Dataset, DenseDataset, KernelCache, LinearKernel, SVMError, SVMModel,
    TrainerConfig,
};
use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tempfile::NamedTempFile;

/// Two well separated 2-D clusters around (3, 3) and (-3, -3)
fn clusters(n_per_class: usize, seed: u64) -> DenseDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..n_per_class {
        rows.push(vec![
            3.0 + rng.random_range(-1.0..1.0),
            3.0 + rng.random_range(-1.0..1.0),
        ]);
        labels.push(1.0);
        rows.push(vec![
            -3.0 + rng.random_range(-1.0..1.0),
            -3.0 + rng.random_range(-1.0..1.0),
        ]);
        labels.push(-1.0);
    }
    DenseDataset::from_rows(rows, labels).expect("valid dataset")
}

/// Test complete workflow: data loading -> training -> evaluation
#[test]
fn test_complete_workflow_csv() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(temp_file, "x1,x2,label").expect("Failed to write");
    writeln!(temp_file, "2.0,1.0,1").expect("Failed to write");
    writeln!(temp_file, "1.8,1.1,1").expect("Failed to write");
    writeln!(temp_file, "2.2,0.9,1").expect("Failed to write");
    writeln!(temp_file, "-2.0,-1.0,-1").expect("Failed to write");
    writeln!(temp_file, "-1.8,-1.1,-1").expect("Failed to write");
    writeln!(temp_file, "-2.2,-0.9,-1").expect("Failed to write");
    temp_file.flush().expect("Failed to flush");

    let model = SVM::new()
        .with_c(10.0)
        .with_tolerance(0.001)
        .with_max_iterations(1000)
        .with_seed(42)
        .train_from_csv(temp_file.path())
        .expect("Training should succeed");

    let accuracy = model
        .evaluate_from_csv(temp_file.path())
        .expect("Evaluation should succeed");
    assert_eq!(accuracy, 1.0);

    let info = model.info();
    assert!(info.n_support_vectors > 0, "Should have support vectors");
    assert!(info.n_support_vectors <= 6);
    assert_eq!(info.support_vector_indices.len(), info.n_support_vectors);

    let dataset = DenseDataset::from_csv_file(temp_file.path()).expect("Failed to load dataset");
    let metrics = model.evaluate_detailed(&dataset);
    assert_eq!(metrics.true_positives, 3);
    assert_eq!(metrics.true_negatives, 3);
    assert_eq!(metrics.f1_score(), 1.0);
}

#[test]
fn test_separable_clusters_every_score_has_label_sign() {
    let dataset = clusters(15, 1);
    let mut svm = BinarySVM::new(10.0, 1e-3, 10000, LinearKernel::new(), None).with_seed(99);
    let summary = svm
        .train(&dataset, dataset.labels())
        .expect("Training should succeed");

    assert!(summary.n_support_vectors >= 2);
    for (i, &y) in dataset.labels().iter().enumerate() {
        let score = svm.decision_score(dataset.row(i));
        assert!(score * y > 0.0, "example {i}: score {score}, label {y}");
    }

    // Multipliers stay in the box and balance across the classes
    let alpha = svm.alpha();
    assert!(alpha.iter().all(|&a| (0.0..=10.0).contains(&a)));
    let balance: f64 = alpha.iter().zip(dataset.labels()).map(|(a, y)| a * y).sum();
    assert_abs_diff_eq!(balance, 0.0, epsilon = 1e-9);

    // The weight vector is the label-weighted sum of training rows
    let mut expected = ndarray::Array1::<f64>::zeros(2);
    for (i, (&a, &y)) in alpha.iter().zip(dataset.labels()).enumerate() {
        expected.scaled_add(a * y, &dataset.row(i));
    }
    let weights = svm.weights().expect("trained model has weights");
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*w, *e, epsilon = 1e-8);
    }
}

#[test]
fn test_models_on_subsets_share_one_cache() {
    let full = clusters(12, 2);
    let cache = KernelCache::new();

    let first_half: Vec<usize> = (0..full.len()).filter(|i| i % 2 == 0).collect();
    let second_half: Vec<usize> = (0..full.len()).filter(|i| i % 4 != 1).collect();

    let mut trained = Vec::new();
    for subset in [&first_half, &second_half] {
        let data = full.select(subset);
        let view = cache.slice(subset);
        let mut svm = BinarySVM::new(10.0, 1e-3, 1000, LinearKernel::new(), Some(view))
            .with_seed(5);
        svm.train(&data, data.labels())
            .expect("Training should succeed");
        trained.push(svm);
    }

    // The second model found values the first one stored
    let stats = cache.stats();
    assert!(stats.hits > 0);
    assert!(stats.size > 0);

    // Every stored value is the kernel of the full dataset's rows
    for i in 0..full.len() {
        for j in 0..full.len() {
            if let Some(value) = cache.get(i, j) {
                assert_abs_diff_eq!(value, full.row(i).dot(&full.row(j)), epsilon = 1e-12);
            }
        }
    }
    for svm in &trained {
        assert!(svm.cache().shares_storage_with(&cache));
    }
}

#[test]
fn test_view_composition_matches_direct_mapping() {
    let cache = KernelCache::new();
    let m1 = vec![4, 9, 2, 7, 0];
    let m2 = vec![3, 1, 4];

    let nested = cache.slice(&m1).slice(&m2);
    let (m1_c, m2_c) = (m1.clone(), m2.clone());
    let direct = cache.slice_with(move |a| m1_c[m2_c[a]]);

    nested.add(0, 2, 1.25);
    assert_eq!(direct.get(2, 0), Some(1.25));
    assert_eq!(cache.get(m1[m2[0]], m1[m2[2]]), Some(1.25));

    cache.add(m1[m2[1]], m1[m2[1]], 6.0);
    assert_eq!(nested.get(1, 1), Some(6.0));
    assert_eq!(direct.translate(1), 9);
}

#[test]
fn test_seeded_training_is_reproducible() {
    let dataset = clusters(10, 3);
    let config = TrainerConfig {
        c: 5.0,
        seed: Some(1234),
        ..TrainerConfig::default()
    };

    let a = SVM::new()
        .with_config(config.clone())
        .train(&dataset)
        .expect("Training should succeed");
    let b = SVM::new()
        .with_config(config)
        .train(&dataset)
        .expect("Training should succeed");

    assert_eq!(a.summary(), b.summary());
    assert_eq!(a.inner().alpha(), b.inner().alpha());
    assert_eq!(a.info().bias, b.info().bias);
}

#[test]
fn test_config_from_json() {
    let config = TrainerConfig::from_json(r#"{"c": 2.5, "max_iterations": 50}"#)
        .expect("Valid configuration");
    assert_eq!(config.c, 2.5);
    assert_eq!(config.max_iterations, 50);
    assert_eq!(config.tolerance, TrainerConfig::default().tolerance);

    assert!(matches!(
        TrainerConfig::from_json("{not json"),
        Err(SVMError::ConfigError(_))
    ));
    assert!(matches!(
        TrainerConfig::from_json(r#"{"c": -3.0}"#),
        Err(SVMError::InvalidParameter(_))
    ));
}

#[test]
fn test_quick_operations() {
    let mut train_file = NamedTempFile::new().expect("Failed to create temp file");
    let mut test_file = NamedTempFile::new().expect("Failed to create temp file");
    for (x, y, label) in [(2.0, 1.0, 1), (-2.0, -1.0, -1), (1.5, 0.8, 1), (-1.5, -0.8, -1)] {
        writeln!(train_file, "{x},{y},{label}").expect("Failed to write");
    }
    writeln!(test_file, "1.6,0.7,1").expect("Failed to write");
    writeln!(test_file, "-1.6,-0.7,-1").expect("Failed to write");
    train_file.flush().expect("Failed to flush");
    test_file.flush().expect("Failed to flush");

    let accuracy = quick::evaluate_split(train_file.path(), test_file.path())
        .expect("Quick evaluation should succeed");
    assert!((0.0..=1.0).contains(&accuracy));

    let dataset = clusters(10, 4);
    let accuracy =
        quick::simple_validation(&dataset, 0.8, 10.0).expect("Validation should succeed");
    assert!((0.0..=1.0).contains(&accuracy));
}

#[test]
fn test_batch_prediction_on_raw_matrix() {
    let dataset = clusters(10, 5);
    let mut svm = BinarySVM::new(10.0, 1e-3, 1000, LinearKernel::new(), None).with_seed(6);
    svm.train(dataset.features(), dataset.labels())
        .expect("Training should succeed");

    let queries: Array2<f64> = array![[4.0, 4.0], [-4.0, -4.0]];
    let labels: Vec<f64> = svm
        .predict_batch(&queries)
        .iter()
        .map(|p| p.label)
        .collect();
    assert_eq!(labels, vec![1.0, -1.0]);
}

#[test]
fn test_error_handling() {
    let result = SVM::new().train_from_csv("/nonexistent/file.csv");
    assert!(matches!(result, Err(SVMError::IoError(_))));

    let mut bad_file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(bad_file, "1.0,abc,1").expect("Failed to write");
    bad_file.flush().expect("Failed to flush");
    let result = SVM::new().train_from_csv(bad_file.path());
    assert!(matches!(result, Err(SVMError::ParseError(_))));

    let dataset = clusters(3, 6);
    let result = SVM::new().with_tolerance(f64::NAN).train(&dataset);
    assert!(matches!(result, Err(SVMError::InvalidParameter(_))));
}
