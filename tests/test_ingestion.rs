//! Tests for the ingestion stage and the train/test split

use std::collections::HashSet;

use polars::prelude::NamedFrom;
use proptest::prelude::*;
use studperf::config::{DatasetSchema, IngestionConfig};
use studperf::pipeline::{split_indices, DataIngestion};
use studperf::PipelineError;

mod common;

use common::*;

#[test]
fn test_ingestion_writes_raw_train_and_test() {
    let mut df = create_student_dataframe(100, 1);
    let ws = Workspace::with_dataframe(&mut df);
    let config = IngestionConfig::new(&ws.source, &ws.artifacts);

    let out = DataIngestion::new(config.clone(), DatasetSchema::default())
        .run()
        .unwrap();

    assert_eq!(out.train_rows, 80);
    assert_eq!(out.test_rows, 20);
    assert!(config.raw_data_path.exists());

    let raw = read_csv(&config.raw_data_path);
    assert_shape(&raw, 100, 8);

    let train = read_csv(&out.train_path);
    let test = read_csv(&out.test_path);
    assert_shape(&train, 80, 8);
    assert_shape(&test, 20, 8);
    assert_has_columns(&train, &["math_score", "gender", "reading_score"]);
}

#[test]
fn test_ingestion_is_deterministic() {
    let mut df = create_student_dataframe(60, 2);
    let ws = Workspace::with_dataframe(&mut df);
    let config = IngestionConfig::new(&ws.source, &ws.artifacts);
    let stage = DataIngestion::new(config, DatasetSchema::default());

    let first = stage.run().unwrap();
    let train_a = std::fs::read_to_string(&first.train_path).unwrap();
    let second = stage.run().unwrap();
    let train_b = std::fs::read_to_string(&second.train_path).unwrap();

    assert_eq!(train_a, train_b);
}

#[test]
fn test_missing_source_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = IngestionConfig::new(dir.path().join("nope.csv"), dir.path().join("artifacts"));
    let err = DataIngestion::new(config, DatasetSchema::default())
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotFound { .. }));
}

#[test]
fn test_missing_column_is_schema_error() {
    let mut df = create_student_dataframe(20, 3).drop("lunch").unwrap();
    let ws = Workspace::with_dataframe(&mut df);
    let config = IngestionConfig::new(&ws.source, &ws.artifacts);

    let err = DataIngestion::new(config, DatasetSchema::default())
        .run()
        .unwrap_err();
    match err {
        PipelineError::Schema { message, .. } => assert!(message.contains("lunch")),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_non_numeric_score_is_schema_error() {
    let mut df = create_student_dataframe(10, 4);
    df.replace(
        "reading_score",
        polars::prelude::Series::new("reading_score".into(), vec!["high"; 10]),
    )
    .unwrap();
    let ws = Workspace::with_dataframe(&mut df);
    let config = IngestionConfig::new(&ws.source, &ws.artifacts);

    let err = DataIngestion::new(config, DatasetSchema::default())
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::Schema { .. }));
}

#[test]
fn test_empty_dataset_yields_empty_partitions() {
    let mut df = create_student_dataframe(0, 5);
    let ws = Workspace::with_dataframe(&mut df);
    let config = IngestionConfig::new(&ws.source, &ws.artifacts);

    let out = DataIngestion::new(config, DatasetSchema::default())
        .run()
        .unwrap();
    assert_eq!(out.train_rows, 0);
    assert_eq!(out.test_rows, 0);
}

proptest! {
    #[test]
    fn prop_split_is_a_partition(n in 0usize..500, seed in any::<u64>()) {
        let (train, test) = split_indices(n, 0.2, seed);

        prop_assert_eq!(train.len() + test.len(), n);
        prop_assert_eq!(test.len(), (n + 4) / 5);

        let train_set: HashSet<usize> = train.iter().copied().collect();
        let test_set: HashSet<usize> = test.iter().copied().collect();
        prop_assert_eq!(train_set.len(), train.len());
        prop_assert!(train_set.is_disjoint(&test_set));
        prop_assert!(train_set.union(&test_set).all(|&i| i < n));
    }

    #[test]
    fn prop_split_is_reproducible(n in 1usize..300, seed in any::<u64>()) {
        prop_assert_eq!(split_indices(n, 0.2, seed), split_indices(n, 0.2, seed));
    }
}
