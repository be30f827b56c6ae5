//! Tests for CLI argument parsing and the binary

use std::path::PathBuf;

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use studperf::cli::{Cli, Commands};

mod common;

use common::*;

#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from(["studperf"]);
    assert!(cli.command.is_none());
    assert!(!cli.skip_training);
    assert!(!cli.verbose);

    let config = cli.pipeline_config().unwrap();
    assert_eq!(config.source_path, PathBuf::from("data/stud.csv"));
    assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
    assert_eq!(config.test_size, 0.2);
    assert_eq!(config.seed, 42);
    assert_eq!(config.min_score, 0.6);
}

#[test]
fn test_cli_overrides() {
    let cli = Cli::parse_from([
        "studperf",
        "-i",
        "other.csv",
        "--artifacts-dir",
        "out",
        "--test-size",
        "0.25",
        "--skip-training",
    ]);
    let config = cli.pipeline_config().unwrap();
    assert_eq!(config.source_path, PathBuf::from("other.csv"));
    assert_eq!(config.artifacts_dir, PathBuf::from("out"));
    assert_eq!(config.test_size, 0.25);
    assert!(cli.skip_training);
}

#[test]
fn test_cli_rejects_bad_test_size() {
    assert!(Cli::try_parse_from(["studperf", "--test-size", "1.2"]).is_err());
    assert!(Cli::try_parse_from(["studperf", "--min-score", "abc"]).is_err());
}

#[test]
fn test_config_file_is_overridden_by_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"seed": 7, "min_score": 0.3}"#).unwrap();

    let cli = Cli::parse_from([
        "studperf",
        "--config",
        path.to_str().unwrap(),
        "--min-score",
        "0.4",
    ]);
    let config = cli.pipeline_config().unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.min_score, 0.4);
    assert_eq!(config.cv_folds, 3);
}

#[test]
fn test_predict_subcommand_parses() {
    let cli = Cli::parse_from(["studperf", "predict", "-i", "new.csv"]);
    match cli.command {
        Some(Commands::Predict {
            input,
            output,
            artifacts_dir,
        }) => {
            assert_eq!(input, PathBuf::from("new.csv"));
            assert!(output.is_none());
            assert!(artifacts_dir.is_none());
        }
        None => panic!("expected predict subcommand"),
    }
}

#[test]
fn test_binary_trains_end_to_end() {
    let mut df = create_student_dataframe(150, 41);
    let ws = Workspace::with_dataframe(&mut df);

    Command::cargo_bin("studperf")
        .unwrap()
        .arg("--input")
        .arg(&ws.source)
        .arg("--artifacts-dir")
        .arg(&ws.artifacts)
        .assert()
        .success()
        .stdout(predicate::str::contains("Best model"));

    assert!(ws.artifacts.join("model.bin").exists());
    assert!(ws.artifacts.join("preprocessor.bin").exists());

    let report = std::fs::read_to_string(ws.artifacts.join("model_report.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(json["candidates"].as_array().unwrap().len(), 6);
    assert!(json["best_model"].is_string());
}

#[test]
fn test_binary_skip_training() {
    let mut df = create_student_dataframe(60, 42);
    let ws = Workspace::with_dataframe(&mut df);

    Command::cargo_bin("studperf")
        .unwrap()
        .arg("-i")
        .arg(&ws.source)
        .arg("-a")
        .arg(&ws.artifacts)
        .arg("--skip-training")
        .assert()
        .success();

    assert!(ws.artifacts.join("preprocessor.bin").exists());
    assert!(!ws.artifacts.join("model.bin").exists());
}

#[test]
fn test_binary_fails_on_missing_input() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("studperf")
        .unwrap()
        .arg("-i")
        .arg(dir.path().join("missing.csv"))
        .arg("-a")
        .arg(dir.path().join("artifacts"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn test_binary_predict_without_artifacts_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut df = create_student_dataframe(5, 43);
    let input = write_csv(&mut df, dir.path(), "new.csv");

    Command::cargo_bin("studperf")
        .unwrap()
        .arg("predict")
        .arg("-i")
        .arg(&input)
        .arg("-a")
        .arg(dir.path().join("artifacts"))
        .assert()
        .failure();
}

#[test]
fn test_binary_predict_uses_configured_target() {
    let mut df = create_student_dataframe(150, 44);
    df.rename("math_score", "maths".into()).unwrap();
    let ws = Workspace::with_dataframe(&mut df);

    let config_path = ws.dir.path().join("config.json");
    let config = serde_json::json!({
        "source_path": ws.source,
        "artifacts_dir": ws.artifacts,
        "schema": { "target_column": "maths" },
        "min_score": 0.0,
    });
    std::fs::write(&config_path, config.to_string()).unwrap();

    Command::cargo_bin("studperf")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let mut fresh = create_student_dataframe(6, 45).drop("math_score").unwrap();
    let input = write_csv(&mut fresh, ws.dir.path(), "new.csv");

    Command::cargo_bin("studperf")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("predict")
        .arg("-i")
        .arg(&input)
        .assert()
        .success();

    let written = read_csv(&ws.dir.path().join("new_predictions.csv"));
    assert_shape(&written, 6, 8);
    assert_has_columns(&written, &["predicted_maths"]);
}
