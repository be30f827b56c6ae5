//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::PipelineConfig;
use crate::error::Result;

/// studperf - Train and select a regression model for student math scores
#[derive(Parser, Debug)]
#[command(name = "studperf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Source dataset (CSV or Parquet). Defaults to data/stud.csv
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for the split data, preprocessor, model and report
    #[arg(short, long)]
    pub artifacts_dir: Option<PathBuf>,

    /// JSON config file; flags given on the command line override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop after ingestion and transformation
    #[arg(long, default_value = "false")]
    pub skip_training: bool,

    /// Minimum held-out R² the best model must reach
    #[arg(long, value_parser = validate_unit_interval)]
    pub min_score: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of rows held out for testing
    #[arg(long, value_parser = validate_test_size)]
    pub test_size: Option<f64>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict math scores for a feature table with the trained artifacts
    Predict {
        /// Feature table (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; defaults to the input name with a '_predictions' suffix
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory holding preprocessor.bin and model.bin; defaults to the
        /// configured artifacts directory
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,
    },
}

/// Inputs of the `predict` subcommand after config resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictSettings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub artifacts_dir: PathBuf,
    pub target_column: String,
}

impl Cli {
    /// Resolve the pipeline config: file (or defaults) overridden by flags.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = &self.input {
            config.source_path = input.clone();
        }
        if let Some(dir) = &self.artifacts_dir {
            config.artifacts_dir = dir.clone();
        }
        if let Some(min_score) = self.min_score {
            config.min_score = min_score;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolve the `predict` subcommand against `config`, or `None` when
    /// training was requested.
    pub fn predict_settings(&self, config: &PipelineConfig) -> Option<PredictSettings> {
        match &self.command {
            Some(Commands::Predict {
                input,
                output,
                artifacts_dir,
            }) => Some(PredictSettings {
                input: input.clone(),
                output: output.clone().unwrap_or_else(|| predictions_path(input)),
                artifacts_dir: artifacts_dir
                    .clone()
                    .unwrap_or_else(|| config.artifacts_dir.clone()),
                target_column: config.schema.target_column.clone(),
            }),
            None => None,
        }
    }
}

/// Default predictions path: next to the input with a '_predictions' suffix.
pub fn predictions_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or("csv");
    parent.join(format!("{}_predictions.{}", stem, extension))
}

fn validate_unit_interval(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

fn validate_test_size(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value <= 0.0 || value >= 1.0 {
        Err(format!("test size must be strictly between 0 and 1, got {}", value))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictions_path_keeps_directory() {
        assert_eq!(
            predictions_path(Path::new("data/new.csv")),
            PathBuf::from("data/new_predictions.csv")
        );
    }

    #[test]
    fn test_validators() {
        assert!(validate_test_size("0.2").is_ok());
        assert!(validate_test_size("1.0").is_err());
        assert!(validate_unit_interval("1.5").is_err());
        assert!(validate_unit_interval("abc").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from(["studperf", "--seed", "7", "--min-score", "0.5"]);
        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.min_score, 0.5);
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn test_predict_settings_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"artifacts_dir": "runs/a", "schema": {"target_column": "maths"}}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "studperf",
            "--config",
            path.to_str().unwrap(),
            "predict",
            "-i",
            "new.parquet",
        ]);
        let config = cli.pipeline_config().unwrap();
        let settings = cli.predict_settings(&config).unwrap();

        assert_eq!(settings.target_column, "maths");
        assert_eq!(settings.artifacts_dir, PathBuf::from("runs/a"));
        assert_eq!(settings.output, PathBuf::from("new_predictions.parquet"));
    }

    #[test]
    fn test_predict_artifacts_flag_wins() {
        let cli = Cli::parse_from(["studperf", "predict", "-i", "new.csv", "-a", "elsewhere"]);
        let config = cli.pipeline_config().unwrap();
        let settings = cli.predict_settings(&config).unwrap();

        assert_eq!(settings.artifacts_dir, PathBuf::from("elsewhere"));
        assert_eq!(settings.target_column, "math_score");
        assert!(Cli::parse_from(["studperf"]).predict_settings(&config).is_none());
    }
}
