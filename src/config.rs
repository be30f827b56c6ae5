//! Pipeline configuration
//!
//! Every stage receives its configuration through its constructor. The
//! defaults reproduce the standard layout: source data in `data/stud.csv`
//! and all artifacts under `artifacts/`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Default directory for all generated artifacts.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Default location of the source dataset.
pub const DEFAULT_SOURCE_PATH: &str = "data/stud.csv";

/// Column layout of the student performance dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSchema {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub target_column: String,
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self {
            numeric_columns: vec!["writing_score".into(), "reading_score".into()],
            categorical_columns: vec![
                "gender".into(),
                "race_ethnicity".into(),
                "parental_level_of_education".into(),
                "lunch".into(),
                "test_preparation_course".into(),
            ],
            target_column: "math_score".into(),
        }
    }
}

impl DatasetSchema {
    /// Feature columns in transform order (numeric first, then categorical).
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric_columns
            .iter()
            .chain(self.categorical_columns.iter())
            .map(String::as_str)
    }

    /// All columns the source dataset must provide.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = self.feature_columns().collect();
        cols.push(self.target_column.as_str());
        cols
    }

    /// Reject empty column groups and duplicated column names.
    pub fn validate(&self) -> Result<()> {
        if self.numeric_columns.is_empty() {
            return Err(PipelineError::schema(
                "dataset schema",
                "no numeric columns configured",
            ));
        }
        if self.categorical_columns.is_empty() {
            return Err(PipelineError::schema(
                "dataset schema",
                "no categorical columns configured",
            ));
        }

        let mut seen = HashSet::new();
        for col in self.required_columns() {
            if !seen.insert(col) {
                return Err(PipelineError::schema(
                    "dataset schema",
                    format!("column '{}' is listed more than once", col),
                ));
            }
        }
        Ok(())
    }
}

/// Paths and split parameters for the ingestion stage.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionConfig {
    pub source_path: PathBuf,
    pub raw_data_path: PathBuf,
    pub train_data_path: PathBuf,
    pub test_data_path: PathBuf,
    pub test_size: f64,
    pub seed: u64,
}

impl IngestionConfig {
    pub fn new(source_path: impl Into<PathBuf>, artifacts_dir: impl AsRef<Path>) -> Self {
        let dir = artifacts_dir.as_ref();
        Self {
            source_path: source_path.into(),
            raw_data_path: dir.join("data.csv"),
            train_data_path: dir.join("train.csv"),
            test_data_path: dir.join("test.csv"),
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_PATH, DEFAULT_ARTIFACTS_DIR)
    }
}

/// Output location of the fitted preprocessor.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationConfig {
    pub preprocessor_path: PathBuf,
}

impl TransformationConfig {
    pub fn new(artifacts_dir: impl AsRef<Path>) -> Self {
        Self {
            preprocessor_path: artifacts_dir.as_ref().join("preprocessor.bin"),
        }
    }
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACTS_DIR)
    }
}

/// Output location of the trained model and the acceptance threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub model_path: PathBuf,
    /// Minimum held-out R² the best candidate must reach.
    pub min_score: f64,
    /// Number of cross-validation folds used by the grid search.
    pub cv_folds: usize,
}

impl TrainerConfig {
    pub fn new(artifacts_dir: impl AsRef<Path>) -> Self {
        Self {
            model_path: artifacts_dir.as_ref().join("model.bin"),
            min_score: 0.6,
            cv_folds: 3,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACTS_DIR)
    }
}

/// Top-level configuration, loadable from a JSON file.
///
/// Missing keys fall back to their defaults, so a config file only needs to
/// name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source_path: PathBuf,
    pub artifacts_dir: PathBuf,
    pub schema: DatasetSchema,
    pub test_size: f64,
    pub seed: u64,
    pub min_score: f64,
    pub cv_folds: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            schema: DatasetSchema::default(),
            test_size: 0.2,
            seed: 42,
            min_score: 0.6,
            cv_folds: 3,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::NotFound {
                context: "pipeline config",
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::persistence(path, e))?;
        let config: PipelineConfig = serde_json::from_str(&text).map_err(|e| {
            PipelineError::schema("pipeline config", format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::schema(
                "pipeline config",
                format!("test_size must be in (0, 1), got {}", self.test_size),
            ));
        }
        if self.cv_folds < 2 {
            return Err(PipelineError::schema(
                "pipeline config",
                format!("cv_folds must be at least 2, got {}", self.cv_folds),
            ));
        }
        Ok(())
    }

    pub fn ingestion(&self) -> IngestionConfig {
        IngestionConfig {
            test_size: self.test_size,
            seed: self.seed,
            ..IngestionConfig::new(&self.source_path, &self.artifacts_dir)
        }
    }

    pub fn transformation(&self) -> TransformationConfig {
        TransformationConfig::new(&self.artifacts_dir)
    }

    pub fn trainer(&self) -> TrainerConfig {
        TrainerConfig {
            min_score: self.min_score,
            cv_folds: self.cv_folds,
            ..TrainerConfig::new(&self.artifacts_dir)
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.artifacts_dir.join("model_report.json")
    }
}
