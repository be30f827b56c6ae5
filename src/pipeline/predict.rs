//! Prediction with the persisted preprocessor and model.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use super::loader::{load_dataset, save_dataset};
use super::trainer::TrainedModel;
use crate::config::{TrainerConfig, TransformationConfig};
use crate::error::{DataContext, Result};
use crate::preprocessing::FittedPreprocessor;
use crate::store::load_object;

/// Column name for predictions of `target`.
pub fn prediction_column(target: &str) -> String {
    format!("predicted_{}", target)
}

/// Loads artifacts once and predicts for any number of frames.
#[derive(Debug, Clone)]
pub struct PredictPipeline {
    preprocessor: FittedPreprocessor,
    model: TrainedModel,
}

impl PredictPipeline {
    /// Load the preprocessor and model from explicit paths.
    pub fn load(preprocessor_path: &Path, model_path: &Path) -> Result<Self> {
        let preprocessor: FittedPreprocessor = load_object(preprocessor_path)?;
        let model: TrainedModel = load_object(model_path)?;
        info!(model = %model.name, params = %model.params, "loaded prediction artifacts");
        Ok(Self { preprocessor, model })
    }

    /// Load both artifacts from their default names under `artifacts_dir`.
    pub fn from_artifacts(artifacts_dir: &Path) -> Result<Self> {
        let preprocessor_path: PathBuf = TransformationConfig::new(artifacts_dir).preprocessor_path;
        let model_path = TrainerConfig::new(artifacts_dir).model_path;
        Self::load(&preprocessor_path, &model_path)
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Predict one value per row. Columns outside the feature set, the target
    /// included, are ignored.
    pub fn predict(&self, features: &DataFrame) -> Result<Vec<f64>> {
        let x = self.preprocessor.transform(features)?;
        Ok(self.model.estimator.predict(&x)?.to_vec())
    }

    /// Predict for every row of `input` and write it back with an extra
    /// prediction column.
    pub fn predict_file(&self, input: &Path, output: &Path, target: &str) -> Result<usize> {
        let mut df = load_dataset(input)?;
        let predictions = self.predict(&df)?;
        let n = predictions.len();

        let column = Series::new(prediction_column(target).into(), predictions);
        df.with_column(column).data_context("appending predictions")?;
        save_dataset(&mut df, output)?;

        info!(rows = n, output = %output.display(), "wrote predictions");
        Ok(n)
    }
}
