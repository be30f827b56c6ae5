//! Data transformation: fit the preprocessor on the training partition and
//! turn both partitions into dense matrices with the target as last column.

use std::path::{Path, PathBuf};

use ndarray::{concatenate, Array1, Array2, Axis};
use tracing::info;

use crate::config::{DatasetSchema, TransformationConfig};
use crate::error::{PipelineError, Result};
use crate::pipeline::loader::{load_dataset, numeric_column};
use crate::preprocessing::{ColumnPreprocessor, FittedPreprocessor};
use crate::store::save_object;

/// Matrices produced by the transformation stage.
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    /// Training features followed by the target column.
    pub train: Array2<f64>,
    /// Test features followed by the target column.
    pub test: Array2<f64>,
    pub preprocessor_path: PathBuf,
}

/// Extract the target column, rejecting missing values.
pub fn target_vector(
    df: &polars::prelude::DataFrame,
    target: &str,
    context: &'static str,
) -> Result<Array1<f64>> {
    if df.column(target).is_err() {
        return Err(PipelineError::schema(
            context,
            format!("target column '{}' not found", target),
        ));
    }
    let values = numeric_column(df, target, context)?;
    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        return Err(PipelineError::schema(
            context,
            format!("target column '{}' has {} missing value(s)", target, missing),
        ));
    }
    Ok(values.into_iter().flatten().collect())
}

/// Append `target` as the last column of `features`.
pub fn with_target(features: &Array2<f64>, target: &Array1<f64>) -> Result<Array2<f64>> {
    let column = target.view().insert_axis(Axis(1));
    concatenate(Axis(1), &[features.view(), column]).map_err(|e| {
        PipelineError::fit("transformation", format!("cannot append target: {}", e))
    })
}

/// Transformation stage.
pub struct DataTransformation {
    config: TransformationConfig,
    schema: DatasetSchema,
}

impl DataTransformation {
    pub fn new(config: TransformationConfig, schema: DatasetSchema) -> Self {
        Self { config, schema }
    }

    pub fn config(&self) -> &TransformationConfig {
        &self.config
    }

    /// Declare the column-wise preprocessing pipeline.
    pub fn build_pipeline(&self) -> Result<ColumnPreprocessor> {
        ColumnPreprocessor::from_schema(&self.schema)
    }

    /// Fit on `train_path`, transform both partitions and persist the fitted
    /// preprocessor.
    pub fn run(&self, train_path: &Path, test_path: &Path) -> Result<TransformationOutput> {
        info!("entered data transformation");

        let train_df = load_dataset(train_path)?;
        let test_df = load_dataset(test_path)?;
        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            "read train and test data"
        );

        let target = self.schema.target_column.as_str();
        let y_train = target_vector(&train_df, target, "transformation (train)")?;
        let y_test = target_vector(&test_df, target, "transformation (test)")?;

        let pipeline = self.build_pipeline()?;
        info!("applying preprocessor on training and test data");
        let (fitted, x_train): (FittedPreprocessor, Array2<f64>) = pipeline.fit_transform(&train_df)?;
        let x_test = fitted.transform(&test_df)?;

        let train = with_target(&x_train, &y_train)?;
        let test = with_target(&x_test, &y_test)?;

        save_object(&self.config.preprocessor_path, &fitted)?;
        info!(
            path = %self.config.preprocessor_path.display(),
            n_features = fitted.n_features_out(),
            "saved preprocessing object"
        );

        Ok(TransformationOutput {
            train,
            test,
            preprocessor_path: self.config.preprocessor_path.clone(),
        })
    }
}
