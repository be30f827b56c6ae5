//! Column-wise preprocessing pipeline
//!
//! Numeric columns: median imputation, then standard scaling.
//! Categorical columns: most-frequent imputation, one-hot encoding, then
//! scaling without centering.
//!
//! [`ColumnPreprocessor`] only declares the column groups. Fitting consumes
//! training data and returns a [`FittedPreprocessor`], which can transform but
//! never re-fit, so test-set statistics cannot leak into the learned state.

use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::encoder::{FittedOneHotEncoder, OneHotEncoder};
use super::imputer::{CategoryFill, ImputeStrategy, NumericFill};
use super::scaler::{FittedScaler, StandardScaler};
use crate::config::DatasetSchema;
use crate::error::{PipelineError, Result};
use crate::pipeline::loader::{categorical_column, numeric_column};

/// Unfitted preprocessing pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPreprocessor {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
}

impl ColumnPreprocessor {
    /// Declare the pipeline for the schema's column groups.
    pub fn from_schema(schema: &DatasetSchema) -> Result<Self> {
        schema.validate()?;
        Ok(Self {
            numeric_columns: schema.numeric_columns.clone(),
            categorical_columns: schema.categorical_columns.clone(),
        })
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Learn imputation, encoding and scaling parameters from `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedPreprocessor> {
        if df.height() == 0 {
            return Err(PipelineError::fit(
                "preprocessor",
                "cannot fit on an empty training partition",
            ));
        }

        let mut numeric = Vec::with_capacity(self.numeric_columns.len());
        for name in &self.numeric_columns {
            let values = numeric_column(df, name, "preprocessor fit")?;
            let fill = NumericFill::fit(name, &values, ImputeStrategy::Median)?;
            let imputed: Vec<f64> = values.iter().map(|v| fill.apply(*v)).collect();
            let scaler = StandardScaler::new().fit(&imputed);
            numeric.push(NumericColumnState {
                name: name.clone(),
                fill,
                scaler,
            });
        }

        let mut categorical = Vec::with_capacity(self.categorical_columns.len());
        for name in &self.categorical_columns {
            let values = categorical_column(df, name, "preprocessor fit")?;
            let fill = CategoryFill::fit(name, &values)?;
            let imputed: Vec<String> = values.iter().map(|v| fill.apply(v.as_deref())).collect();
            let encoder = OneHotEncoder.fit(name, imputed.iter().map(String::as_str));

            let mut codes = Vec::with_capacity(imputed.len());
            for v in &imputed {
                codes.push(encoder.encode(v)?);
            }
            let scalers = (0..encoder.width())
                .map(|k| {
                    let indicator: Vec<f64> =
                        codes.iter().map(|&c| if c == k { 1.0 } else { 0.0 }).collect();
                    StandardScaler::without_centering().fit(&indicator)
                })
                .collect();

            categorical.push(CategoricalColumnState {
                name: name.clone(),
                fill,
                encoder,
                scalers,
            });
        }

        let fitted = FittedPreprocessor {
            numeric,
            categorical,
        };
        debug!(
            n_features_out = fitted.n_features_out(),
            rows = df.height(),
            "fitted preprocessor"
        );
        Ok(fitted)
    }

    /// Fit on `df` and transform it in one step.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedPreprocessor, Array2<f64>)> {
        let fitted = self.fit(df)?;
        let matrix = fitted.transform(df)?;
        Ok((fitted, matrix))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NumericColumnState {
    name: String,
    fill: NumericFill,
    scaler: FittedScaler,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CategoricalColumnState {
    name: String,
    fill: CategoryFill,
    encoder: FittedOneHotEncoder,
    scalers: Vec<FittedScaler>,
}

/// Fitted preprocessing pipeline; transform-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    numeric: Vec<NumericColumnState>,
    categorical: Vec<CategoricalColumnState>,
}

impl FittedPreprocessor {
    /// Number of output feature columns.
    pub fn n_features_out(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.encoder.width()).sum::<usize>()
    }

    /// Output feature names in column order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|c| c.name.clone()).collect();
        for col in &self.categorical {
            names.extend(col.encoder.feature_names());
        }
        names
    }

    /// Apply the learned parameters row by row. Extra columns in `df` (such
    /// as the target) are ignored.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let n_cols = self.n_features_out();
        let mut out = Array2::<f64>::zeros((n_rows, n_cols));

        let mut offset = 0;
        for col in &self.numeric {
            let values = numeric_column(df, &col.name, "preprocessor transform")?;
            for (i, v) in values.into_iter().enumerate() {
                out[[i, offset]] = col.scaler.transform(col.fill.apply(v));
            }
            offset += 1;
        }

        for col in &self.categorical {
            let values = categorical_column(df, &col.name, "preprocessor transform")?;
            for (i, v) in values.iter().enumerate() {
                let value = col.fill.apply(v.as_deref());
                let k = col.encoder.encode(&value)?;
                out[[i, offset + k]] = 1.0;
            }
            for (k, scaler) in col.scalers.iter().enumerate() {
                out.column_mut(offset + k).mapv_inplace(|x| scaler.transform(x));
            }
            offset += col.encoder.width();
        }

        Ok(out)
    }
}
