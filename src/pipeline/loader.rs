//! Dataset loading, saving and column extraction

use std::path::Path;

use polars::prelude::*;

use crate::config::DatasetSchema;
use crate::error::{DataContext, PipelineError, Result};

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::NotFound {
            context: "dataset loader",
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .data_context("reading csv")?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .data_context("reading parquet")?,
        _ => {
            return Err(PipelineError::schema(
                "dataset loader",
                format!(
                    "unsupported file format '{}' for {}; supported formats: csv, parquet",
                    extension,
                    path.display()
                ),
            ))
        }
    };

    lf.collect().data_context("collecting dataset")
}

/// Write a dataset as CSV (with a header row) or Parquet depending on the
/// extension, creating the parent directory.
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !matches!(extension.as_str(), "csv" | "parquet") {
        return Err(PipelineError::schema(
            "dataset writer",
            format!(
                "unsupported output format '{}' for {}; supported formats: csv, parquet",
                extension,
                path.display()
            ),
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::persistence(parent, e))?;
    }

    let mut file = std::fs::File::create(path).map_err(|e| PipelineError::persistence(path, e))?;
    if extension == "parquet" {
        ParquetWriter::new(file)
            .finish(df)
            .map_err(|e| PipelineError::persistence(path, e))?;
    } else {
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| PipelineError::persistence(path, e))?;
    }

    Ok(())
}

/// Check that every schema column is present and that the numeric and target
/// columns hold numbers.
pub fn validate_schema(df: &DataFrame, schema: &DatasetSchema, context: &'static str) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<&str> = schema
        .required_columns()
        .into_iter()
        .filter(|c| !present.iter().any(|p| p == c))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::schema(
            context,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }

    for name in schema
        .numeric_columns
        .iter()
        .chain(std::iter::once(&schema.target_column))
    {
        numeric_column(df, name, context)?;
    }

    Ok(())
}

/// Extract a column as `f64` values, keeping nulls.
pub fn numeric_column(df: &DataFrame, name: &str, context: &'static str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::schema(context, format!("column '{}' not found", name)))?;

    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|_| {
            PipelineError::schema(
                context,
                format!("column '{}' is not numeric ({})", name, column.dtype()),
            )
        })?;

    let values = series.f64().data_context(context)?.into_iter().collect();
    Ok(values)
}

/// Extract a column as strings, keeping nulls.
pub fn categorical_column(
    df: &DataFrame,
    name: &str,
    context: &'static str,
) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::schema(context, format!("column '{}' not found", name)))?;

    let series = column
        .as_materialized_series()
        .cast(&DataType::String)
        .data_context(context)?;

    let values = series
        .str()
        .data_context(context)?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Select rows by position, preserving the given order.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    df.take(&idx).data_context("selecting rows")
}
