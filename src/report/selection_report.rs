//! JSON export of a model selection run

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::pipeline::ScoreReport;

/// Metadata about the training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    /// Crate version that produced the report
    pub version: String,
    /// Source dataset path
    pub input_file: String,
    pub target_column: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub cv_folds: usize,
    pub min_score: f64,
}

/// One candidate's scores and winning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub name: String,
    pub model: String,
    pub cv_r2: f64,
    pub train_r2: f64,
    pub test_r2: f64,
    /// Winning hyperparameters as `name -> value` strings
    pub best_params: Vec<(String, String)>,
    pub selected: bool,
}

/// Complete selection export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub metadata: RunMetadata,
    pub candidates: Vec<CandidateEntry>,
    pub best_model: Option<String>,
    pub best_test_r2: Option<f64>,
}

/// Inputs for the report metadata that the score report does not carry
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub target_column: &'a str,
    pub train_rows: usize,
    pub test_rows: usize,
    pub cv_folds: usize,
    pub min_score: f64,
}

impl SelectionReport {
    pub fn build(report: &ScoreReport, params: &ExportParams) -> Self {
        let best = report.best();
        let candidates = report
            .entries()
            .iter()
            .map(|e| CandidateEntry {
                name: e.name.clone(),
                model: e.kind.to_string(),
                cv_r2: e.cv_score,
                train_r2: e.train_r2,
                test_r2: e.test_r2,
                best_params: e
                    .best_params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                selected: best.is_some_and(|b| b.name == e.name),
            })
            .collect();

        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file.to_string(),
                target_column: params.target_column.to_string(),
                train_rows: params.train_rows,
                test_rows: params.test_rows,
                cv_folds: params.cv_folds,
                min_score: params.min_score,
            },
            candidates,
            best_model: best.map(|b| b.name.clone()),
            best_test_r2: best.map(|b| b.test_r2),
        }
    }
}

/// Write the selection report as pretty-printed JSON.
pub fn export_selection_report(
    report: &ScoreReport,
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let export = SelectionReport::build(report, params);

    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| PipelineError::persistence(output_path, e))?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::persistence(parent, e))?;
    }
    std::fs::write(output_path, json).map_err(|e| PipelineError::persistence(output_path, e))?;

    Ok(())
}
