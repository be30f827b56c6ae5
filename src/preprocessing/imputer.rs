//! Missing value imputation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Strategy for filling missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Median of the observed values (numeric columns)
    Median,
    /// Most frequent observed value, smallest on ties (categorical columns)
    MostFrequent,
}

/// Fitted fill value for a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFill {
    pub value: f64,
}

impl NumericFill {
    /// Fit a fill value from the observed entries of `values`.
    pub fn fit(column: &str, values: &[Option<f64>], strategy: ImputeStrategy) -> Result<Self> {
        let mut observed: Vec<f64> = values.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
        if observed.is_empty() {
            return Err(PipelineError::fit(
                "imputer",
                format!("column '{}' has no observed values", column),
            ));
        }

        let value = match strategy {
            ImputeStrategy::Median => median(&mut observed),
            ImputeStrategy::MostFrequent => {
                observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let (mut best, mut best_count) = (observed[0], 0);
                for run in observed.chunk_by(|a, b| a == b) {
                    if run.len() > best_count {
                        best = run[0];
                        best_count = run.len();
                    }
                }
                best
            }
        };

        Ok(Self { value })
    }

    pub fn apply(&self, value: Option<f64>) -> f64 {
        match value {
            Some(v) if !v.is_nan() => v,
            _ => self.value,
        }
    }
}

/// Fitted fill value for a categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFill {
    pub value: String,
}

impl CategoryFill {
    /// Fit the most frequent category; ties resolve to the smallest string.
    pub fn fit(column: &str, values: &[Option<String>]) -> Result<Self> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values.iter().flatten() {
            *counts.entry(v.as_str()).or_insert(0) += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for (v, count) in counts {
            if best.map_or(true, |(_, bc)| count > bc) {
                best = Some((v, count));
            }
        }

        match best {
            Some((v, _)) => Ok(Self { value: v.to_string() }),
            None => Err(PipelineError::fit(
                "imputer",
                format!("column '{}' has no observed values", column),
            )),
        }
    }

    pub fn apply(&self, value: Option<&str>) -> String {
        value.unwrap_or(&self.value).to_string()
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
