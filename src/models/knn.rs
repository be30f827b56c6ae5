//! K-nearest neighbors regression

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::params::ParamValue;
use crate::error::{PipelineError, Result};

/// Neighbor weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightScheme {
    Uniform,
    /// Inverse Euclidean distance; exact matches take all the weight.
    Distance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsRegressor {
    pub n_neighbors: usize,
    pub weights: WeightScheme,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KNeighborsRegressor {
    fn default() -> Self {
        Self::new(5)
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

impl KNeighborsRegressor {
    pub const NAME: &'static str = "KNeighborsRegressor";

    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            weights: WeightScheme::Uniform,
            x_train: None,
            y_train: None,
        }
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "n_neighbors" => self.n_neighbors = value.usize_at_least(Self::NAME, name, 1)?,
            "weights" => {
                self.weights = match value.text(Self::NAME, name)? {
                    "uniform" => WeightScheme::Uniform,
                    "distance" => WeightScheme::Distance,
                    other => {
                        return Err(PipelineError::invalid_param(
                            Self::NAME,
                            name,
                            format!("expected 'uniform' or 'distance', got '{}'", other),
                        ))
                    }
                }
            }
            _ => return Err(PipelineError::invalid_param(Self::NAME, name, "unknown parameter")),
        }
        Ok(())
    }

    /// Store the training data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::fit(
                Self::NAME,
                format!("x has {} rows but y has {} values", x.nrows(), y.len()),
            ));
        }
        if x.nrows() < self.n_neighbors {
            return Err(PipelineError::fit(
                Self::NAME,
                format!(
                    "n_neighbors ({}) exceeds the number of training samples ({})",
                    self.n_neighbors,
                    x.nrows()
                ),
            ));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Predict each row from its nearest training rows (parallel over rows).
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(PipelineError::fit(Self::NAME, "model is not fitted")),
        };
        if x.ncols() != x_train.ncols() {
            return Err(PipelineError::fit(
                Self::NAME,
                format!("expected {} features, got {}", x_train.ncols(), x.ncols()),
            ));
        }

        let k = self.n_neighbors;
        let weights = self.weights;
        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let mut dists: Vec<(f64, usize)> = x_train
                    .rows()
                    .into_iter()
                    .enumerate()
                    .map(|(j, t)| (squared_distance(row, t), j))
                    .collect();
                // index as tie-breaker keeps neighbor choice deterministic
                dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal).then(a.1.cmp(&b.1)));
                let neighbors = &dists[..k];

                match weights {
                    WeightScheme::Uniform => {
                        neighbors.iter().map(|&(_, j)| y_train[j]).sum::<f64>() / k as f64
                    }
                    WeightScheme::Distance => {
                        let exact: Vec<f64> = neighbors
                            .iter()
                            .filter(|(d, _)| *d == 0.0)
                            .map(|&(_, j)| y_train[j])
                            .collect();
                        if !exact.is_empty() {
                            return exact.iter().sum::<f64>() / exact.len() as f64;
                        }
                        let (num, den) = neighbors.iter().fold((0.0, 0.0), |(num, den), &(d, j)| {
                            let w = 1.0 / d.sqrt();
                            (num + w * y_train[j], den + w)
                        });
                        num / den
                    }
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}
