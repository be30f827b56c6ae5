//! K-fold cross-validation

use ndarray::{Array1, Array2, Axis};

use super::metrics::r2_score;
use super::Estimator;
use crate::error::{PipelineError, Result};

/// A single train/validation split
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Unshuffled k-fold splitter; the first `n % k` folds get one extra row.
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(PipelineError::fit(
                "cross-validation",
                format!("n_splits must be at least 2, got {}", self.n_splits),
            ));
        }
        if n_samples < self.n_splits {
            return Err(PipelineError::fit(
                "cross-validation",
                format!(
                    "cannot split {} samples into {} folds",
                    n_samples, self.n_splits
                ),
            ));
        }

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for i in 0..self.n_splits {
            let size = if i < remainder { base + 1 } else { base };
            let end = start + size;
            folds.push(Fold {
                train_indices: (0..start).chain(end..n_samples).collect(),
                test_indices: (start..end).collect(),
            });
            start = end;
        }
        Ok(folds)
    }

    /// Mean validation R² of `estimator` across the folds. The estimator is
    /// cloned per fold; the argument is left untouched.
    pub fn cross_val_score(&self, estimator: &Estimator, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let folds = self.split(x.nrows())?;
        let mut total = 0.0;
        for fold in &folds {
            let x_train = x.select(Axis(0), &fold.train_indices);
            let y_train = y.select(Axis(0), &fold.train_indices);
            let x_val = x.select(Axis(0), &fold.test_indices);
            let y_val = y.select(Axis(0), &fold.test_indices);

            let mut model = estimator.clone();
            model.fit(&x_train, &y_train)?;
            total += r2_score(&y_val, &model.predict(&x_val)?);
        }
        Ok(total / folds.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_sizes_and_coverage() {
        let folds = KFold::new(3).split(10).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test_indices.clone()).collect();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train_indices.len() + fold.test_indices.len(), 10);
            assert!(fold.test_indices.iter().all(|i| !fold.train_indices.contains(i)));
        }
    }

    #[test]
    fn test_too_few_samples() {
        assert!(KFold::new(3).split(2).is_err());
        assert!(KFold::new(1).split(10).is_err());
    }
}
