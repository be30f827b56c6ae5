//! Model selection: grid search with k-fold cross-validation per candidate,
//! refit on the full training set and held-out R² per candidate name.

use std::collections::HashSet;

use ndarray::{s, Array1, Array2};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::models::{Candidate, Estimator, KFold, ParamSet};

/// Scores of one candidate after tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub name: String,
    pub kind: &'static str,
    /// Mean cross-validated R² of the winning parameters.
    pub cv_score: f64,
    /// R² on the training data after refit. Diagnostic only.
    pub train_r2: f64,
    /// R² on the held-out test partition.
    pub test_r2: f64,
    pub best_params: ParamSet,
}

/// Candidate name to score mapping, in candidate order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreReport {
    entries: Vec<CandidateScore>,
}

impl ScoreReport {
    pub(crate) fn from_entries(entries: Vec<CandidateScore>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CandidateScore] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&CandidateScore> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Held-out R² of the named candidate.
    pub fn test_score(&self, name: &str) -> Option<f64> {
        self.get(name).map(|e| e.test_r2)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the highest test R²; the earliest wins ties.
    pub fn best(&self) -> Option<&CandidateScore> {
        self.entries.iter().fold(None, |best: Option<&CandidateScore>, e| match best {
            Some(b) if b.test_r2 >= e.test_r2 => Some(b),
            _ => Some(e),
        })
    }
}

/// Split a matrix whose last column is the target into `(features, target)`.
pub fn split_features_target(matrix: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    let n_cols = matrix.ncols();
    if n_cols < 2 {
        return Err(PipelineError::schema(
            "model selection",
            format!("expected at least one feature and a target column, got {} column(s)", n_cols),
        ));
    }
    let features = matrix.slice(s![.., ..n_cols - 1]).to_owned();
    let target = matrix.column(n_cols - 1).to_owned();
    Ok((features, target))
}

/// Result of grid search for a single candidate.
#[derive(Debug, Clone)]
pub struct TunedCandidate {
    pub score: CandidateScore,
    /// The refitted estimator with the winning parameters.
    pub model: Estimator,
}

/// Grid search over every candidate.
#[derive(Debug, Clone, Copy)]
pub struct ModelSelection {
    folds: KFold,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ModelSelection {
    pub fn new(cv_folds: usize) -> Self {
        Self {
            folds: KFold::new(cv_folds),
        }
    }

    /// Tune, refit and score each candidate, returning only the scores.
    pub fn run(
        &self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
        candidates: &[Candidate],
    ) -> Result<ScoreReport> {
        let tuned = self.evaluate(x_train, y_train, x_test, y_test, candidates)?;
        Ok(ScoreReport {
            entries: tuned.into_iter().map(|t| t.score).collect(),
        })
    }

    /// Tune, refit and score each candidate, keeping the fitted models.
    ///
    /// All search spaces are validated before any fitting starts, so an
    /// invalid grid never yields a partial result.
    pub fn evaluate(
        &self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
        candidates: &[Candidate],
    ) -> Result<Vec<TunedCandidate>> {
        let mut names = HashSet::new();
        for candidate in candidates {
            if !names.insert(candidate.name.as_str()) {
                return Err(PipelineError::invalid_param(
                    candidate.name.as_str(),
                    "name",
                    "candidate name is used more than once",
                ));
            }
            candidate.estimator.validate_space(&candidate.search_space)?;
        }

        info!(candidates = candidates.len(), folds = self.folds.n_splits(), "starting model selection");

        candidates
            .iter()
            .map(|c| self.tune(c, x_train, y_train, x_test, y_test))
            .collect()
    }

    fn tune(
        &self,
        candidate: &Candidate,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<TunedCandidate> {
        let grid = candidate.search_space.grid();
        let folds = self.folds;

        // A grid point whose fit fails (e.g. more neighbours than fold rows)
        // is skipped; any other error aborts the search.
        let cv_scores: Vec<Option<f64>> = grid
            .par_iter()
            .map(|params| {
                let scored = candidate
                    .estimator
                    .with_params(params)
                    .and_then(|model| folds.cross_val_score(&model, x_train, y_train));
                match scored {
                    Ok(score) => Ok(Some(score)),
                    Err(err @ PipelineError::Fit { .. }) => {
                        warn!(candidate = %candidate.name, params = %params, error = %err, "grid point failed, skipping");
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut best: Option<(usize, f64)> = None;
        for (i, score) in cv_scores.iter().enumerate() {
            let Some(score) = *score else { continue };
            debug!(candidate = %candidate.name, params = %grid[i], cv_r2 = score, "grid point scored");
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((i, score));
            }
        }
        let (best_idx, cv_score) = best.ok_or_else(|| {
            PipelineError::fit(
                "model selection",
                format!(
                    "every one of the {} grid point(s) for candidate '{}' failed to fit",
                    grid.len(),
                    candidate.name
                ),
            )
        })?;
        let best_params = grid[best_idx].clone();

        let mut model = candidate.estimator.with_params(&best_params)?;
        model.fit(x_train, y_train)?;
        let train_r2 = model.score(x_train, y_train)?;
        let test_r2 = model.score(x_test, y_test)?;

        info!(
            candidate = %candidate.name,
            params = %best_params,
            cv_r2 = cv_score,
            test_r2,
            "candidate tuned"
        );

        Ok(TunedCandidate {
            score: CandidateScore {
                name: candidate.name.clone(),
                kind: model.kind(),
                cv_score,
                train_r2,
                test_r2,
                best_params,
            },
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinearRegression, Ridge, SearchSpace};
    use ndarray::array;

    fn score(name: &str, test_r2: f64) -> CandidateScore {
        CandidateScore {
            name: name.into(),
            kind: "Ridge",
            cv_score: 0.0,
            train_r2: 0.0,
            test_r2,
            best_params: ParamSet::default(),
        }
    }

    #[test]
    fn test_best_prefers_first_on_tie() {
        let report = ScoreReport {
            entries: vec![score("a", 0.5), score("b", 0.9), score("c", 0.9)],
        };
        assert_eq!(report.best().unwrap().name, "b");
    }

    #[test]
    fn test_split_features_target() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let (x, y) = split_features_target(&m).unwrap();
        assert_eq!(x, array![[1.0, 2.0], [4.0, 5.0]]);
        assert_eq!(y, array![3.0, 6.0]);
        assert!(split_features_target(&array![[1.0], [2.0]]).is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 1.0, 2.0, 3.0];
        let candidates = vec![
            Candidate::new("m", Estimator::Linear(LinearRegression::new()), SearchSpace::new()),
            Candidate::new("m", Estimator::Ridge(Ridge::default()), SearchSpace::new()),
        ];
        let err = ModelSelection::default()
            .run(&x, &y, &x, &y, &candidates)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter { .. }));
    }
}
