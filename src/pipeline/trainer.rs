//! Model trainer: run model selection, accept or reject the best candidate
//! and persist it.

use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::selection::{split_features_target, ModelSelection, ScoreReport};
use crate::config::TrainerConfig;
use crate::error::{PipelineError, Result};
use crate::models::{default_candidates, Candidate, Estimator, ParamSet};
use crate::store::save_object;

/// The persisted best estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub name: String,
    pub params: ParamSet,
    pub test_r2: f64,
    pub estimator: Estimator,
}

/// What a training run produced.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best_model_name: String,
    pub best_score: f64,
    pub report: ScoreReport,
    pub model_path: PathBuf,
}

pub struct ModelTrainer {
    config: TrainerConfig,
    candidates: Vec<Candidate>,
}

impl ModelTrainer {
    /// Trainer over the standard candidate set.
    pub fn new(config: TrainerConfig) -> Self {
        Self::with_candidates(config, default_candidates())
    }

    pub fn with_candidates(config: TrainerConfig, candidates: Vec<Candidate>) -> Self {
        Self { config, candidates }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn run(&self, train: &Array2<f64>, test: &Array2<f64>) -> Result<TrainingOutcome> {
        info!("split training and test input data");
        let (x_train, y_train) = split_features_target(train)?;
        let (x_test, y_test) = split_features_target(test)?;

        let selection = ModelSelection::new(self.config.cv_folds);
        let tuned = selection.evaluate(&x_train, &y_train, &x_test, &y_test, &self.candidates)?;

        let report = ScoreReport::from_entries(tuned.iter().map(|t| t.score.clone()).collect());
        let best = report
            .best()
            .ok_or_else(|| PipelineError::fit("model trainer", "no candidates to train"))?;
        let best_score = best.test_r2;
        let best_name = best.name.clone();

        if best_score < self.config.min_score {
            warn!(
                best = %best_name,
                score = best_score,
                threshold = self.config.min_score,
                "no candidate reached the minimum score"
            );
            return Err(PipelineError::NoAcceptableModel {
                best: best_name,
                score: best_score,
                threshold: self.config.min_score,
            });
        }
        info!(best = %best_name, test_r2 = best_score, "best model found on both training and testing dataset");

        let chosen = tuned
            .iter()
            .find(|t| t.score.name == best_name)
            .ok_or_else(|| PipelineError::fit("model trainer", "best candidate has no fitted model"))?;
        let trained = TrainedModel {
            name: best_name.clone(),
            params: chosen.score.best_params.clone(),
            test_r2: best_score,
            estimator: chosen.model.clone(),
        };
        save_object(&self.config.model_path, &trained)?;
        info!(path = %self.config.model_path.display(), "saved trained model");

        Ok(TrainingOutcome {
            best_model_name: best_name,
            best_score,
            report,
            model_path: self.config.model_path.clone(),
        })
    }
}
