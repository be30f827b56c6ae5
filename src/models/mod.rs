//! Regression models, hyperparameters and evaluation helpers
//!
//! [`Estimator`] wraps every supported model behind one serializable type so
//! candidates can be cloned, tuned, compared and persisted uniformly.

pub mod cross_validation;
pub mod forest;
pub mod knn;
pub mod linear;
pub mod metrics;
pub mod params;
pub mod tree;

pub use cross_validation::{Fold, KFold};
pub use forest::RandomForestRegressor;
pub use knn::{KNeighborsRegressor, WeightScheme};
pub use linear::{Lasso, LinearRegression, Ridge};
pub use metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
pub use params::{ParamSet, ParamValue, SearchSpace};
pub use tree::{DecisionTreeRegressor, TreeNode};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Any supported regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Estimator {
    Linear(LinearRegression),
    Ridge(Ridge),
    Lasso(Lasso),
    KNeighbors(KNeighborsRegressor),
    DecisionTree(DecisionTreeRegressor),
    RandomForest(RandomForestRegressor),
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::Linear(_) => LinearRegression::NAME,
            Estimator::Ridge(_) => Ridge::NAME,
            Estimator::Lasso(_) => Lasso::NAME,
            Estimator::KNeighbors(_) => KNeighborsRegressor::NAME,
            Estimator::DecisionTree(_) => DecisionTreeRegressor::NAME,
            Estimator::RandomForest(_) => RandomForestRegressor::NAME,
        }
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match self {
            Estimator::Linear(m) => m.set_param(name, value),
            Estimator::Ridge(m) => m.set_param(name, value),
            Estimator::Lasso(m) => m.set_param(name, value),
            Estimator::KNeighbors(m) => m.set_param(name, value),
            Estimator::DecisionTree(m) => m.set_param(name, value),
            Estimator::RandomForest(m) => m.set_param(name, value),
        }
    }

    /// Apply every assignment of `params` in order.
    pub fn set_params(&mut self, params: &ParamSet) -> Result<()> {
        for (name, value) in params.iter() {
            self.set_param(name, value)?;
        }
        Ok(())
    }

    /// A copy of this estimator with `params` applied.
    pub fn with_params(&self, params: &ParamSet) -> Result<Estimator> {
        let mut model = self.clone();
        model.set_params(params)?;
        Ok(model)
    }

    /// Check that every value of `space` is accepted by this model kind.
    pub fn validate_space(&self, space: &SearchSpace) -> Result<()> {
        for (name, values) in space.params() {
            if values.is_empty() {
                return Err(PipelineError::invalid_param(self.kind(), name, "no values to search"));
            }
            for value in values {
                self.clone().set_param(name, value)?;
            }
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Estimator::Linear(m) => m.fit(x, y),
            Estimator::Ridge(m) => m.fit(x, y),
            Estimator::Lasso(m) => m.fit(x, y),
            Estimator::KNeighbors(m) => m.fit(x, y),
            Estimator::DecisionTree(m) => m.fit(x, y),
            Estimator::RandomForest(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Estimator::Linear(m) => m.predict(x),
            Estimator::Ridge(m) => m.predict(x),
            Estimator::Lasso(m) => m.predict(x),
            Estimator::KNeighbors(m) => m.predict(x),
            Estimator::DecisionTree(m) => m.predict(x),
            Estimator::RandomForest(m) => m.predict(x),
        }
    }

    /// R² of the predictions on `(x, y)`.
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        Ok(r2_score(y, &self.predict(x)?))
    }
}

/// A named model with the grid to search for it
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub estimator: Estimator,
    pub search_space: SearchSpace,
}

impl Candidate {
    pub fn new(name: impl Into<String>, estimator: Estimator, search_space: SearchSpace) -> Self {
        Self {
            name: name.into(),
            estimator,
            search_space,
        }
    }
}

/// The standard candidate set, in evaluation order.
pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new(
            "Linear Regression",
            Estimator::Linear(LinearRegression::new()),
            SearchSpace::new(),
        ),
        Candidate::new(
            "Lasso",
            Estimator::Lasso(Lasso::default()),
            SearchSpace::new().with("alpha", [0.01, 0.1, 1.0]),
        ),
        Candidate::new(
            "Ridge",
            Estimator::Ridge(Ridge::default()),
            SearchSpace::new().with("alpha", [0.1, 1.0, 10.0]),
        ),
        Candidate::new(
            "K-Neighbors Regressor",
            Estimator::KNeighbors(KNeighborsRegressor::default()),
            SearchSpace::new().with("n_neighbors", [5i64, 7, 9, 11]),
        ),
        Candidate::new(
            "Decision Tree",
            Estimator::DecisionTree(DecisionTreeRegressor::new()),
            SearchSpace::new().with("max_depth", [ParamValue::Int(4), ParamValue::Int(8), ParamValue::Null]),
        ),
        Candidate::new(
            "Random Forest Regressor",
            Estimator::RandomForest(RandomForestRegressor::default()),
            SearchSpace::new().with("n_estimators", [8i64, 16, 32]),
        ),
    ]
}
