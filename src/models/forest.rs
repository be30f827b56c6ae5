//! Random forest regression: bootstrap-aggregated regression trees

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::params::ParamValue;
use super::tree::DecisionTreeRegressor;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub random_state: u64,
    trees: Vec<DecisionTreeRegressor>,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestRegressor {
    pub const NAME: &'static str = "RandomForestRegressor";

    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            random_state: 42,
            trees: Vec::new(),
        }
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "n_estimators" => self.n_estimators = value.usize_at_least(Self::NAME, name, 1)?,
            "max_depth" => self.max_depth = value.optional_usize(Self::NAME, name, 1)?,
            "min_samples_leaf" => self.min_samples_leaf = value.usize_at_least(Self::NAME, name, 1)?,
            "random_state" => self.random_state = value.usize_at_least(Self::NAME, name, 0)? as u64,
            _ => return Err(PipelineError::invalid_param(Self::NAME, name, "unknown parameter")),
        }
        Ok(())
    }

    /// Fit each tree on its own bootstrap sample. Tree `i` draws from a
    /// generator seeded with `random_state + i`, so results do not depend on
    /// thread scheduling.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(PipelineError::fit(Self::NAME, "no training samples"));
        }

        let mut template = DecisionTreeRegressor::new().with_max_depth(self.max_depth);
        template.min_samples_leaf = self.min_samples_leaf;
        let seed = self.random_state;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree = template.clone();
                tree.fit_rows(x, y, &rows)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::fit(Self::NAME, "model is not fitted"));
        }
        let mut total = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            total += &tree.predict(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}
