//! Regression tree (CART with squared-error splits)

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::params::ParamValue;
use crate::error::{PipelineError, Result};

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict_row(&self, row: ndarray::ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    root: Option<TreeNode>,
    n_features: usize,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    pub const NAME: &'static str = "DecisionTreeRegressor";

    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            root: None,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "max_depth" => self.max_depth = value.optional_usize(Self::NAME, name, 1)?,
            "min_samples_split" => self.min_samples_split = value.usize_at_least(Self::NAME, name, 2)?,
            "min_samples_leaf" => self.min_samples_leaf = value.usize_at_least(Self::NAME, name, 1)?,
            _ => return Err(PipelineError::invalid_param(Self::NAME, name, "unknown parameter")),
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_rows(x, y, &indices)
    }

    /// Fit on the given row positions; duplicates are allowed (bootstrap).
    pub(crate) fn fit_rows(&mut self, x: &Array2<f64>, y: &Array1<f64>, rows: &[usize]) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::fit(
                Self::NAME,
                format!("x has {} rows but y has {} values", x.nrows(), y.len()),
            ));
        }
        if rows.is_empty() {
            return Err(PipelineError::fit(Self::NAME, "no training samples"));
        }
        self.n_features = x.ncols();
        self.root = Some(self.build(x, y, rows.to_vec(), 0));
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| PipelineError::fit(Self::NAME, "model is not fitted"))?;
        if x.ncols() != self.n_features {
            return Err(PipelineError::fit(
                Self::NAME,
                format!("expected {} features, got {}", self.n_features, x.ncols()),
            ));
        }
        Ok(x.rows().into_iter().map(|row| root.predict_row(row)).collect())
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    fn build(&self, x: &Array2<f64>, y: &Array1<f64>, rows: Vec<usize>, depth: usize) -> TreeNode {
        let n = rows.len();
        let mean = rows.iter().map(|&i| y[i]).sum::<f64>() / n as f64;
        let leaf = TreeNode::Leaf {
            value: mean,
            n_samples: n,
        };

        if n < self.min_samples_split
            || n < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
        {
            return leaf;
        }

        let sse: f64 = rows.iter().map(|&i| (y[i] - mean).powi(2)).sum();
        if sse <= 1e-12 {
            return leaf;
        }

        let best = match self.best_split(x, y, &rows) {
            Some(b) if b.sse < sse - 1e-12 => b,
            _ => return leaf,
        };

        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| x[[i, best.feature]] <= best.threshold);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(x, y, left, depth + 1)),
            right: Box::new(self.build(x, y, right, depth + 1)),
        }
    }

    /// Scan every feature for the threshold with the lowest summed squared
    /// error across both children.
    fn best_split(&self, x: &Array2<f64>, y: &Array1<f64>, rows: &[usize]) -> Option<BestSplit> {
        let n = rows.len();
        let leaf_min = self.min_samples_leaf;
        let total_sum: f64 = rows.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = rows.iter().map(|&i| y[i] * y[i]).sum();

        let mut best: Option<BestSplit> = None;
        let mut order = rows.to_vec();

        for feature in 0..x.ncols() {
            order.sort_by(|&a, &b| {
                x[[a, feature]]
                    .partial_cmp(&x[[b, feature]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            for pos in 0..n - 1 {
                let i = order[pos];
                left_sum += y[i];
                left_sq += y[i] * y[i];

                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < leaf_min || right_n < leaf_min {
                    continue;
                }

                let here = x[[i, feature]];
                let next = x[[order[pos + 1], feature]];
                if here == next {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (here + next) / 2.0,
                        sse,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_step_function_is_learned() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&array![[0.0], [20.0]]).unwrap();
        assert_eq!(pred, array![1.0, 5.0]);
        assert_eq!(tree.root().unwrap().depth(), 1);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut tree = DecisionTreeRegressor::new().with_max_depth(Some(2));
        tree.fit(&x, &y).unwrap();
        assert!(tree.root().unwrap().depth() <= 2);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.root().unwrap().depth(), 0);
    }
}
