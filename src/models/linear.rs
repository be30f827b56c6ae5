//! Linear models: ordinary least squares, Ridge and Lasso

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::params::ParamValue;
use crate::error::{PipelineError, Result};

/// Solve `(A + jitter * I) x = b` by Cholesky decomposition.
/// Returns `None` when a pivot is not clearly positive.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>, jitter: f64, pivot_floor: f64) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] + jitter - sum;
                if diag <= pivot_floor {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Solve the normal equations, adding a growing diagonal jitter when the
/// system is singular (collinear one-hot blocks, constant columns).
fn solve_normal_equations(xtx: &Array2<f64>, xty: &Array1<f64>) -> Option<Array1<f64>> {
    let n = xtx.nrows();
    if n == 0 {
        return Some(Array1::zeros(0));
    }
    let base = (xtx.diag().sum() / n as f64).abs().max(1.0);
    let pivot_floor = base * 1e-12;

    let mut jitter = 0.0;
    for _ in 0..8 {
        if let Some(w) = cholesky_solve(xtx, xty, jitter, pivot_floor) {
            return Some(w);
        }
        jitter = if jitter == 0.0 { base * 1e-10 } else { jitter * 100.0 };
    }
    None
}

/// Center `x` and `y` on their means when fitting an intercept.
fn center(x: &Array2<f64>, y: &Array1<f64>, fit_intercept: bool) -> (Array2<f64>, Array1<f64>, Array1<f64>, f64) {
    if !fit_intercept {
        return (x.clone(), y.clone(), Array1::zeros(x.ncols()), 0.0);
    }
    let x_mean = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()));
    let y_mean = y.mean().unwrap_or(0.0);
    let x_c = x - &x_mean.clone().insert_axis(Axis(0));
    let y_c = y - y_mean;
    (x_c, y_c, x_mean, y_mean)
}

fn check_shapes(context: &'static str, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PipelineError::fit(
            context,
            format!("x has {} rows but y has {} values", x.nrows(), y.len()),
        ));
    }
    if x.nrows() == 0 {
        return Err(PipelineError::fit(context, "no training samples"));
    }
    Ok(())
}

/// Fitted coefficients shared by the linear models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    pub weights: Array1<f64>,
    pub intercept: f64,
}

impl LinearCoefficients {
    fn predict(&self, context: &'static str, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.weights.len() {
            return Err(PipelineError::fit(
                context,
                format!("expected {} features, got {}", self.weights.len(), x.ncols()),
            ));
        }
        Ok(x.dot(&self.weights) + self.intercept)
    }
}

fn fit_ridge(x: &Array2<f64>, y: &Array1<f64>, alpha: f64, fit_intercept: bool, context: &'static str) -> Result<LinearCoefficients> {
    check_shapes(context, x, y)?;
    let (x_c, y_c, x_mean, y_mean) = center(x, y, fit_intercept);

    let mut xtx = x_c.t().dot(&x_c);
    for i in 0..xtx.nrows() {
        xtx[[i, i]] += alpha;
    }
    let xty = x_c.t().dot(&y_c);

    let weights = solve_normal_equations(&xtx, &xty)
        .ok_or_else(|| PipelineError::fit(context, "normal equations are singular"))?;
    let intercept = if fit_intercept {
        y_mean - weights.dot(&x_mean)
    } else {
        0.0
    };

    Ok(LinearCoefficients { weights, intercept })
}

/// Ordinary least squares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub fit_intercept: bool,
    coefficients: Option<LinearCoefficients>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub const NAME: &'static str = "LinearRegression";

    pub fn new() -> Self {
        Self {
            fit_intercept: true,
            coefficients: None,
        }
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "fit_intercept" => self.fit_intercept = value.boolean(Self::NAME, name)?,
            _ => return Err(PipelineError::invalid_param(Self::NAME, name, "unknown parameter")),
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.coefficients = Some(fit_ridge(x, y, 0.0, self.fit_intercept, Self::NAME)?);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.coefficients
            .as_ref()
            .ok_or_else(|| PipelineError::fit(Self::NAME, "model is not fitted"))?
            .predict(Self::NAME, x)
    }

    pub fn coefficients(&self) -> Option<&LinearCoefficients> {
        self.coefficients.as_ref()
    }
}

/// L2-regularized least squares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    pub alpha: f64,
    pub fit_intercept: bool,
    coefficients: Option<LinearCoefficients>,
}

impl Default for Ridge {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Ridge {
    pub const NAME: &'static str = "Ridge";

    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fit_intercept: true,
            coefficients: None,
        }
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "alpha" => self.alpha = value.non_negative_f64(Self::NAME, name)?,
            "fit_intercept" => self.fit_intercept = value.boolean(Self::NAME, name)?,
            _ => return Err(PipelineError::invalid_param(Self::NAME, name, "unknown parameter")),
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.coefficients = Some(fit_ridge(x, y, self.alpha, self.fit_intercept, Self::NAME)?);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.coefficients
            .as_ref()
            .ok_or_else(|| PipelineError::fit(Self::NAME, "model is not fitted"))?
            .predict(Self::NAME, x)
    }
}

/// L1-regularized least squares, fitted by coordinate descent.
///
/// Minimizes `1/(2n) * ||y - Xw||^2 + alpha * ||w||_1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lasso {
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub fit_intercept: bool,
    coefficients: Option<LinearCoefficients>,
}

impl Default for Lasso {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Lasso {
    pub const NAME: &'static str = "Lasso";

    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: 1000,
            tol: 1e-6,
            fit_intercept: true,
            coefficients: None,
        }
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "alpha" => self.alpha = value.non_negative_f64(Self::NAME, name)?,
            "max_iter" => self.max_iter = value.usize_at_least(Self::NAME, name, 1)?,
            "fit_intercept" => self.fit_intercept = value.boolean(Self::NAME, name)?,
            _ => return Err(PipelineError::invalid_param(Self::NAME, name, "unknown parameter")),
        }
        Ok(())
    }

    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(Self::NAME, x, y)?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let (x_c, y_c, x_mean, y_mean) = center(x, y, self.fit_intercept);

        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_c.column(j).mapv(|v| v * v).sum())
            .collect();
        let lambda = self.alpha * n_samples as f64;

        let mut w = Array1::<f64>::zeros(n_features);
        let mut r = y_c.clone();

        for _ in 0..self.max_iter {
            let mut max_delta = 0.0f64;
            for j in 0..n_features {
                if col_norms[j] < 1e-15 {
                    continue;
                }
                let old = w[j];
                let rho = x_c.column(j).dot(&r) + col_norms[j] * old;
                let new = Self::soft_threshold(rho, lambda) / col_norms[j];
                if new != old {
                    r.scaled_add(old - new, &x_c.column(j));
                    w[j] = new;
                    max_delta = max_delta.max((new - old).abs());
                }
            }
            if max_delta < self.tol {
                break;
            }
        }

        let intercept = if self.fit_intercept {
            y_mean - w.dot(&x_mean)
        } else {
            0.0
        };
        self.coefficients = Some(LinearCoefficients {
            weights: w,
            intercept,
        });
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.coefficients
            .as_ref()
            .ok_or_else(|| PipelineError::fit(Self::NAME, "model is not fitted"))?
            .predict(Self::NAME, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::r2_score;
    use ndarray::array;

    fn plane() -> (Array2<f64>, Array1<f64>) {
        // y = 2*x1 + 3*x2 + 1
        let x = array![[1.0, 1.0], [2.0, 1.0], [1.0, 2.0], [2.0, 2.0], [3.0, 1.0]];
        let y = array![6.0, 8.0, 9.0, 11.0, 10.0];
        (x, y)
    }

    #[test]
    fn test_ols_recovers_plane() {
        let (x, y) = plane();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let coef = model.coefficients().unwrap();
        assert!((coef.weights[0] - 2.0).abs() < 1e-6);
        assert!((coef.weights[1] - 3.0).abs() < 1e-6);
        assert!((coef.intercept - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ols_handles_constant_features() {
        let x = Array2::from_elem((6, 3), 1.0);
        let y = array![2.0, 2.0, 2.0, 2.0, 2.0, 2.0];
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(pred.iter().all(|p| (p - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_ridge_shrinks_weights() {
        let (x, y) = plane();
        let mut weak = Ridge::new(0.01);
        let mut strong = Ridge::new(100.0);
        weak.fit(&x, &y).unwrap();
        strong.fit(&x, &y).unwrap();
        let weak_r2 = r2_score(&y, &weak.predict(&x).unwrap());
        let strong_r2 = r2_score(&y, &strong.predict(&x).unwrap());
        assert!(weak_r2 > strong_r2);
    }

    #[test]
    fn test_lasso_zeroes_irrelevant_feature() {
        let x = array![[1.0, 0.3], [2.0, -0.1], [3.0, 0.2], [4.0, -0.3], [5.0, 0.1], [6.0, -0.2]];
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let mut model = Lasso::new(0.1);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.95);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let x = array![[1.0]];
        assert!(LinearRegression::new().predict(&x).is_err());
    }

    #[test]
    fn test_unknown_param_rejected() {
        let mut model = Ridge::default();
        assert!(matches!(
            model.set_param("n_neighbors", &ParamValue::Int(3)),
            Err(PipelineError::InvalidParameter { .. })
        ));
    }
}
