//! Feature scaling

use serde::{Deserialize, Serialize};

/// Standard scaler: `(x - mean) / std`, or `x / std` without centering.
///
/// Uses the population standard deviation; a zero deviation scales by 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub with_mean: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self { with_mean: true }
    }

    pub fn without_centering() -> Self {
        Self { with_mean: false }
    }

    pub fn fit(&self, values: &[f64]) -> FittedScaler {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();

        FittedScaler {
            center: if self.with_mean { mean } else { 0.0 },
            scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
        }
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

/// Learned scaling parameters for one output column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    pub center: f64,
    pub scale: f64,
}

impl FittedScaler {
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.center) / self.scale
    }
}
