//! Hyperparameter values, parameter sets and grid search spaces

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Unset, e.g. an unbounded `max_depth`
    Null,
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
            ParamValue::Null => write!(f, "none"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl ParamValue {
    fn mismatch(&self, model: &str, param: &str, expected: &str) -> PipelineError {
        PipelineError::invalid_param(model, param, format!("expected {}, got {:?}", expected, self))
    }

    /// Non-negative finite float; integers are widened.
    pub fn non_negative_f64(&self, model: &str, param: &str) -> Result<f64> {
        let v = match self {
            ParamValue::Float(v) => *v,
            ParamValue::Int(v) => *v as f64,
            _ => return Err(self.mismatch(model, param, "a number")),
        };
        if !v.is_finite() || v < 0.0 {
            return Err(self.mismatch(model, param, "a finite non-negative number"));
        }
        Ok(v)
    }

    /// Integer of at least `min`.
    pub fn usize_at_least(&self, model: &str, param: &str, min: usize) -> Result<usize> {
        match self {
            ParamValue::Int(v) if *v >= min as i64 => Ok(*v as usize),
            _ => Err(self.mismatch(model, param, &format!("an integer >= {}", min))),
        }
    }

    /// Like [`usize_at_least`](Self::usize_at_least), with `Null` meaning unbounded.
    pub fn optional_usize(&self, model: &str, param: &str, min: usize) -> Result<Option<usize>> {
        match self {
            ParamValue::Null => Ok(None),
            other => other.usize_at_least(model, param, min).map(Some),
        }
    }

    pub fn boolean(&self, model: &str, param: &str) -> Result<bool> {
        match self {
            ParamValue::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(model, param, "a boolean")),
        }
    }

    pub fn text(&self, model: &str, param: &str) -> Result<&str> {
        match self {
            ParamValue::Text(v) => Ok(v),
            _ => Err(self.mismatch(model, param, "a string")),
        }
    }
}

/// One point of a search space: ordered `(name, value)` assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet(pub Vec<(String, ParamValue)>);

impl ParamSet {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "defaults");
        }
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Grid of candidate values per hyperparameter, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    params: Vec<(String, Vec<ParamValue>)>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hyperparameter and the values to try.
    pub fn with<V: Into<ParamValue>>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.params
            .push((name.to_string(), values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn params(&self) -> &[(String, Vec<ParamValue>)] {
        &self.params
    }

    /// Cartesian product of all value lists; the last parameter varies fastest.
    /// An empty space yields a single empty parameter set.
    pub fn grid(&self) -> Vec<ParamSet> {
        let mut grid = vec![ParamSet::default()];
        for (name, values) in &self.params {
            let mut next = Vec::with_capacity(grid.len() * values.len());
            for base in &grid {
                for v in values {
                    let mut set = base.clone();
                    set.0.push((name.clone(), v.clone()));
                    next.push(set);
                }
            }
            grid = next;
        }
        grid
    }
}
