//! One-hot encoding of categorical columns

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// One-hot encoder; categories are learned in sorted order.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder;

impl OneHotEncoder {
    pub fn fit<'a>(&self, column: &str, values: impl IntoIterator<Item = &'a str>) -> FittedOneHotEncoder {
        let categories: BTreeSet<&str> = values.into_iter().collect();
        FittedOneHotEncoder {
            column: column.to_string(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Learned category list for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    pub column: String,
    pub categories: Vec<String>,
}

impl FittedOneHotEncoder {
    /// Number of indicator columns produced.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Position of `value` among the learned categories.
    pub fn encode(&self, value: &str) -> Result<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| PipelineError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Output feature names, `column_category`.
    pub fn feature_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |c| format!("{}_{}", self.column, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_sorted_and_deduplicated() {
        let enc = OneHotEncoder.fit("lunch", ["standard", "free/reduced", "standard"]);
        assert_eq!(enc.categories, vec!["free/reduced", "standard"]);
        assert_eq!(enc.width(), 2);
        assert_eq!(enc.encode("standard").unwrap(), 1);
    }

    #[test]
    fn test_unknown_category_errors() {
        let enc = OneHotEncoder.fit("gender", ["female"]);
        let err = enc.encode("male").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownCategory { ref value, .. } if value == "male"));
    }
}
