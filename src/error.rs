//! Error types for the training pipeline.
//!
//! Every stage returns `Result<T, PipelineError>`. Variants separate the
//! failure kinds a caller may want to tell apart (missing input, schema
//! mismatch, fitting failure, persistence failure) and keep the original
//! cause reachable through [`std::error::Error::source`].

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the pipeline stages, the object store and the models.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input file does not exist.
    #[error("{context}: file not found: {}", path.display())]
    NotFound {
        context: &'static str,
        path: PathBuf,
    },

    /// The data does not match the configured dataset schema.
    #[error("schema mismatch in {context}: {message}")]
    Schema {
        context: &'static str,
        message: String,
    },

    /// A categorical value was not seen while fitting the preprocessor.
    #[error("unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// Fitting or applying a transformer or model failed.
    #[error("fit failed in {context}: {message}")]
    Fit {
        context: &'static str,
        message: String,
    },

    /// A hyperparameter name or value is not valid for the model kind.
    #[error("invalid parameter '{param}' for {model}: {message}")]
    InvalidParameter {
        model: String,
        param: String,
        message: String,
    },

    /// Writing or reading an artifact failed at the I/O or encoding level.
    #[error("failed to persist {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted object could not be decoded.
    #[error("corrupt object at {}", path.display())]
    Corruption {
        path: PathBuf,
        #[source]
        source: bincode::error::DecodeError,
    },

    /// A dataframe operation failed.
    #[error("data error in {context}")]
    Data {
        context: &'static str,
        #[source]
        source: polars::error::PolarsError,
    },

    /// No candidate reached the minimum held-out score.
    #[error("no acceptable model: best candidate '{best}' scored {score:.4}, minimum is {threshold:.4}")]
    NoAcceptableModel {
        best: String,
        score: f64,
        threshold: f64,
    },
}

impl PipelineError {
    pub(crate) fn schema(context: &'static str, message: impl Into<String>) -> Self {
        PipelineError::Schema {
            context,
            message: message.into(),
        }
    }

    pub(crate) fn fit(context: &'static str, message: impl Into<String>) -> Self {
        PipelineError::Fit {
            context,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_param(
        model: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PipelineError::InvalidParameter {
            model: model.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    pub(crate) fn persistence(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PipelineError::Persistence {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// Attach stage context to polars results.
pub(crate) trait DataContext<T> {
    fn data_context(self, context: &'static str) -> Result<T>;
}

impl<T> DataContext<T> for polars::error::PolarsResult<T> {
    fn data_context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| PipelineError::Data { context, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_display_includes_path() {
        let err = PipelineError::NotFound {
            context: "ingestion",
            path: PathBuf::from("data/stud.csv"),
        };
        let msg = err.to_string();
        assert!(msg.contains("ingestion"));
        assert!(msg.contains("data/stud.csv"));
    }

    #[test]
    fn test_persistence_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PipelineError::persistence("artifacts/model.bin", io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("artifacts/model.bin"));
    }

    #[test]
    fn test_invalid_param_display() {
        let err = PipelineError::invalid_param("Ridge", "n_neighbors", "unknown parameter");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'n_neighbors' for Ridge: unknown parameter"
        );
    }
}
