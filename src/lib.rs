//! studperf: Student Performance Regression Library
//!
//! A training pipeline that ingests the student performance dataset, fits a
//! column-wise preprocessor, grid-searches a set of regression models and
//! keeps the best one for prediction.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod store;
pub mod utils;

pub use config::{DatasetSchema, IngestionConfig, PipelineConfig, TrainerConfig, TransformationConfig};
pub use error::{PipelineError, Result};
